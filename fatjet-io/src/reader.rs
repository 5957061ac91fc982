//! JSON-lines readers.

use crate::{Error, Result};
use fatjet_core::{Event, SelectedEvent};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::marker::PhantomData;
use std::path::Path;

/// Streaming reader of one JSON record per line.
///
/// Blank lines are skipped. A line that fails to parse yields
/// [`Error::InvalidFormat`] naming its 1-based line number; iteration
/// may continue past it.
pub struct JsonLinesReader<R, T> {
    reader: R,
    line: String,
    line_number: usize,
    _record: PhantomData<fn() -> T>,
}

/// Reader of input events.
pub type EventReader<R> = JsonLinesReader<R, Event>;

/// Reader of selection output.
pub type SelectionReader<R> = JsonLinesReader<R, SelectedEvent>;

impl<T: DeserializeOwned> JsonLinesReader<BufReader<File>, T> {
    /// Opens a file for reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead, T: DeserializeOwned> JsonLinesReader<R, T> {
    /// Wraps a buffered reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_number: 0,
            _record: PhantomData,
        }
    }

    /// Number of lines consumed so far.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads every remaining record, failing on the first bad line.
    ///
    /// # Errors
    /// Returns the first I/O or parse error.
    pub fn read_all(self) -> Result<Vec<T>> {
        self.collect()
    }

    fn next_record(&mut self) -> Option<Result<T>> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => self.line_number += 1,
                Err(e) => return Some(Err(e.into())),
            }
            let text = self.line.trim();
            if text.is_empty() {
                continue;
            }
            return Some(serde_json::from_str(text).map_err(|e| {
                log::debug!("line {} does not parse: {e}", self.line_number);
                Error::InvalidFormat(format!("line {}: {e}", self.line_number))
            }));
        }
    }
}

impl<R: BufRead, T: DeserializeOwned> Iterator for JsonLinesReader<R, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record()
    }
}
