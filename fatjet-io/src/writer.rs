//! Writers for selection output and histogram tables.

use crate::Result;
use fatjet_algorithms::{MassBin, MassHistogram, ScalingParameters};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writer of one JSON record per line.
pub struct JsonLinesWriter<W: Write> {
    writer: W,
    records: usize,
}

impl JsonLinesWriter<BufWriter<File>> {
    /// Creates a new file writer.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesWriter<W> {
    /// Wraps a writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer, records: 0 }
    }

    /// Writes one record.
    ///
    /// # Errors
    /// Returns an error if encoding or writing fails.
    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.records += 1;
        Ok(())
    }

    /// Writes every record of `records`.
    ///
    /// # Errors
    /// Returns the first encoding or write error.
    pub fn write_all<'a, T, I>(&mut self, records: I) -> Result<()>
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        for record in records {
            self.write(record)?;
        }
        Ok(())
    }

    /// Records written so far.
    #[must_use]
    pub fn records(&self) -> usize {
        self.records
    }

    /// Flushes the writer.
    ///
    /// # Errors
    /// Returns an error if the flush fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes and returns the inner writer.
    ///
    /// # Errors
    /// Returns an error if the flush fails.
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Writer of selected events.
pub type SelectionWriter<W> = JsonLinesWriter<W>;

/// Writes a histogram as CSV with columns `bin,low,high,count`.
///
/// The underflow row comes first and the overflow row last.
///
/// # Errors
/// Returns an error if writing fails.
pub fn write_histogram_csv<W: Write>(mut writer: W, histogram: &MassHistogram) -> Result<()> {
    let edges = histogram.bin_edges();
    let mass_max = histogram.config().mass_max;

    writeln!(writer, "bin,low,high,count")?;
    writeln!(writer, "underflow,-inf,0,{}", histogram.count(MassBin::Underflow))?;
    for (i, count) in histogram.counts().iter().enumerate() {
        writeln!(writer, "{i},{},{},{count}", edges[i], edges[i + 1])?;
    }
    writeln!(writer, "overflow,{mass_max},inf,{}", histogram.count(MassBin::Overflow))?;
    writer.flush()?;
    Ok(())
}

/// Writes a histogram CSV file.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_histogram_csv_file<P: AsRef<Path>>(
    path: P,
    histogram: &MassHistogram,
) -> Result<()> {
    let file = File::create(path)?;
    write_histogram_csv(BufWriter::new(file), histogram)
}

/// Writes scaling parameters as a JSON object with `mean` and `std`.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_scaling_json<P: AsRef<Path>>(path: P, params: &ScalingParameters) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, params)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
