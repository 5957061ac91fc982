//! Error types for fatjet-core.

use thiserror::Error;

/// Result type alias for fatjet operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for fatjet operations.
///
/// "Nothing matched" is never an error: routines return an empty
/// selection for that. These variants describe malformed input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Parallel columns of one collection have different lengths.
    #[error("{collection}: column `{field}` has {actual} entries, expected {expected}")]
    LengthMismatch {
        collection: &'static str,
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A generator particle points at a mother outside the collection.
    #[error("generator particle {particle} has mother index {mother}, collection holds {len}")]
    MotherIndexOutOfRange {
        particle: usize,
        mother: usize,
        len: usize,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    InvalidConfig(String),

    /// Sample name that maps to no known physics process.
    #[error("unknown process: {0}")]
    UnknownProcess(String),
}

/// Checks that a column has the length of the collection's reference column.
///
/// # Errors
/// Returns [`Error::LengthMismatch`] when the lengths differ.
#[inline]
pub fn ensure_len(
    collection: &'static str,
    field: &'static str,
    expected: usize,
    actual: usize,
) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::LengthMismatch {
            collection,
            field,
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_len() {
        assert!(ensure_len("FatJet", "eta", 3, 3).is_ok());
        let err = ensure_len("FatJet", "eta", 3, 2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "FatJet: column `eta` has 2 entries, expected 3"
        );
    }
}
