//! Error types for the sounding-surface-join crate.
//!
//! Almost nothing in the decoding and joining pipeline is fatal. Most of these errors are produced
//! for a single field, level, or record, logged, and then the offending item is skipped.

/// Error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// A field was present but could not be parsed.
    #[error("Malformed {field} field: {value:?}")]
    MalformedField {
        /// Name of the field that failed to parse.
        field: &'static str,
        /// The raw text of the field.
        value: String,
    },
    /// A field required to build a record was blank or absent.
    #[error("Missing required field {0}.")]
    MissingField(&'static str),
    /// A date or time could not be assembled from the record.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    /// A station marker line in a sounding archive could not be decoded.
    #[error("Malformed station marker line: {0:?}")]
    MalformedMarker(String),

    /// Forward an error from reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Forward an error from the csv crate.
    #[error("Error bubbled up from csv crate: {0}")]
    Csv(#[from] csv::Error),
}

/// Shorthand for results.
pub type Result<T> = ::std::result::Result<T, DatasetError>;

impl DatasetError {
    pub(crate) fn malformed(field: &'static str, value: &str) -> Self {
        DatasetError::MalformedField {
            field,
            value: value.to_owned(),
        }
    }
}
