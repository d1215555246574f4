use dicom_core::Tag;
use thiserror::Error;

/// Result type for rtlink operations
pub type Result<T> = std::result::Result<T, RtLinkError>;

/// Reasons a single file could not be turned into a tag record
///
/// These never abort a batch; ingest records them as ignored files using
/// the `Display` text as the reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// Not a DICOM Part 10 stream (no `DICM` magic code)
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The stream ended in the middle of an element header
    #[error("Truncated data at offset {offset}")]
    Truncated { offset: usize },

    /// A 32-bit value length with the sign bit set
    #[error("Negative length")]
    NegativeLength { tag: Tag, offset: usize },

    /// A value extends beyond the end of the stream
    #[error("Offset out of range: {tag} at {offset} needs {length} bytes, {available} left")]
    OutOfRange {
        tag: Tag,
        offset: usize,
        length: usize,
        available: usize,
    },

    /// Structurally unexpected content (e.g. a stray tag inside a sequence)
    #[error("Malformed data set: {0}")]
    Malformed(String),

    /// Error reported by the DICOM decoder
    #[error("DICOM decode error: {0}")]
    Decode(String),
}

/// Error types for rtlink operations
#[derive(Error, Debug)]
pub enum RtLinkError {
    /// File could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseFailure),

    /// Instance UID already registered in the series
    #[error("Duplicate instance {0}")]
    DuplicateInstance(String),

    /// Series UID already registered in the study
    #[error("Duplicate series {0}")]
    DuplicateSeries(String),

    /// Study UID already registered in the dictionary
    #[error("Duplicate study {0}")]
    DuplicateStudy(String),

    /// A required identifier is absent
    #[error("Missing identifier: {0}")]
    MissingIdentifier(&'static str),

    /// Lookup of an unknown study/series/instance
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for ParseFailure {
    fn from(e: dicom_object::ReadError) -> Self {
        ParseFailure::Decode(format!("{}", e))
    }
}

impl From<dicom_object::ReadError> for RtLinkError {
    fn from(e: dicom_object::ReadError) -> Self {
        RtLinkError::Parse(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_length_reason() {
        let failure = ParseFailure::NegativeLength {
            tag: Tag(0x0009, 0x0010),
            offset: 300,
        };
        assert_eq!(failure.to_string(), "Negative length");
    }

    #[test]
    fn test_parse_failure_is_transparent() {
        let err: RtLinkError = ParseFailure::Truncated { offset: 12 }.into();
        assert_eq!(err.to_string(), "Truncated data at offset 12");
    }

    #[test]
    fn test_missing_identifier_message() {
        let err = RtLinkError::MissingIdentifier("SeriesInstanceUID");
        assert_eq!(err.to_string(), "Missing identifier: SeriesInstanceUID");
    }
}
