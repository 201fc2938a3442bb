//! Error types for the prodir engine.

use thiserror::Error;

/// All possible errors from the prodir engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("unknown moderation status: {0}")]
    UnknownStatus(String),

    #[error("record is not a JSON object")]
    RecordNotObject,

    #[error("record is missing a string 'id' field")]
    MissingRecordId,
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::UnknownCollection("reviews".into());
        assert_eq!(err.to_string(), "unknown collection: reviews");

        let err = Error::UnknownStatus("archived".into());
        assert_eq!(err.to_string(), "unknown moderation status: archived");

        let err = Error::MissingRecordId;
        assert_eq!(err.to_string(), "record is missing a string 'id' field");
    }
}
