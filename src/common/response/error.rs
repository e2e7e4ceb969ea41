// src/common/response/error.rs

/// Error type specific to response parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseParseError {
    /// The read returned no bytes at all, not even a status code.
    #[error("empty response")]
    EmptyInput,
    /// The payload is not a number where a reading was expected.
    #[error("malformed reading: '{0}'")]
    MalformedReading(String),
}
