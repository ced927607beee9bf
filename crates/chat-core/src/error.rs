//! Error types for message formatting and model calls.

use thiserror::Error;

/// Errors raised while parsing or formatting message content.
///
/// Unknown variants are always fatal: a message that cannot be formatted
/// exactly would break reconstruction later, so nothing is coerced.
#[derive(Debug, Error)]
pub enum FormatError {
    /// A content part carried a `type` tag outside the allowed set.
    #[error("Unknown content part type: {0}")]
    UnknownPartType(String),

    /// A message carried a role outside system/user/assistant/tool.
    #[error("Unknown message role: {0}")]
    UnknownRole(String),

    /// A required field was absent.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// Content had the wrong JSON shape for its position.
    #[error("invalid content: {0}")]
    InvalidContent(String),

    /// A part had a known tag but its fields did not deserialize.
    #[error("malformed {what}: {source}")]
    Malformed {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that can occur when talking to a language or image model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Client or provider misconfiguration (missing key, bad URL).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The requested model identifier is not known.
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// Transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The provider response could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The incremental stream failed mid-way.
    #[error("stream error: {0}")]
    Stream(String),
}
