//! Error types for listing extraction

use thiserror::Error;

/// Message used when neither strategy produced a usable listing
pub const INCOMPLETE_DATA_MESSAGE: &str =
    "Failed to extract listing data: title or price not found";

/// Message used when a strategy panics without a readable payload
pub const UNKNOWN_FAILURE_MESSAGE: &str = "Unknown error during extraction";

#[derive(Debug, Error)]
pub enum ExtractError {
    /// A configured CSS selector could not be parsed
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// A label pattern could not be compiled
    #[error("invalid label pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Config JSON could not be decoded
    #[error("invalid extractor config: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// The structured listing resolved but is not shaped like a listing
    #[error("malformed listing payload: {0}")]
    MalformedPayload(String),

    /// No strategy located both a title and a price
    #[error("{}", INCOMPLETE_DATA_MESSAGE)]
    IncompleteDomData,
}
