//! Error types for the ranking store

use thiserror::Error;

/// Result type alias for persistence operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by a persistence backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// Local file I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport errors talking to the remote file store
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote file content was not valid base64
    #[error("Decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Remote file store answered with a failure status
    #[error("Remote store returned {status}: {message}")]
    Remote { status: u16, message: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new remote status error
    pub fn remote(status: u16, msg: impl Into<String>) -> Self {
        Self::Remote { status, message: msg.into() }
    }
}

/// A list edit that was rejected before anything changed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RankingError {
    #[error("unknown user '{0}'")]
    UnknownUser(String),

    #[error("'{0}' is not an available player")]
    UnavailablePlayer(String),

    #[error("'{0}' is already in the list")]
    AlreadyRanked(String),

    #[error("'{0}' is not in the list")]
    NotRanked(String),

    #[error("position {index} is out of range for a list of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("new order must contain exactly the current players")]
    NotAPermutation,
}
