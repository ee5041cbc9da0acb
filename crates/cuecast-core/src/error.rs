//! Error types for Cuecast Core
//!
//! Nothing in this taxonomy is meant to reach the embedding page as a panic or
//! exception. The lifecycle manager logs every variant where it occurs and
//! keeps the component alive.

use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Player error types
#[derive(Error, Debug)]
pub enum Error {
    // Capability errors
    #[error("The current environment does not support the player SDK")]
    UnsupportedCapability,

    #[error("Failed to load player SDK: {0}")]
    LoadFailure(String),

    #[error("Player SDK call failed: {0}")]
    Sdk(String),

    // Event errors
    #[error("Malformed metadata payload: {0}")]
    MalformedMetadataPayload(String),

    #[error("Playback error{}: {message}", code_suffix(.code))]
    Playback { code: Option<i64>, message: String },

    // Lifecycle errors
    #[error("Invalid lifecycle transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Component is not mounted")]
    NotMounted,

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn code_suffix(code: &Option<i64>) -> String {
    code.map(|c| format!(" {c}")).unwrap_or_default()
}

impl Error {
    /// Create an SDK error
    pub fn sdk(msg: impl Into<String>) -> Self {
        Error::Sdk(msg.into())
    }

    /// Returns true if the error only affects a single event and the
    /// component keeps running afterwards
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::MalformedMetadataPayload(_) | Error::Playback { .. } | Error::NotMounted
        )
    }

    /// Returns the error code used in logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::UnsupportedCapability => "UNSUPPORTED_CAPABILITY",
            Error::LoadFailure(_) => "LOAD_FAILURE",
            Error::Sdk(_) => "SDK",
            Error::MalformedMetadataPayload(_) => "MALFORMED_METADATA",
            Error::Playback { .. } => "PLAYBACK",
            Error::InvalidStateTransition { .. } => "INVALID_STATE",
            Error::NotMounted => "NOT_MOUNTED",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Url(_) => "INVALID_URL",
            Error::Json(_) => "JSON",
        }
    }
}
