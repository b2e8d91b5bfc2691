//! Error types.
//!
//! None of these ever reach the segmenter's caller: malformed content is
//! resolved by omission. They surface only from the strict entry points
//! ([`decode_widget`](crate::decode_widget), config loading) and from
//! misuse of [`MessageStream`](crate::MessageStream).

use thiserror::Error;

/// Why a widget payload could not be decoded.
#[derive(Debug, Error)]
pub enum DirectiveError {
    #[error("malformed widget payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("widget payload must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },
}

/// Invalid parser configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("directive token must not be empty")]
    EmptyToken,

    #[error("directive token {token:?} must not contain brackets, quotes or whitespace")]
    InvalidToken { token: String },

    #[error("streamable widget {widget_type:?} has an empty array key")]
    EmptyStreamKey { widget_type: String },

    #[error("invalid parser config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Misuse of a [`MessageStream`](crate::MessageStream).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StreamError {
    #[error("stream already completed")]
    Completed,

    #[error("stream failed: {reason}")]
    Failed { reason: String },
}
