use std::borrow::Cow;
use std::path::PathBuf;

use thiserror::Error;

use crate::TokenId;

/// Failure to obtain one token's metadata. The acquisition loop records it and
/// moves on to the next token.
#[derive(Debug, Error, Clone, PartialEq)]
pub(crate) enum AcquisitionError {
    #[error("tokenURI lookup failed for token {token_id}: {message}")]
    Rpc { token_id: TokenId, message: String },

    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("could not decode {context}: {message}")]
    Decode {
        context: Cow<'static, str>,
        message: String,
    },

    #[error("invalid locator '{locator}': {reason}")]
    InvalidLocator { locator: String, reason: String },
}

/// Errors that end a run.
#[derive(Debug, Error)]
pub(crate) enum RarityError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {reason}")]
    Config { reason: Cow<'static, str> },
}

impl RarityError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }
}

pub(crate) type Result<T> = std::result::Result<T, RarityError>;
