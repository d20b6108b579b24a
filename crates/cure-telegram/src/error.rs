//! Telegram client error types.

use thiserror::Error;

pub type TelegramResult<T> = Result<T, TelegramError>;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Telegram {method} rejected ({status}): {description}")]
    Api {
        method: &'static str,
        status: u16,
        description: String,
    },

    #[error("Telegram {0} response carried no video")]
    MissingMedia(&'static str),

    #[error("Invalid response from {method}: {message}")]
    InvalidResponse {
        method: &'static str,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TelegramError {
    /// Network failures, rate limiting and server errors are worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            TelegramError::Network(e) => !e.is_builder() && !e.is_decode(),
            TelegramError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
