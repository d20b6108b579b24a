//! Queue error types.

use cure_models::{ConfigError, MessageError};
use thiserror::Error;

pub type QueueResult<T> = Result<T, QueueError>;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No broker could be configured (redis: {redis}; nats: {nats})")]
    NoBrokerConfigured {
        redis: ConfigError,
        nats: ConfigError,
    },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Subscription to {0} closed")]
    SubscriptionClosed(String),

    #[error("NATS error: {0}")]
    Nats(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Message error: {0}")]
    Message(#[from] MessageError),
}

impl QueueError {
    pub fn connection_failed(msg: impl Into<String>) -> Self {
        Self::ConnectionFailed(msg.into())
    }

    pub fn nats(err: impl std::fmt::Display) -> Self {
        Self::Nats(err.to_string())
    }

    /// Whether the receive loop should reconnect instead of giving up.
    pub fn is_connection_dropped(&self) -> bool {
        match self {
            QueueError::Redis(e) => e.is_io_error() || e.is_connection_dropped(),
            _ => false,
        }
    }
}
