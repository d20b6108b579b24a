//! Message encoding errors.

use thiserror::Error;

pub type MessageResult<T> = Result<T, MessageError>;

#[derive(Debug, Error)]
pub enum MessageError {
    /// Payload is not a well-formed message of the expected kind.
    #[error("Malformed {kind} payload: {source}")]
    Malformed {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode {kind}: {source}")]
    Encode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl MessageError {
    pub fn malformed(kind: &'static str, source: serde_json::Error) -> Self {
        Self::Malformed { kind, source }
    }

    pub fn encode(kind: &'static str, source: serde_json::Error) -> Self {
        Self::Encode { kind, source }
    }
}
