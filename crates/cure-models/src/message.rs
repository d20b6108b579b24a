//! The message envelope contract.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{MessageError, MessageResult};
use crate::topic::Topic;

/// A typed unit of work addressed to a topic.
///
/// Encoding must round-trip exactly, and decoding must fail closed: a payload
/// that is missing a required field or carries a field of the wrong type is an
/// error, never a partially populated value.
pub trait Message: Sized + Send + Sync + 'static {
    /// Human-readable kind, used in logs and errors.
    const KIND: &'static str;

    /// The topic this kind of message is published on.
    fn topic() -> Topic;

    fn to_bytes(&self) -> MessageResult<Vec<u8>>;

    fn from_bytes(bytes: &[u8]) -> MessageResult<Self>;
}

/// Messages encoded as JSON documents.
///
/// Implementing this marker is enough to get a [`Message`] implementation.
pub trait JsonMessage: Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: &'static str;
    const TOPIC: Topic;
}

impl<T: JsonMessage> Message for T {
    const KIND: &'static str = <T as JsonMessage>::KIND;

    fn topic() -> Topic {
        T::TOPIC
    }

    fn to_bytes(&self) -> MessageResult<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| MessageError::encode(<T as JsonMessage>::KIND, e))
    }

    fn from_bytes(bytes: &[u8]) -> MessageResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| MessageError::malformed(<T as JsonMessage>::KIND, e))
    }
}
