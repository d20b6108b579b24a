//! Handler contract and delivery dispatch.
//!
//! A handler is invoked once per delivered message and answers with a
//! [`Disposition`]. Brokers never see typed messages: they hand raw payloads
//! to a [`Delivery`], which decodes, runs the handler and applies the fault
//! policy.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{error, warn};

use cure_models::Message;

/// What the broker should do with a delivered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// Fully processed; remove permanently.
    Ack,
    /// Failed for good; drop or dead-letter without redelivery.
    Nack,
    /// Failed transiently; redeliver subject to the broker's redelivery limit.
    Requeue,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Ack => "ack",
            Disposition::Nack => "nack",
            Disposition::Requeue => "requeue",
        }
    }
}

/// Applied when a handler returns an error or panics, and to malformed payloads.
///
/// A crash is recorded rather than lost, but never redelivered in a loop.
pub const FAULT_DISPOSITION: Disposition = Disposition::Nack;

/// Processes one kind of message.
#[async_trait]
pub trait Handler: Send + Sync {
    type Message: Message;

    /// Handle a decoded message. An `Err` is an unhandled fault.
    async fn handle(&self, message: Self::Message) -> anyhow::Result<Disposition>;
}

/// Type-erased sink that brokers push raw payloads into.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn deliver(&self, payload: &[u8]) -> Disposition;
}

/// Binds a typed [`Handler`] to the raw [`Delivery`] interface.
pub struct TypedDelivery<H> {
    handler: H,
}

impl<H: Handler> TypedDelivery<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    pub fn message_kind(&self) -> &'static str {
        <H::Message as Message>::KIND
    }
}

#[async_trait]
impl<H: Handler> Delivery for TypedDelivery<H> {
    async fn deliver(&self, payload: &[u8]) -> Disposition {
        dispatch(&self.handler, payload).await
    }
}

/// Decode `payload` and run `handler` on it.
///
/// Malformed payloads, handler errors and handler panics all resolve to
/// [`FAULT_DISPOSITION`]; none of them escape to the receive loop.
pub async fn dispatch<H>(handler: &H, payload: &[u8]) -> Disposition
where
    H: Handler + ?Sized,
{
    let message = match <H::Message as Message>::from_bytes(payload) {
        Ok(message) => message,
        Err(e) => {
            warn!(
                kind = <H::Message as Message>::KIND,
                error = %e,
                "Rejecting malformed payload"
            );
            return FAULT_DISPOSITION;
        }
    };

    match AssertUnwindSafe(handler.handle(message)).catch_unwind().await {
        Ok(Ok(disposition)) => disposition,
        Ok(Err(e)) => {
            error!(
                kind = <H::Message as Message>::KIND,
                disposition = FAULT_DISPOSITION.as_str(),
                "Handler failed: {:#}",
                e
            );
            FAULT_DISPOSITION
        }
        Err(panic) => {
            error!(
                kind = <H::Message as Message>::KIND,
                disposition = FAULT_DISPOSITION.as_str(),
                "Handler panicked: {}",
                panic_message(panic.as_ref())
            );
            FAULT_DISPOSITION
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}
