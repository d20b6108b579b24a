//! The subscription capability every broker implements.

use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;

use cure_models::Topic;

use crate::error::QueueResult;
use crate::handler::{Delivery, Handler, TypedDelivery};

/// Which broker backs a [`Subscriber`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrokerKind {
    /// Redis Streams consumer group (explicit ack).
    Queue,
    /// NATS JetStream durable consumer.
    PubSub,
    /// In-process broker used by tests.
    Memory,
}

impl BrokerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrokerKind::Queue => "redis",
            BrokerKind::PubSub => "nats",
            BrokerKind::Memory => "memory",
        }
    }
}

/// Receives messages from a broker and settles them with the handler's disposition.
#[async_trait]
pub trait Subscriber: Send + Sync {
    fn kind(&self) -> BrokerKind;

    /// Run the receive loop for `topic`, handing each payload to `delivery`.
    ///
    /// Blocks for as long as the subscription is alive. Deliveries are handled
    /// one at a time, in broker order. The call only returns on a connection
    /// failure or when the broker closes the subscription.
    async fn subscribe_raw(
        &self,
        topic: Topic,
        delivery: Arc<dyn Delivery>,
    ) -> QueueResult<Infallible>;
}

#[async_trait]
pub trait SubscriberExt: Subscriber {
    /// Bind `topic` to `handler` and its message type, then receive forever.
    ///
    /// Each call is an independent subscription; several may run against the
    /// same subscriber concurrently.
    async fn subscribe<H>(&self, topic: Topic, handler: H) -> QueueResult<Infallible>
    where
        H: Handler + 'static,
    {
        self.subscribe_raw(topic, Arc::new(TypedDelivery::new(handler)))
            .await
    }
}

impl<S: Subscriber + ?Sized> SubscriberExt for S {}
