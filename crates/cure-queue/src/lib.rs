//! Message consumption for the cure worker.
//!
//! This crate provides:
//! - The handler contract and its [`Disposition`] (ack / nack / requeue)
//! - The [`Subscriber`] capability shared by every broker
//! - A Redis Streams queue broker with explicit ack, dead-letter and redelivery
//! - A NATS JetStream pub/sub broker with durable, explicitly acked consumers
//! - An in-memory broker for tests (`test-util` feature)
//! - Startup broker selection with fallback

pub mod error;
pub mod handler;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod pubsub;
pub mod queue;
pub mod select;
pub mod subscriber;

pub use error::{QueueError, QueueResult};
pub use handler::{dispatch, Delivery, Disposition, Handler, TypedDelivery, FAULT_DISPOSITION};
#[cfg(any(test, feature = "test-util"))]
pub use memory::{MemoryBroker, Settlement};
pub use pubsub::{jetstream_action, JetStreamAction, NatsConfig, NatsSubscriber, NatsTransport};
pub use queue::{reconnect_delay, stream_action, RedisConfig, RedisStreamSubscriber, StreamAction};
pub use select::select_subscriber;
pub use subscriber::{BrokerKind, Subscriber, SubscriberExt};
