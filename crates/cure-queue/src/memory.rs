//! In-process broker.
//!
//! Messages published before a subscription starts are delivered in order;
//! once the topic is drained the subscription closes. Every disposition is
//! recorded so tests can assert on broker-side outcomes.

use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use cure_models::{Message, Topic};

use crate::error::{QueueError, QueueResult};
use crate::handler::{Delivery, Disposition};
use crate::subscriber::{BrokerKind, Subscriber};

/// Outcome the broker applied to one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub topic: Topic,
    pub payload: Vec<u8>,
    pub attempt: u32,
    pub disposition: Disposition,
}

#[derive(Debug)]
struct Pending {
    payload: Vec<u8>,
    attempt: u32,
}

#[derive(Clone)]
pub struct MemoryBroker {
    queues: Arc<Mutex<HashMap<Topic, VecDeque<Pending>>>>,
    settled: Arc<Mutex<Vec<Settlement>>>,
    max_redeliveries: u32,
}

impl Default for MemoryBroker {
    fn default() -> Self {
        Self::new(3)
    }
}

impl MemoryBroker {
    pub fn new(max_redeliveries: u32) -> Self {
        Self {
            queues: Arc::default(),
            settled: Arc::default(),
            max_redeliveries,
        }
    }

    pub async fn publish<M: Message>(&self, topic: Topic, message: &M) -> QueueResult<()> {
        self.publish_raw(topic, message.to_bytes()?).await;
        Ok(())
    }

    pub async fn publish_raw(&self, topic: Topic, payload: Vec<u8>) {
        let mut queues = self.queues.lock().await;
        queues
            .entry(topic)
            .or_default()
            .push_back(Pending { payload, attempt: 0 });
    }

    pub async fn take_settled(&self) -> Vec<Settlement> {
        let mut guard = self.settled.lock().await;
        std::mem::take(&mut *guard)
    }

    async fn next(&self, topic: Topic) -> Option<Pending> {
        let mut queues = self.queues.lock().await;
        queues.get_mut(&topic).and_then(VecDeque::pop_front)
    }
}

#[async_trait]
impl Subscriber for MemoryBroker {
    fn kind(&self) -> BrokerKind {
        BrokerKind::Memory
    }

    async fn subscribe_raw(
        &self,
        topic: Topic,
        delivery: Arc<dyn Delivery>,
    ) -> QueueResult<Infallible> {
        while let Some(pending) = self.next(topic).await {
            let disposition = delivery.deliver(&pending.payload).await;
            debug!(topic = %topic, disposition = disposition.as_str(), "Settled in-memory delivery");

            if disposition == Disposition::Requeue && pending.attempt < self.max_redeliveries {
                let mut queues = self.queues.lock().await;
                queues.entry(topic).or_default().push_back(Pending {
                    payload: pending.payload.clone(),
                    attempt: pending.attempt + 1,
                });
            }

            self.settled.lock().await.push(Settlement {
                topic,
                payload: pending.payload,
                attempt: pending.attempt,
                disposition,
            });
        }

        Err(QueueError::SubscriptionClosed(topic.to_string()))
    }
}
