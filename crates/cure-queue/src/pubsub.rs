//! Pub/sub broker using NATS JetStream.
//!
//! Each topic is captured by a work-queue stream (`cure-<topic>`) and read
//! through a durable push consumer with explicit acknowledgement, so delivery
//! is at least once: a message published while the worker is disconnected is
//! kept by the stream, and one that is never acked is redelivered after
//! `ack_wait`. Dispositions map to:
//! - `Ack`: ack
//! - `Nack`: terminate (no further redelivery)
//! - `Requeue`: nak for immediate redelivery, terminated once the message has
//!   been redelivered `max_redeliveries` times.
//!
//! The stream has no dead-letter subject; terminated messages are only logged.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_nats::jetstream::consumer::push::Config as PushConfig;
use async_nats::jetstream::consumer::AckPolicy;
use async_nats::jetstream::stream::{Config as StreamConfig, RetentionPolicy};
use async_nats::jetstream::{self, AckKind};
use async_trait::async_trait;
use futures::StreamExt;
use metrics::counter;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use cure_models::{ConfigError, Env, Topic};

use crate::error::{QueueError, QueueResult};
use crate::handler::{Delivery, Disposition};
use crate::subscriber::{BrokerKind, Subscriber};

/// How the client reaches the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NatsTransport {
    #[default]
    Tcp,
    WebSockets,
}

impl NatsTransport {
    fn scheme(&self) -> &'static str {
        match self {
            NatsTransport::Tcp => "nats",
            NatsTransport::WebSockets => "ws",
        }
    }
}

impl FromStr for NatsTransport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(NatsTransport::Tcp),
            "websocket" | "websockets" => Ok(NatsTransport::WebSockets),
            other => Err(format!("unknown transport '{}', expected tcp or websockets", other)),
        }
    }
}

impl fmt::Display for NatsTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NatsTransport::Tcp => f.write_str("tcp"),
            NatsTransport::WebSockets => f.write_str("websockets"),
        }
    }
}

/// Pub/sub broker configuration.
#[derive(Clone)]
pub struct NatsConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub transport: NatsTransport,
    /// Durable consumer name shared by all workers
    pub consumer: String,
    /// Redeliveries allowed for a requeued message
    pub max_redeliveries: u32,
    /// How long a delivered message may stay unacked before redelivery
    pub ack_wait: Duration,
}

impl fmt::Debug for NatsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NatsConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("transport", &self.transport)
            .field("consumer", &self.consumer)
            .field("max_redeliveries", &self.max_redeliveries)
            .field("ack_wait", &self.ack_wait)
            .finish()
    }
}

impl NatsConfig {
    /// Build from environment variables.
    ///
    /// `NATS_HOST`, `NATS_PORT`, `NATS_USER` and `NATS_PASSWORD` are required.
    pub fn from_env(env: &Env) -> Result<Self, ConfigError> {
        let config = Self {
            host: env.required("NATS_HOST")?,
            port: env.required_parsed("NATS_PORT")?,
            user: env.required("NATS_USER")?,
            password: env.required("NATS_PASSWORD")?,
            transport: env.parsed_or("NATS_TRANSPORT", NatsTransport::Tcp)?,
            consumer: env.string_or("NATS_CONSUMER", "cure-workers"),
            max_redeliveries: env.parsed_or("NATS_MAX_REDELIVERIES", 3)?,
            ack_wait: Duration::from_secs(env.parsed_or("NATS_ACK_WAIT_SECS", 900)?),
        };
        debug!("Going to use {} transport", config.transport);
        Ok(config)
    }

    pub fn server_url(&self) -> String {
        format!("{}://{}:{}", self.transport.scheme(), self.host, self.port)
    }

    pub fn stream_name(&self, topic: Topic) -> String {
        format!("cure-{}", topic.as_str())
    }
}

/// What the adapter does with a delivered JetStream message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JetStreamAction {
    Ack,
    /// Stop redelivering, with the reason logged.
    Term(&'static str),
    /// Redeliver now.
    Nak,
}

/// Map a disposition to an acknowledgement.
///
/// `delivered` is the server's delivery count for the message, starting at 1.
pub fn jetstream_action(
    disposition: Disposition,
    delivered: u64,
    max_redeliveries: u32,
) -> JetStreamAction {
    match disposition {
        Disposition::Ack => JetStreamAction::Ack,
        Disposition::Nack => JetStreamAction::Term("rejected by handler"),
        Disposition::Requeue if delivered.saturating_sub(1) >= u64::from(max_redeliveries) => {
            JetStreamAction::Term("redelivery limit reached")
        }
        Disposition::Requeue => JetStreamAction::Nak,
    }
}

/// Subscriber backed by JetStream durable consumers.
pub struct NatsSubscriber {
    config: NatsConfig,
    client: OnceCell<async_nats::Client>,
}

impl NatsSubscriber {
    /// Create the subscriber. The connection is opened by the first subscription
    /// and shared by later ones.
    pub fn new(config: NatsConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &NatsConfig {
        &self.config
    }

    async fn client(&self) -> QueueResult<&async_nats::Client> {
        self.client
            .get_or_try_init(|| async {
                let url = self.config.server_url();
                info!("Connecting to NATS at {}", url);
                async_nats::ConnectOptions::with_user_and_password(
                    self.config.user.clone(),
                    self.config.password.clone(),
                )
                .connect(url.as_str())
                .await
                .map_err(|e| QueueError::connection_failed(format!("nats {}: {}", url, e)))
            })
            .await
    }

    async fn settle(&self, message: &jetstream::Message, disposition: Disposition) {
        let delivered = message
            .info()
            .map(|info| u64::try_from(info.delivered).unwrap_or(1))
            .unwrap_or(1);

        let max = self.config.max_redeliveries;
        let (kind, action) = match jetstream_action(disposition, delivered, max) {
            JetStreamAction::Ack => (AckKind::Ack, "ack"),
            JetStreamAction::Term(reason) => {
                warn!(
                    subject = %message.subject,
                    delivered,
                    "Terminating message: {}", reason
                );
                (AckKind::Term, "term")
            }
            JetStreamAction::Nak => {
                info!(
                    subject = %message.subject,
                    "Requeueing message (delivery {}/{})",
                    delivered,
                    u64::from(max) + 1
                );
                (AckKind::Nak(None), "nak")
            }
        };

        if let Err(e) = message.ack_with(kind).await {
            error!(subject = %message.subject, "Failed to {} message: {}", action, e);
        }
    }
}

#[async_trait]
impl Subscriber for NatsSubscriber {
    fn kind(&self) -> BrokerKind {
        BrokerKind::PubSub
    }

    async fn subscribe_raw(
        &self,
        topic: Topic,
        delivery: Arc<dyn Delivery>,
    ) -> QueueResult<Infallible> {
        let client = self.client().await?;
        let js = jetstream::new(client.clone());

        let stream_name = self.config.stream_name(topic);
        let stream = js
            .get_or_create_stream(StreamConfig {
                name: stream_name.clone(),
                subjects: vec![topic.as_str().to_string()],
                retention: RetentionPolicy::WorkQueue,
                ..Default::default()
            })
            .await
            .map_err(QueueError::nats)?;

        let consumer_name = format!("{}-{}", self.config.consumer, topic.as_str());
        let consumer = stream
            .get_or_create_consumer(
                &consumer_name,
                PushConfig {
                    durable_name: Some(consumer_name.clone()),
                    deliver_subject: format!("cure.deliver.{}", consumer_name),
                    deliver_group: Some(consumer_name.clone()),
                    filter_subject: topic.as_str().to_string(),
                    ack_policy: AckPolicy::Explicit,
                    ack_wait: self.config.ack_wait,
                    max_deliver: i64::from(self.config.max_redeliveries) + 1,
                    // One job at a time per worker
                    max_ack_pending: 1,
                    ..Default::default()
                },
            )
            .await
            .map_err(QueueError::nats)?;

        let mut messages = consumer.messages().await.map_err(QueueError::nats)?;

        info!(
            "Consumer '{}' subscribed to JetStream stream {} (subject {})",
            consumer_name, stream_name, topic
        );

        while let Some(next) = messages.next().await {
            let message = match next {
                Ok(message) => message,
                Err(e) => {
                    error!(error = %e, "JetStream message error");
                    continue;
                }
            };

            let disposition = delivery.deliver(&message.payload).await;
            counter!(
                "cure_deliveries_total",
                "broker" => "nats",
                "disposition" => disposition.as_str()
            )
            .increment(1);
            self.settle(&message, disposition).await;
        }

        Err(QueueError::SubscriptionClosed(topic.to_string()))
    }
}
