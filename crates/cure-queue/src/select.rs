//! Startup broker selection.

use tracing::info;

use cure_models::{ConfigError, Env};

use crate::error::{QueueError, QueueResult};
use crate::pubsub::{NatsConfig, NatsSubscriber};
use crate::queue::{RedisConfig, RedisStreamSubscriber};
use crate::subscriber::Subscriber;

/// Build the subscriber for this process.
///
/// The Redis queue broker is preferred. If its configuration is incomplete or
/// invalid, the NATS pub/sub broker is configured instead. If neither can be
/// configured the error is fatal: this is a deployment mistake, not something
/// to retry.
///
/// No network connection is made here.
pub fn select_subscriber(env: &Env) -> QueueResult<Box<dyn Subscriber>> {
    let redis_err = match RedisConfig::from_env(env) {
        Ok(config) => {
            let host = config.host.clone();
            match RedisStreamSubscriber::new(config) {
                Ok(subscriber) => {
                    info!("Using Redis Streams queue broker");
                    return Ok(Box::new(subscriber));
                }
                Err(e) => ConfigError::invalid("REDIS_HOST", host, e.to_string()),
            }
        }
        Err(e) => e,
    };

    info!(
        "Couldn't initialize Redis subscriber ({}), falling back to NATS",
        redis_err
    );

    match NatsConfig::from_env(env) {
        Ok(config) => {
            info!("Using NATS JetStream pub/sub broker");
            Ok(Box::new(NatsSubscriber::new(config)))
        }
        Err(nats_err) => Err(QueueError::NoBrokerConfigured {
            redis: redis_err,
            nats: nats_err,
        }),
    }
}
