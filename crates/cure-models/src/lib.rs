//! Shared message models for the cure download worker.
//!
//! This crate provides:
//! - The [`Message`] envelope contract (topic + lossless byte encoding)
//! - [`Topic`] identifiers, including legacy topic aliasing
//! - The [`DownloadJob`] payload consumed by the worker, and the
//!   [`YoutubeUrlConvert`] request handled elsewhere
//! - [`Env`] snapshots and [`ConfigError`] for startup configuration

pub mod env;
pub mod error;
pub mod job;
pub mod message;
pub mod topic;

pub use env::{ConfigError, Env};
pub use error::{MessageError, MessageResult};
pub use job::{DownloadJob, YoutubeUrlConvert};
pub use message::{JsonMessage, Message};
pub use topic::{Topic, LEGACY_INSTA_DOWNLOAD_TOPIC};
