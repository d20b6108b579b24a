//! Telegram Bot API client.
//!
//! Covers the three calls the worker needs: a startup `getMe` check, video
//! upload to a storage chat, and a grouped reply built from uploaded file ids.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::TelegramClient;
pub use config::TelegramConfig;
pub use error::{TelegramError, TelegramResult};
pub use types::{BotUser, FileId, MEDIA_GROUP_LIMIT};
