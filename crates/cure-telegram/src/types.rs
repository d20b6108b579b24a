//! Bot API request/response types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Telegram accepts at most this many items in one `sendMediaGroup`.
pub const MEDIA_GROUP_LIMIT: usize = 10;

/// Server-side id of an uploaded file, reusable in later sends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub String);

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

/// Result of `getMe`.
#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SentMessage {
    #[allow(dead_code)]
    pub message_id: i64,
    #[serde(default)]
    pub video: Option<SentVideo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SentVideo {
    pub file_id: FileId,
}

/// Item of a `sendMediaGroup` request.
#[derive(Debug, Serialize)]
pub(crate) struct InputMediaVideo<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub media: &'a FileId,
}

impl<'a> InputMediaVideo<'a> {
    pub fn new(media: &'a FileId) -> Self {
        Self {
            kind: "video",
            media,
        }
    }
}
