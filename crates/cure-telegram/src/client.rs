//! Telegram Bot API HTTP client.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::TelegramConfig;
use crate::error::{TelegramError, TelegramResult};
use crate::types::{ApiResponse, BotUser, FileId, InputMediaVideo, SentMessage, MEDIA_GROUP_LIMIT};

const RETRY_BASE_DELAY_MS: u64 = 500;
const RETRY_MAX_DELAY: Duration = Duration::from_secs(30);

/// Delay before retry number `attempt` (0-based): 500ms doubling, capped at 30s.
pub fn backoff_delay(attempt: u32) -> Duration {
    let millis = RETRY_BASE_DELAY_MS.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(millis).min(RETRY_MAX_DELAY)
}

/// Text sent in place of a media group when a job produced nothing.
pub const NO_MEDIA_TEXT: &str = "Could not download any media from this message.";

/// Client for the Telegram Bot API.
pub struct TelegramClient {
    http: Client,
    config: TelegramConfig,
}

impl TelegramClient {
    /// Create a new client.
    pub fn new(config: TelegramConfig) -> TelegramResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(TelegramError::Network)?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    fn url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.token,
            method
        )
    }

    /// Verify the token by calling `getMe`.
    pub async fn check(&self) -> TelegramResult<BotUser> {
        let user: BotUser = self.call("getMe", self.http.get(self.url("getMe"))).await?;
        info!(
            "Telegram bot {} ({}) ready",
            user.username.as_deref().unwrap_or("<no username>"),
            user.id
        );
        Ok(user)
    }

    /// Upload a video file to `chat_id` and return its reusable file id.
    ///
    /// Transient failures are retried with exponential backoff.
    pub async fn upload_video(&self, chat_id: i64, path: &Path) -> TelegramResult<FileId> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "video.mp4".to_string());

        info!(chat_id, "Uploading {} ({} bytes)", path.display(), data.len());

        let message: SentMessage = self
            .with_retry("sendVideo", || {
                let form = Form::new()
                    .text("chat_id", chat_id.to_string())
                    .text("supports_streaming", "true")
                    .part("video", Part::bytes(data.clone()).file_name(file_name.clone()));
                self.call("sendVideo", self.http.post(self.url("sendVideo")).multipart(form))
            })
            .await?;

        let file_id = message
            .video
            .map(|v| v.file_id)
            .ok_or(TelegramError::MissingMedia("sendVideo"))?;
        debug!("Uploaded {} as {}", path.display(), file_id);
        Ok(file_id)
    }

    /// Reply to `reply_to_message_id` with every handle, in order.
    ///
    /// One handle is sent as a single video, more are sent as media groups of
    /// at most [`MEDIA_GROUP_LIMIT`], and none yields a text notice.
    ///
    /// Chunks are separate calls: if a later one fails, the earlier ones have
    /// already been delivered.
    pub async fn send_group(
        &self,
        chat_id: i64,
        reply_to_message_id: i64,
        handles: &[FileId],
    ) -> TelegramResult<()> {
        if handles.is_empty() {
            info!(chat_id, reply_to_message_id, "No media collected, sending notice");
            let _: SentMessage = self
                .post_json(
                    "sendMessage",
                    &json!({
                        "chat_id": chat_id,
                        "text": NO_MEDIA_TEXT,
                        "reply_to_message_id": reply_to_message_id,
                        "allow_sending_without_reply": true,
                    }),
                )
                .await?;
            return Ok(());
        }

        for chunk in handles.chunks(MEDIA_GROUP_LIMIT) {
            match chunk {
                [single] => {
                    let _: SentMessage = self
                        .post_json(
                            "sendVideo",
                            &json!({
                                "chat_id": chat_id,
                                "video": single,
                                "reply_to_message_id": reply_to_message_id,
                                "allow_sending_without_reply": true,
                            }),
                        )
                        .await?;
                }
                _ => {
                    let media: Vec<_> = chunk.iter().map(InputMediaVideo::new).collect();
                    let _: Vec<SentMessage> = self
                        .post_json(
                            "sendMediaGroup",
                            &json!({
                                "chat_id": chat_id,
                                "media": media,
                                "reply_to_message_id": reply_to_message_id,
                                "allow_sending_without_reply": true,
                            }),
                        )
                        .await?;
                }
            }
        }

        info!(chat_id, reply_to_message_id, "Replied with {} videos", handles.len());
        Ok(())
    }

    async fn post_json<T, B>(&self, method: &'static str, body: &B) -> TelegramResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.call(method, self.http.post(self.url(method)).json(body))
            .await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        request: RequestBuilder,
    ) -> TelegramResult<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        let parsed: ApiResponse<T> = serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                TelegramError::InvalidResponse {
                    method,
                    message: e.to_string(),
                }
            } else {
                TelegramError::Api {
                    method,
                    status: status.as_u16(),
                    description: body.clone(),
                }
            }
        })?;

        if !parsed.ok || !status.is_success() {
            return Err(TelegramError::Api {
                method,
                status: status.as_u16(),
                description: parsed
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        parsed.result.ok_or_else(|| TelegramError::InvalidResponse {
            method,
            message: "missing result".to_string(),
        })
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, method: &'static str, operation: F) -> TelegramResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = TelegramResult<T>>,
    {
        let mut attempt: u32 = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = backoff_delay(attempt);
                    warn!(
                        "Telegram {} failed (attempt {}), retrying in {:?}: {}",
                        method,
                        attempt.saturating_add(1),
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt = attempt.saturating_add(1);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
