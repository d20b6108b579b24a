//! External collaborators the pipeline drives.
//!
//! Each trait is a seam the pipeline is tested through; the production
//! implementations wrap yt-dlp, FFmpeg and the Telegram client.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use cure_media::{Downloader, FfmpegRunner, MediaResult};
use cure_telegram::{FileId, TelegramClient, TelegramResult};

/// Downloads whatever media a URL points at into `dest_dir`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, dest_dir: &Path) -> MediaResult<Vec<PathBuf>>;
}

/// Converts a file into the delivery format. A non-zero exit is an error.
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, input: &Path, output: &Path) -> MediaResult<()>;
}

/// Uploads a file and returns a handle that later sends can reference.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, chat_id: i64, path: &Path) -> TelegramResult<FileId>;
}

/// Sends one grouped reply made of previously uploaded handles.
#[async_trait]
pub trait ReplyEmitter: Send + Sync {
    async fn send_group(
        &self,
        chat_id: i64,
        reply_to_message_id: i64,
        handles: &[FileId],
    ) -> TelegramResult<()>;
}

#[async_trait]
impl Fetcher for Downloader {
    async fn fetch(&self, url: &str, dest_dir: &Path) -> MediaResult<Vec<PathBuf>> {
        self.download(url, dest_dir).await
    }
}

#[async_trait]
impl Converter for FfmpegRunner {
    async fn convert(&self, input: &Path, output: &Path) -> MediaResult<()> {
        cure_media::convert(self, input, output).await
    }
}

#[async_trait]
impl MediaUploader for TelegramClient {
    async fn upload(&self, chat_id: i64, path: &Path) -> TelegramResult<FileId> {
        self.upload_video(chat_id, path).await
    }
}

#[async_trait]
impl ReplyEmitter for TelegramClient {
    async fn send_group(
        &self,
        chat_id: i64,
        reply_to_message_id: i64,
        handles: &[FileId],
    ) -> TelegramResult<()> {
        TelegramClient::send_group(self, chat_id, reply_to_message_id, handles).await
    }
}
