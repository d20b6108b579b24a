//! Recording fakes for the pipeline's collaborators.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use cure_media::{MediaError, MediaResult};
use cure_telegram::{FileId, TelegramError, TelegramResult};
use cure_worker::{Converter, Fetcher, MediaUploader, Pipeline, ReplyEmitter};

pub const UPLOAD_CHAT: i64 = -100777;

/// Writes the configured file names into the destination dir, or fails.
#[derive(Default)]
pub struct FakeFetcher {
    outcomes: HashMap<String, Option<Vec<&'static str>>>,
    crashes: HashSet<String>,
    pub calls: Mutex<Vec<(String, PathBuf)>>,
}

impl FakeFetcher {
    pub fn ok(mut self, url: &str, files: Vec<&'static str>) -> Self {
        self.outcomes.insert(url.to_string(), Some(files));
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.outcomes.insert(url.to_string(), None);
        self
    }

    /// Leave a partial download behind, then panic.
    pub fn crashing(mut self, url: &str) -> Self {
        self.crashes.insert(url.to_string());
        self
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(u, _)| u.clone()).collect()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str, dest_dir: &Path) -> MediaResult<Vec<PathBuf>> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), dest_dir.to_path_buf()));

        if self.crashes.contains(url) {
            std::fs::write(dest_dir.join("output00001.mp4.part"), b"partial").unwrap();
            panic!("fetcher crashed on {}", url);
        }

        match self.outcomes.get(url) {
            Some(Some(files)) => Ok(files
                .iter()
                .map(|name| {
                    let path = dest_dir.join(name);
                    std::fs::write(&path, b"media").unwrap();
                    path
                })
                .collect()),
            _ => Err(MediaError::download_failed("yt-dlp returned error code 1", Some(1))),
        }
    }
}

#[derive(Default)]
pub struct FakeConverter {
    pub fail: bool,
    pub calls: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl FakeConverter {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Converter for FakeConverter {
    async fn convert(&self, input: &Path, output: &Path) -> MediaResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push((input.to_path_buf(), output.to_path_buf()));
        if self.fail {
            return Err(MediaError::ffmpeg_failed("Invalid data found", None, Some(1)));
        }
        std::fs::write(output, b"converted").unwrap();
        Ok(())
    }
}

/// Hands out the uploaded file's name as its handle.
#[derive(Default)]
pub struct FakeUploader {
    pub fail: bool,
    pub calls: Mutex<Vec<(i64, PathBuf)>>,
}

#[async_trait]
impl MediaUploader for FakeUploader {
    async fn upload(&self, chat_id: i64, path: &Path) -> TelegramResult<FileId> {
        assert!(path.exists(), "uploaded file must exist: {}", path.display());
        self.calls.lock().unwrap().push((chat_id, path.to_path_buf()));
        if self.fail {
            return Err(TelegramError::Api {
                method: "sendVideo",
                status: 413,
                description: "Request Entity Too Large".to_string(),
            });
        }
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        Ok(FileId::new(name))
    }
}

#[derive(Default)]
pub struct FakeReplier {
    pub fail: bool,
    pub calls: Mutex<Vec<(i64, i64, Vec<FileId>)>>,
}

#[async_trait]
impl ReplyEmitter for FakeReplier {
    async fn send_group(
        &self,
        chat_id: i64,
        reply_to_message_id: i64,
        handles: &[FileId],
    ) -> TelegramResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push((chat_id, reply_to_message_id, handles.to_vec()));
        if self.fail {
            return Err(TelegramError::Api {
                method: "sendMediaGroup",
                status: 400,
                description: "message to reply not found".to_string(),
            });
        }
        Ok(())
    }
}

pub struct Harness {
    pub root: tempfile::TempDir,
    pub fetcher: Arc<FakeFetcher>,
    pub converter: Arc<FakeConverter>,
    pub uploader: Arc<FakeUploader>,
    pub replier: Arc<FakeReplier>,
}

impl Harness {
    pub fn new(fetcher: FakeFetcher) -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
            fetcher: Arc::new(fetcher),
            converter: Arc::default(),
            uploader: Arc::default(),
            replier: Arc::default(),
        }
    }

    pub fn with_converter(mut self, converter: FakeConverter) -> Self {
        self.converter = Arc::new(converter);
        self
    }

    pub fn with_uploader(mut self, uploader: FakeUploader) -> Self {
        self.uploader = Arc::new(uploader);
        self
    }

    pub fn with_replier(mut self, replier: FakeReplier) -> Self {
        self.replier = Arc::new(replier);
        self
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(
            self.root.path(),
            UPLOAD_CHAT,
            self.fetcher.clone(),
            self.converter.clone(),
            self.uploader.clone(),
            self.replier.clone(),
        )
    }

    /// Entries left under the storage root.
    pub fn leftovers(&self) -> usize {
        std::fs::read_dir(self.root.path()).unwrap().count()
    }

    pub fn replies(&self) -> Vec<(i64, i64, Vec<FileId>)> {
        self.replier.calls.lock().unwrap().clone()
    }

    pub fn uploaded_names(&self) -> Vec<String> {
        self.uploader
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, p)| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }
}

pub fn ids(names: &[&str]) -> Vec<FileId> {
    names.iter().map(|n| FileId::new(*n)).collect()
}
