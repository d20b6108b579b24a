//! Media download using yt-dlp.
//!
//! Every download goes into its own, caller-owned directory. Whatever yt-dlp
//! leaves there (one file for a video, several for a carousel post) is the
//! result of the download.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};

/// File name template; zero-padded so lexical order is download order.
const OUTPUT_TEMPLATE: &str = "output%(autonumber)05d.%(ext)s";

/// Suffixes of incomplete or bookkeeping files yt-dlp may leave behind.
const PARTIAL_SUFFIXES: &[&str] = &[".part", ".ytdl", ".temp"];

/// yt-dlp invocation settings.
#[derive(Debug, Clone)]
pub struct Downloader {
    program: String,
    timeout: Option<Duration>,
}

impl Default for Downloader {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            timeout: None,
        }
    }
}

impl Downloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill yt-dlp if a single download runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the yt-dlp arguments for downloading `url` into `dest_dir`.
    pub fn build_args(&self, url: &str, dest_dir: &Path) -> Vec<String> {
        vec![
            "--no-progress".to_string(),
            "--no-color".to_string(),
            "-o".to_string(),
            dest_dir.join(OUTPUT_TEMPLATE).to_string_lossy().to_string(),
            "--".to_string(),
            url.to_string(),
        ]
    }

    /// Download `url` into `dest_dir` and return the produced files in order.
    ///
    /// A non-zero exit of yt-dlp is reported as [`MediaError::DownloadFailed`].
    pub async fn download(&self, url: &str, dest_dir: &Path) -> MediaResult<Vec<PathBuf>> {
        which::which(&self.program).map_err(|_| MediaError::YtDlpNotFound)?;

        info!("Downloading {} into {}", url, dest_dir.display());

        let child = Command::new(&self.program)
            .args(self.build_args(url, dest_dir))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, child.wait_with_output())
                .await
                .map_err(|_| MediaError::Timeout(timeout.as_secs()))??,
            None => child.wait_with_output().await?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);
            let code = output.status.code();
            return Err(MediaError::download_failed(
                format!(
                    "yt-dlp returned error code {}: {}",
                    code.map_or_else(|| "signal".to_string(), |c| c.to_string()),
                    stderr.lines().last().unwrap_or("Unknown error")
                ),
                code,
            ));
        }

        let files = list_downloaded_files(dest_dir).await?;
        if files.is_empty() {
            warn!("yt-dlp succeeded for {} but produced no files", url);
        }
        debug!("Downloaded files {:?}", files);
        Ok(files)
    }
}

/// Complete files directly inside `dir`, sorted by name.
pub async fn list_downloaded_files(dir: &Path) -> MediaResult<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if PARTIAL_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            continue;
        }
        files.push(entry.path());
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_build_args() {
        let args = Downloader::new()
            .build_args("https://www.instagram.com/p/abc/", Path::new("/w/job/1"));

        assert_eq!(
            args,
            vec![
                "--no-progress",
                "--no-color",
                "-o",
                "/w/job/1/output%(autonumber)05d.%(ext)s",
                "--",
                "https://www.instagram.com/p/abc/",
            ]
        );
    }

    #[tokio::test]
    async fn test_list_skips_partial_files_and_dirs() {
        let dir = TempDir::new().unwrap();
        for name in ["output00002.mp4", "output00001.webm", "output00003.mp4.part", "x.ytdl"] {
            std::fs::write(dir.path().join(name), b"data").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let files = list_downloaded_files(dir.path()).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["output00001.webm", "output00002.mp4"]);
    }

    #[tokio::test]
    async fn test_list_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert!(list_downloaded_files(dir.path()).await.unwrap().is_empty());
    }
}
