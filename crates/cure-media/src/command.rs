//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};

/// A single-input, single-output FFmpeg invocation. Codecs and container
/// are chosen by FFmpeg from the output extension.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: PathBuf,
    output: PathBuf,
}

impl FfmpegCommand {
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
        }
    }

    /// Build the command arguments. The output is always overwritten and
    /// only errors are logged.
    pub fn build_args(&self) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-v".to_string(),
            "error".to_string(),
            "-nostdin".to_string(),
            "-i".to_string(),
            self.input.to_string_lossy().to_string(),
            self.output.to_string_lossy().to_string(),
        ]
    }
}

/// Runs FFmpeg as a child process with an optional timeout.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRunner {
    timeout: Option<Duration>,
}

impl FfmpegRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill FFmpeg if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Run an FFmpeg command. A non-zero exit is an error.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, child.wait_with_output()).await {
                Ok(result) => result?,
                Err(_) => {
                    // Dropping the future drops the child, which kills it
                    warn!("FFmpeg timed out after {} seconds, killing process", timeout.as_secs());
                    return Err(MediaError::Timeout(timeout.as_secs()));
                }
            },
            None => child.wait_with_output().await?,
        };

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(MediaError::ffmpeg_failed(
            format!(
                "FFmpeg exited with non-zero status: {}",
                stderr.lines().last().unwrap_or("no output")
            ),
            (!stderr.is_empty()).then_some(stderr),
            output.status.code(),
        ))
    }
}

/// Convert `input` into `output`, letting FFmpeg pick codecs from the output extension.
pub async fn convert(runner: &FfmpegRunner, input: &Path, output: &Path) -> MediaResult<()> {
    info!("Converting from {} to {}", input.display(), output.display());
    runner.run(&FfmpegCommand::new(input, output)).await
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if yt-dlp is available.
pub fn check_ytdlp() -> MediaResult<PathBuf> {
    which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)
}
