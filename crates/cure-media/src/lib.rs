//! CLI wrappers for fetching and normalizing media.
//!
//! This crate provides:
//! - yt-dlp downloads into a caller-owned directory
//! - Type-safe FFmpeg command building and execution
//! - Delivery format checks (`.mp4`) and converted sibling naming

pub mod command;
pub mod download;
pub mod error;
pub mod format;

pub use command::{check_ffmpeg, check_ytdlp, convert, FfmpegCommand, FfmpegRunner};
pub use download::{list_downloaded_files, Downloader};
pub use error::{MediaError, MediaResult};
pub use format::{delivery_sibling, is_delivery_format, DELIVERY_EXTENSION};

