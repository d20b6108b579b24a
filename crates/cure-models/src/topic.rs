//! Logical channels jobs are published on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Topic override value still used by older publishers.
pub const LEGACY_INSTA_DOWNLOAD_TOPIC: &str = "cancer/instaDownload";

/// A named channel on the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Topic {
    #[default]
    #[serde(rename = "download")]
    Download,
    #[serde(rename = "instaDownload")]
    InstaDownload,
    #[serde(rename = "youtubeUrlConvert")]
    YoutubeUrlConvert,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Download => "download",
            Topic::InstaDownload => "instaDownload",
            Topic::YoutubeUrlConvert => "youtubeUrlConvert",
        }
    }

    /// Resolve an environment-supplied topic override.
    ///
    /// Only the legacy insta value is recognised; anything else, including an
    /// unset or empty override, subscribes to the default download topic.
    pub fn from_legacy_override(value: Option<&str>) -> Self {
        match value {
            Some(LEGACY_INSTA_DOWNLOAD_TOPIC) => Topic::InstaDownload,
            _ => Topic::Download,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_insta_topic_is_aliased() {
        assert_eq!(
            Topic::from_legacy_override(Some("cancer/instaDownload")),
            Topic::InstaDownload
        );
    }

    #[test]
    fn test_unknown_override_falls_back_to_download() {
        assert_eq!(Topic::from_legacy_override(None), Topic::Download);
        assert_eq!(Topic::from_legacy_override(Some("")), Topic::Download);
        assert_eq!(Topic::from_legacy_override(Some("instaDownload")), Topic::Download);
        assert_eq!(
            Topic::from_legacy_override(Some("cancer/download")),
            Topic::Download
        );
    }

    #[test]
    fn test_topic_names() {
        assert_eq!(Topic::Download.to_string(), "download");
        assert_eq!(Topic::InstaDownload.as_str(), "instaDownload");
        assert_eq!(Topic::YoutubeUrlConvert.as_str(), "youtubeUrlConvert");
    }
}
