//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

use cure_models::{ConfigError, Env, Topic};

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Root under which per-job workspaces are created
    pub storage_dir: PathBuf,
    /// Topic to subscribe to
    pub topic: Topic,
    /// Port for the Prometheus exporter; disabled when unset
    pub metrics_port: Option<u16>,
    /// Emit JSON logs instead of coloured text
    pub log_json: bool,
    /// Per-URL yt-dlp timeout
    pub download_timeout: Duration,
    /// Per-file FFmpeg timeout
    pub convert_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("downloads"),
            topic: Topic::Download,
            metrics_port: None,
            log_json: false,
            download_timeout: Duration::from_secs(600),
            convert_timeout: Duration::from_secs(600),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env(env: &Env) -> Result<Self, ConfigError> {
        let metrics_port = match env.get("METRICS_PORT") {
            Some(_) => Some(env.required_parsed("METRICS_PORT")?),
            None => None,
        };

        Ok(Self {
            storage_dir: PathBuf::from(env.string_or("STORAGE_DIR", "downloads")),
            topic: Topic::from_legacy_override(env.get("MQTT_TOPIC_DOWNLOAD")),
            metrics_port,
            log_json: Self::wants_json_logs(env),
            download_timeout: Duration::from_secs(env.parsed_or("DOWNLOAD_TIMEOUT_SECS", 600)?),
            convert_timeout: Duration::from_secs(env.parsed_or("CONVERT_TIMEOUT_SECS", 600)?),
        })
    }

    /// `LOG_FORMAT=json` selects JSON output. Readable before the rest of the
    /// config so that config errors are logged in the right format.
    pub fn wants_json_logs(env: &Env) -> bool {
        env.get("LOG_FORMAT")
            .is_some_and(|v| v.eq_ignore_ascii_case("json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkerConfig::from_env(&Env::default()).unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("downloads"));
        assert_eq!(config.topic, Topic::Download);
        assert_eq!(config.metrics_port, None);
        assert!(!config.log_json);
    }

    #[test]
    fn test_legacy_topic_override() {
        let env = Env::from_pairs([("MQTT_TOPIC_DOWNLOAD", "cancer/instaDownload")]);
        assert_eq!(WorkerConfig::from_env(&env).unwrap().topic, Topic::InstaDownload);

        let env = Env::from_pairs([("MQTT_TOPIC_DOWNLOAD", "cancer/somethingElse")]);
        assert_eq!(WorkerConfig::from_env(&env).unwrap().topic, Topic::Download);
    }

    #[test]
    fn test_metrics_port_and_log_format() {
        let env = Env::from_pairs([
            ("METRICS_PORT", "9100"),
            ("LOG_FORMAT", "JSON"),
            ("STORAGE_DIR", "/var/lib/cure"),
        ]);
        let config = WorkerConfig::from_env(&env).unwrap();
        assert_eq!(config.metrics_port, Some(9100));
        assert!(config.log_json);
        assert_eq!(config.storage_dir, PathBuf::from("/var/lib/cure"));
    }

    #[test]
    fn test_invalid_metrics_port() {
        let env = Env::from_pairs([("METRICS_PORT", "ninety")]);
        let err = WorkerConfig::from_env(&env).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "METRICS_PORT", .. }));
    }
}
