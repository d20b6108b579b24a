//! Telegram client configuration.

use std::fmt;
use std::time::Duration;

use cure_models::{ConfigError, Env};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token
    pub token: String,
    /// Chat that uploads are sent to before being forwarded by file id
    pub upload_chat_id: i64,
    /// Bot API base URL
    pub api_base: String,
    /// Request timeout (uploads can be large)
    pub timeout: Duration,
    /// Max retries for transient upload failures
    pub max_retries: u32,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("upload_chat_id", &self.upload_chat_id)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl TelegramConfig {
    pub fn new(token: impl Into<String>, upload_chat_id: i64) -> Self {
        Self {
            token: token.into(),
            upload_chat_id,
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(300),
            max_retries: 2,
        }
    }

    /// Build from environment variables.
    ///
    /// `TELEGRAM_TOKEN` and `UPLOAD_CHAT_ID` are required.
    pub fn from_env(env: &Env) -> Result<Self, ConfigError> {
        Ok(Self {
            token: env.required("TELEGRAM_TOKEN")?,
            upload_chat_id: env.required_parsed("UPLOAD_CHAT_ID")?,
            api_base: env.string_or("TELEGRAM_API_BASE", DEFAULT_API_BASE),
            timeout: Duration::from_secs(env.parsed_or("TELEGRAM_TIMEOUT_SECS", 300)?),
            max_retries: env.parsed_or("TELEGRAM_MAX_RETRIES", 2)?,
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let env = Env::from_pairs([("TELEGRAM_TOKEN", "123:abc"), ("UPLOAD_CHAT_ID", "-100500")]);
        let config = TelegramConfig::from_env(&env).unwrap();
        assert_eq!(config.upload_chat_id, -100500);
        assert_eq!(config.api_base, "https://api.telegram.org");
        assert_eq!(config.timeout, Duration::from_secs(300));
        assert_eq!(config.max_retries, 2);
    }

    #[test]
    fn test_missing_token() {
        let env = Env::from_pairs([("UPLOAD_CHAT_ID", "1")]);
        let err = TelegramConfig::from_env(&env).unwrap_err();
        assert_eq!(err, ConfigError::Missing("TELEGRAM_TOKEN"));
    }

    #[test]
    fn test_non_numeric_upload_chat() {
        let env = Env::from_pairs([("TELEGRAM_TOKEN", "t"), ("UPLOAD_CHAT_ID", "@storage")]);
        let err = TelegramConfig::from_env(&env).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "UPLOAD_CHAT_ID", .. }));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = TelegramConfig::new("123:secret", 1);
        assert!(!format!("{:?}", config).contains("secret"));
    }
}
