//! Job payloads consumed by the worker.

use serde::{Deserialize, Serialize};

use crate::message::JsonMessage;
use crate::topic::Topic;

/// Request to fetch media from a list of URLs and reply with it in a chat.
///
/// The field names on the wire are `chat_id`, `message_id` and `urls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadJob {
    /// Destination conversation.
    pub chat_id: i64,
    /// Message that triggered the request; the reply is threaded onto it.
    #[serde(rename = "message_id")]
    pub reply_to_message_id: i64,
    /// Source URLs. Order determines upload and reply order.
    pub urls: Vec<String>,
}

impl DownloadJob {
    pub fn new(chat_id: i64, reply_to_message_id: i64, urls: Vec<String>) -> Self {
        Self {
            chat_id,
            reply_to_message_id,
            urls,
        }
    }
}

impl JsonMessage for DownloadJob {
    const KIND: &'static str = "DownloadJob";
    const TOPIC: Topic = Topic::Download;
}

/// Request to convert YouTube links found in a chat message.
///
/// Same wire shape as [`DownloadJob`], but published on its own topic and
/// consumed by a different service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YoutubeUrlConvert {
    pub chat_id: i64,
    #[serde(rename = "message_id")]
    pub reply_to_message_id: i64,
    pub urls: Vec<String>,
}

impl YoutubeUrlConvert {
    pub fn new(chat_id: i64, reply_to_message_id: i64, urls: Vec<String>) -> Self {
        Self {
            chat_id,
            reply_to_message_id,
            urls,
        }
    }
}

impl JsonMessage for YoutubeUrlConvert {
    const KIND: &'static str = "YoutubeUrlConvert";
    const TOPIC: Topic = Topic::YoutubeUrlConvert;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Message, MessageError};

    fn sample() -> DownloadJob {
        DownloadJob::new(
            -100123,
            42,
            vec![
                "https://www.instagram.com/p/abc/".to_string(),
                "https://youtu.be/xyz".to_string(),
            ],
        )
    }

    #[test]
    fn test_round_trip() {
        let job = sample();
        let bytes = job.to_bytes().unwrap();
        assert_eq!(DownloadJob::from_bytes(&bytes).unwrap(), job);
    }

    #[test]
    fn test_wire_field_names() {
        let job = DownloadJob::from_bytes(
            br#"{"chat_id": 7, "message_id": 9, "urls": ["https://a", "https://b"]}"#,
        )
        .unwrap();
        assert_eq!(job.chat_id, 7);
        assert_eq!(job.reply_to_message_id, 9);
        assert_eq!(job.urls, vec!["https://a", "https://b"]);
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let job = DownloadJob::from_bytes(
            br#"{"chat_id": 7, "message_id": 9, "urls": [], "source": "bot"}"#,
        )
        .unwrap();
        assert_eq!(job, DownloadJob::new(7, 9, vec![]));
    }

    #[test]
    fn test_url_order_preserved() {
        let job = DownloadJob::new(1, 2, vec!["c".into(), "a".into(), "b".into()]);
        let decoded = DownloadJob::from_bytes(&job.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.urls, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_topic_is_download() {
        assert_eq!(DownloadJob::topic(), Topic::Download);
    }

    #[test]
    fn test_malformed_payloads_are_rejected() {
        let payloads: &[&[u8]] = &[
            b"",
            b"not json",
            b"[]",
            b"null",
            br#"{"message_id": 1, "urls": []}"#,
            br#"{"chat_id": 1, "urls": []}"#,
            br#"{"chat_id": 1, "message_id": 2}"#,
            br#"{"chat_id": "1", "message_id": 2, "urls": []}"#,
            br#"{"chat_id": 1.5, "message_id": 2, "urls": []}"#,
            br#"{"chat_id": 1, "message_id": 2, "urls": "https://a"}"#,
            br#"{"chat_id": 1, "message_id": 2, "urls": [1, 2]}"#,
            br#"{"chat_id": 1, "message_id": null, "urls": []}"#,
            b"\xff\xfe\x00",
        ];

        for payload in payloads {
            let err = DownloadJob::from_bytes(payload).unwrap_err();
            assert!(
                matches!(err, MessageError::Malformed { kind: "DownloadJob", .. }),
                "unexpected error for {:?}: {}",
                String::from_utf8_lossy(payload),
                err
            );
        }
    }

    #[test]
    fn test_convert_request_round_trip() {
        let request = YoutubeUrlConvert::new(-5, 11, vec!["https://youtu.be/xyz".to_string()]);
        let bytes = request.to_bytes().unwrap();
        assert_eq!(YoutubeUrlConvert::from_bytes(&bytes).unwrap(), request);
        assert!(String::from_utf8(bytes).unwrap().contains("\"message_id\":11"));
    }

    #[test]
    fn test_each_kind_has_its_own_topic() {
        assert_eq!(YoutubeUrlConvert::topic(), Topic::YoutubeUrlConvert);
        assert_ne!(YoutubeUrlConvert::topic(), DownloadJob::topic());
    }

    #[test]
    fn test_malformed_convert_request_is_rejected() {
        let payloads: &[&[u8]] = &[
            b"{}",
            br#"{"chat_id": 1, "message_id": 2}"#,
            br#"{"chat_id": 1, "message_id": "2", "urls": []}"#,
            br#"{"chat_id": 1, "message_id": 2, "urls": [null]}"#,
        ];

        for payload in payloads {
            let err = YoutubeUrlConvert::from_bytes(payload).unwrap_err();
            assert!(
                matches!(err, MessageError::Malformed { kind: "YoutubeUrlConvert", .. }),
                "unexpected error for {:?}: {}",
                String::from_utf8_lossy(payload),
                err
            );
        }
    }
}
