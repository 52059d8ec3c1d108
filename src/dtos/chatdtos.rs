use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::HttpError;
use crate::models::chatmodel::Message;

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageDto {
    #[validate(length(min = 1, max = 300, message = "text must be between 1 and 300 characters"))]
    pub text: String,
}

/// Read receipt payload; the timestamp is the receipt itself and must be
/// present.
#[derive(Debug, Deserialize)]
pub struct MarkAsReadDto {
    pub read_at: Option<DateTime<Utc>>,
}

impl MarkAsReadDto {
    pub fn read_at(&self) -> Result<DateTime<Utc>, HttpError> {
        self.read_at
            .ok_or_else(|| HttpError::bad_request("Field 'read_at' cannot be missing or empty."))
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatListQuery {
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessageListQuery {
    pub limit: Option<String>,
    pub unread: Option<String>,
}

/// Query params arrive as raw strings so a malformed value can produce the
/// endpoint's own 400 instead of a generic extractor rejection.
pub fn parse_limit(raw: Option<&str>) -> Result<Option<i64>, HttpError> {
    match raw {
        None => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| HttpError::bad_request("Invalid limit value. Must be an integer.")),
    }
}

/// The unread filter is the only supported mode of the cross-chat message
/// listing and must be requested explicitly.
pub fn require_unread_param(raw: Option<&str>) -> Result<(), HttpError> {
    match raw {
        Some("true") => Ok(()),
        _ => Err(HttpError::bad_request(
            "Invalid unread value. Must be \"true\"",
        )),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: Uuid,
    pub chat: Uuid,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub is_mine: bool,
    pub text: String,
}

impl MessageDto {
    pub fn from_message(message: &Message, viewer_profile_id: Uuid) -> Self {
        MessageDto {
            id: message.id,
            chat: message.chat_id,
            sent_at: message.sent_at,
            read_at: message.read_at,
            is_mine: message.sender_id == viewer_profile_id,
            text: message.text.to_owned(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageReadDto {
    pub id: Uuid,
    pub read_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_limit_accepts_absent_value() {
        assert_eq!(parse_limit(None).unwrap(), None);
    }

    #[test]
    fn parse_limit_accepts_integers() {
        assert_eq!(parse_limit(Some("3")).unwrap(), Some(3));
    }

    #[test]
    fn parse_limit_rejects_garbage() {
        for raw in ["a", "", "1.5"] {
            let err = parse_limit(Some(raw)).unwrap_err();
            assert_eq!(err.message, "Invalid limit value. Must be an integer.");
        }
    }

    #[test]
    fn unread_param_must_be_exactly_true() {
        assert!(require_unread_param(Some("true")).is_ok());

        for raw in [None, Some("1"), Some("TRUE"), Some("false")] {
            let err = require_unread_param(raw).unwrap_err();
            assert_eq!(err.message, "Invalid unread value. Must be \"true\"");
        }
    }

    #[test]
    fn missing_read_at_is_rejected_with_exact_message() {
        let dto = MarkAsReadDto { read_at: None };
        let err = dto.read_at().unwrap_err();
        assert_eq!(err.message, "Field 'read_at' cannot be missing or empty.");
    }

    #[test]
    fn message_text_length_is_bounded() {
        let too_long = SendMessageDto {
            text: "a".repeat(301),
        };
        assert!(too_long.validate().is_err());

        let empty = SendMessageDto {
            text: String::new(),
        };
        assert!(empty.validate().is_err());

        let ok = SendMessageDto {
            text: "a".repeat(300),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn is_mine_reflects_the_viewer() {
        let sender = Uuid::new_v4();
        let recipient = Uuid::new_v4();
        let message = Message {
            id: Uuid::new_v4(),
            chat_id: Uuid::new_v4(),
            sender_id: sender,
            recipient_id: recipient,
            sent_at: Utc::now(),
            read_at: None,
            text: "Hello world".to_string(),
            created_at: Utc::now(),
        };

        assert!(MessageDto::from_message(&message, sender).is_mine);
        assert!(!MessageDto::from_message(&message, recipient).is_mine);
    }
}
