//! Decoding of inbound webhook bodies into the few update shapes the bot
//! reacts to. Everything else Telegram may send is `Unrecognized`.

use serde::Deserialize;
use serde_json::Value;
use teloxide::types::ChatId;

/// The user who sent a message, as far as the replies care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: u64,
    pub first_name: String,
    pub last_name: Option<String>,
}

impl Sender {
    /// First and last name joined by a space, as Telegram clients show it.
    pub fn full_name(&self) -> String {
        match self.last_name.as_deref().filter(|l| !l.is_empty()) {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingUpdate {
    /// An inline button was tapped
    CallbackQuery {
        id: String,
        chat_id: Option<ChatId>,
        data: String,
    },
    /// A new or edited message in a chat
    Message {
        chat_id: ChatId,
        text: String,
        sender: Option<Sender>,
    },
    Unrecognized,
}

impl IncomingUpdate {
    pub fn kind(&self) -> &'static str {
        match self {
            IncomingUpdate::CallbackQuery { .. } => "callback_query",
            IncomingUpdate::Message { .. } => "message",
            IncomingUpdate::Unrecognized => "unrecognized",
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawUpdate {
    #[serde(default)]
    callback_query: Option<RawCallbackQuery>,
    #[serde(default)]
    message: Option<RawMessage>,
    #[serde(default)]
    edited_message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawCallbackQuery {
    id: String,
    #[serde(default)]
    message: Option<RawMessage>,
    #[serde(default)]
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    chat: Option<RawChat>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    from: Option<RawUser>,
}

#[derive(Debug, Deserialize)]
struct RawChat {
    #[serde(default)]
    id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    id: u64,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: Option<String>,
}

impl RawMessage {
    fn chat_id(&self) -> Option<ChatId> {
        self.chat.as_ref().and_then(|c| c.id).map(ChatId)
    }
}

/// Decode a webhook body.
///
/// An empty body reads as `{}`. Valid JSON that is not an object carries
/// no update and yields `Unrecognized`; anything that is not JSON, or whose
/// known fields have the wrong type, is an error.
pub fn parse(raw: impl AsRef<[u8]>) -> Result<IncomingUpdate, serde_json::Error> {
    let raw = raw.as_ref();
    let value: Value = if raw.is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_slice(raw)?
    };

    if !value.is_object() {
        return Ok(IncomingUpdate::Unrecognized);
    }

    let update: RawUpdate = serde_json::from_value(value)?;

    if let Some(cq) = update.callback_query {
        return Ok(IncomingUpdate::CallbackQuery {
            chat_id: cq.message.as_ref().and_then(RawMessage::chat_id),
            id: cq.id,
            data: cq.data.unwrap_or_default(),
        });
    }

    let message = update.message.or(update.edited_message);
    match message {
        Some(msg) => match msg.chat_id() {
            Some(chat_id) => Ok(IncomingUpdate::Message {
                chat_id,
                text: msg.text.unwrap_or_default(),
                sender: msg.from.map(|u| Sender {
                    id: u.id,
                    first_name: u.first_name,
                    last_name: u.last_name,
                }),
            }),
            None => Ok(IncomingUpdate::Unrecognized),
        },
        None => Ok(IncomingUpdate::Unrecognized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_value(value: Value) -> IncomingUpdate {
        parse(serde_json::to_vec(&value).unwrap()).unwrap()
    }

    #[test]
    fn test_message_fields_survive() {
        let update = parse_value(json!({
            "update_id": 123456789,
            "message": {
                "message_id": 1,
                "from": {"id": 123, "is_bot": false, "first_name": "Test"},
                "chat": {"id": -100200300, "type": "group"},
                "text": "hello there /start",
                "date": 1234567890
            }
        }));
        assert_eq!(
            update,
            IncomingUpdate::Message {
                chat_id: ChatId(-100200300),
                text: "hello there /start".to_string(),
                sender: Some(Sender {
                    id: 123,
                    first_name: "Test".to_string(),
                    last_name: None,
                }),
            }
        );
    }

    #[test]
    fn test_sender_last_name_kept() {
        let update = parse_value(json!({
            "message": {
                "from": {"id": 5, "first_name": "Ada", "last_name": "Lovelace"},
                "chat": {"id": 5},
                "text": "/start"
            }
        }));
        match update {
            IncomingUpdate::Message {
                sender: Some(sender),
                ..
            } => {
                assert_eq!(sender.last_name.as_deref(), Some("Lovelace"));
                assert_eq!(sender.full_name(), "Ada Lovelace");
            }
            other => panic!("expected message with sender, got {:?}", other),
        }
    }

    #[test]
    fn test_full_name_without_last_name() {
        let sender = Sender {
            id: 1,
            first_name: "Ada".to_string(),
            last_name: Some(String::new()),
        };
        assert_eq!(sender.full_name(), "Ada");
    }

    #[test]
    fn test_callback_fields_survive() {
        let update = parse_value(json!({
            "callback_query": {
                "id": "4382bfdwdsb323b2d9",
                "data": "more_info",
                "message": {"chat": {"id": 42}}
            }
        }));
        assert_eq!(
            update,
            IncomingUpdate::CallbackQuery {
                id: "4382bfdwdsb323b2d9".to_string(),
                chat_id: Some(ChatId(42)),
                data: "more_info".to_string(),
            }
        );
    }

    #[test]
    fn test_callback_without_message_has_no_chat() {
        let update = parse_value(json!({
            "callback_query": {"id": "cb-1", "data": "no_action"}
        }));
        assert_eq!(
            update,
            IncomingUpdate::CallbackQuery {
                id: "cb-1".to_string(),
                chat_id: None,
                data: "no_action".to_string(),
            }
        );
    }

    #[test]
    fn test_callback_data_defaults_to_empty() {
        let update = parse_value(json!({
            "callback_query": {"id": "cb-2", "message": {"chat": {"id": 7}}}
        }));
        match update {
            IncomingUpdate::CallbackQuery { data, .. } => assert_eq!(data, ""),
            other => panic!("expected callback, got {:?}", other),
        }
    }

    #[test]
    fn test_callback_wins_over_message() {
        let update = parse_value(json!({
            "callback_query": {"id": "cb-3"},
            "message": {"chat": {"id": 1}, "text": "/start"}
        }));
        assert_eq!(update.kind(), "callback_query");
    }

    #[test]
    fn test_callback_without_id_is_an_error() {
        assert!(parse(r#"{"callback_query": {"data": "more_info"}}"#).is_err());
    }

    #[test]
    fn test_edited_message_is_a_message() {
        let update = parse_value(json!({
            "edited_message": {"chat": {"id": 5}, "text": "fixed typo"}
        }));
        assert_eq!(
            update,
            IncomingUpdate::Message {
                chat_id: ChatId(5),
                text: "fixed typo".to_string(),
                sender: None,
            }
        );
    }

    #[test]
    fn test_message_preferred_over_edited_message() {
        let update = parse_value(json!({
            "message": {"chat": {"id": 1}, "text": "new"},
            "edited_message": {"chat": {"id": 2}, "text": "old"}
        }));
        match update {
            IncomingUpdate::Message { chat_id, text, .. } => {
                assert_eq!(chat_id, ChatId(1));
                assert_eq!(text, "new");
            }
            other => panic!("expected message, got {:?}", other),
        }
    }

    #[test]
    fn test_message_without_text_is_empty_text() {
        let update = parse_value(json!({
            "message": {"chat": {"id": 9}, "photo": []}
        }));
        match update {
            IncomingUpdate::Message { text, .. } => assert_eq!(text, ""),
            other => panic!("expected message, got {:?}", other),
        }
    }

    #[test]
    fn test_message_without_chat_id_is_unrecognized() {
        assert_eq!(
            parse_value(json!({"message": {"text": "hi"}})),
            IncomingUpdate::Unrecognized
        );
        assert_eq!(
            parse_value(json!({"message": {"chat": {}, "text": "hi"}})),
            IncomingUpdate::Unrecognized
        );
    }

    #[test]
    fn test_other_updates_are_unrecognized() {
        assert_eq!(
            parse_value(json!({"update_id": 1, "channel_post": {"chat": {"id": 1}}})),
            IncomingUpdate::Unrecognized
        );
        assert_eq!(parse_value(json!([1, 2, 3])), IncomingUpdate::Unrecognized);
    }

    #[test]
    fn test_empty_body_is_unrecognized() {
        assert_eq!(parse("").unwrap(), IncomingUpdate::Unrecognized);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(parse("{not json").is_err());
        assert!(parse(r#"{"message": {"chat": {"id": 1}, "text": 5}}"#).is_err());
    }
}
