//! Wire format of the push channel.
//!
//! One JSON object per line:
//!
//! ```text
//! {"type": "action:response", "sessionId": "s1", "payload": {"actionId": "...", "approved": true}}
//! ```
//!
//! Only `action:response` is acted on. Terminal traffic shares the channel
//! and is recognized so it can be skipped quietly.

use super::error::ChannelError;
use actiongate_domain::ActionId;
use serde::Deserialize;

pub const ACTION_RESPONSE: &str = "action:response";
pub const TERMINAL_DATA: &str = "terminal:data";
pub const TERMINAL_RESIZE: &str = "terminal:resize";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActionResponsePayload {
    action_id: String,
    approved: bool,
}

/// What a frame asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    ActionResponse { action_id: ActionId, approved: bool },
    /// Terminal traffic, not handled here
    Terminal,
    Unknown(String),
}

impl ChannelMessage {
    pub fn parse(line: &str) -> Result<Self, ChannelError> {
        Ok(serde_json::from_str(line)?)
    }
}

/// Classify a parsed frame. An `action:response` without a usable payload
/// is malformed.
pub fn classify(message: ChannelMessage) -> Result<Incoming, ChannelError> {
    match message.kind.as_str() {
        ACTION_RESPONSE => {
            let payload: ActionResponsePayload = serde_json::from_value(message.payload)?;
            Ok(Incoming::ActionResponse {
                action_id: ActionId::from(payload.action_id),
                approved: payload.approved,
            })
        }
        TERMINAL_DATA | TERMINAL_RESIZE => Ok(Incoming::Terminal),
        _ => Ok(Incoming::Unknown(message.kind)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_response() {
        let message = ChannelMessage::parse(
            r#"{"type":"action:response","sessionId":"s1","payload":{"actionId":"a-1","approved":true}}"#,
        )
        .unwrap();
        assert_eq!(message.session_id.as_deref(), Some("s1"));
        assert_eq!(
            classify(message).unwrap(),
            Incoming::ActionResponse {
                action_id: ActionId::from("a-1"),
                approved: true
            }
        );
    }

    #[test]
    fn test_terminal_and_unknown_types() {
        let data = ChannelMessage::parse(r#"{"type":"terminal:data","payload":"ls\r"}"#).unwrap();
        assert_eq!(classify(data).unwrap(), Incoming::Terminal);

        let other = ChannelMessage::parse(r#"{"type":"chat:message","payload":{}}"#).unwrap();
        assert_eq!(classify(other).unwrap(), Incoming::Unknown("chat:message".into()));
    }

    #[test]
    fn test_payload_is_optional_for_other_types() {
        let message = ChannelMessage::parse(r#"{"type":"terminal:resize"}"#).unwrap();
        assert_eq!(message.payload, serde_json::Value::Null);
    }

    #[test]
    fn test_action_response_requires_fields() {
        let message = ChannelMessage::parse(
            r#"{"type":"action:response","payload":{"actionId":"a-1"}}"#,
        )
        .unwrap();
        assert!(matches!(classify(message), Err(ChannelError::Malformed(_))));
    }

    #[test]
    fn test_not_json() {
        assert!(matches!(
            ChannelMessage::parse("approve a-1"),
            Err(ChannelError::Malformed(_))
        ));
    }
}
