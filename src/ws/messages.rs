//! WebSocket message types: envelope and commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    #[serde(default)]
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Server-originated message stamped with the current time.
    #[must_use]
    pub fn new(id: impl Into<String>, msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Error reply carrying a numeric code and message.
    #[must_use]
    pub fn error(id: impl Into<String>, code: u16, message: &str) -> Self {
        Self::new(
            id,
            WsMessageType::Error,
            serde_json::json!({ "code": code, "message": message }),
        )
    }

    /// Serializes the envelope; `None` only if serialization fails.
    #[must_use]
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands that a client can send in the payload of a `command` message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Subscribe to total changes of specific bids.
    Subscribe {
        /// Bid IDs to subscribe to. Use `["*"]` for every bid.
        bid_ids: Vec<String>,
    },
    /// Unsubscribe from specific bids.
    Unsubscribe {
        /// Bid IDs to unsubscribe from.
        bid_ids: Vec<String>,
    },
    /// Liveness check.
    Ping,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn command_envelope_parses() {
        let text = r#"{"id":"1","type":"command","payload":{"command":"subscribe","bid_ids":["B1","*"]}}"#;
        let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
            panic!("envelope did not parse");
        };
        assert_eq!(msg.msg_type, WsMessageType::Command);
        let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
            panic!("command did not parse");
        };
        assert_eq!(
            command,
            WsCommand::Subscribe {
                bid_ids: vec!["B1".to_string(), "*".to_string()]
            }
        );
    }

    #[test]
    fn error_reply_has_code() {
        let msg = WsMessage::error("7", 400, "malformed JSON");
        assert_eq!(msg.msg_type, WsMessageType::Error);
        assert_eq!(msg.payload["code"], 400);
        let Some(json) = msg.to_json() else {
            panic!("serialization failed");
        };
        assert!(json.contains(r#""type":"error""#));
    }
}
