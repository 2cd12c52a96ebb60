//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered ledger events.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::domain::LedgerEvent;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and answers them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(socket: WebSocket, mut event_rx: broadcast::Receiver<LedgerEvent>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs);
                        if let Some(json) = response.to_json()
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(error = %err, "ws read failed");
                        break;
                    }
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(event) => {
                        if !subs.matches(&event) {
                            continue;
                        }
                        let Some(json) = event_message(&event).to_json() else {
                            continue;
                        };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Wraps a ledger event in an `event` envelope.
fn event_message(event: &LedgerEvent) -> WsMessage {
    WsMessage::new(
        uuid::Uuid::new_v4().to_string(),
        WsMessageType::Event,
        serde_json::to_value(event).unwrap_or_default(),
    )
}

/// Handles a text message from the client and builds the reply.
fn handle_text_message(text: &str, subs: &mut SubscriptionManager) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error("", 400, "malformed JSON");
    };
    if msg.msg_type != WsMessageType::Command {
        return WsMessage::error(msg.id, 400, "expected a command message");
    }
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return WsMessage::error(msg.id, 404, "unknown command");
    };

    let payload = match command {
        WsCommand::Subscribe { bid_ids } => {
            let added = subs.subscribe(&bid_ids);
            tracing::debug!(added = added.len(), wildcard = subs.is_subscribed_all(), "ws subscribe");
            serde_json::json!({
                "subscribed": added,
                "count": subs.count(),
                "wildcard": subs.is_subscribed_all(),
            })
        }
        WsCommand::Unsubscribe { bid_ids } => {
            subs.unsubscribe(&bid_ids);
            serde_json::json!({
                "unsubscribed": bid_ids,
                "remaining_count": subs.count(),
                "wildcard": subs.is_subscribed_all(),
            })
        }
        WsCommand::Ping => serde_json::json!({ "pong": true }),
    };
    WsMessage::new(msg.id, WsMessageType::Response, payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_json_is_an_error() {
        let mut subs = SubscriptionManager::new();
        let reply = handle_text_message("{not json", &mut subs);
        assert_eq!(reply.msg_type, WsMessageType::Error);
        assert_eq!(reply.payload["code"], 400);
    }

    #[test]
    fn subscribe_reply_echoes_request_id() {
        let mut subs = SubscriptionManager::new();
        let reply = handle_text_message(
            r#"{"id":"abc","type":"command","payload":{"command":"subscribe","bid_ids":["B1"]}}"#,
            &mut subs,
        );
        assert_eq!(reply.id, "abc");
        assert_eq!(reply.msg_type, WsMessageType::Response);
        assert_eq!(reply.payload["count"], 1);
    }

    #[test]
    fn unknown_command_is_rejected() {
        let mut subs = SubscriptionManager::new();
        let reply = handle_text_message(
            r#"{"id":"x","type":"command","payload":{"command":"rewind"}}"#,
            &mut subs,
        );
        assert_eq!(reply.msg_type, WsMessageType::Error);
        assert_eq!(reply.payload["code"], 404);
    }

    #[test]
    fn events_are_wrapped_with_type_tag() {
        let event = LedgerEvent::BidTotalChanged {
            bid_id: "B1".into(),
            previous: 1.0,
            current: 2.0,
            timestamp: chrono::Utc::now(),
        };
        let msg = event_message(&event);
        assert_eq!(msg.msg_type, WsMessageType::Event);
        assert_eq!(msg.payload["event_type"], "bid_total_changed");
    }
}
