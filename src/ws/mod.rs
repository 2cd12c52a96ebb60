//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The endpoint at `/ws` lets clients follow bid and option totals live.
//! Clients send `subscribe` / `unsubscribe` commands with `bid_ids`
//! (`"*"` for every bid) and receive committed ledger events as `event`
//! messages.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
