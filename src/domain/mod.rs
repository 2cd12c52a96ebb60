//! Domain layer: entities, identifiers, and the ledger event system.
//!
//! This module contains the server-side domain model: the nested entity
//! graph produced by the materializer, the donation/earmark types the ledger
//! works with, and the event bus that broadcasts committed total changes.

pub mod bid;
pub mod donation;
pub mod entity_id;
pub mod event_bus;
pub mod ledger_event;
pub mod prize;
pub mod run;
pub mod schedule;

pub use bid::{Bid, BidOption, BidType};
pub use donation::{Donation, DonationWithEarmark, Earmark, EarmarkDetails, EarmarkRequest};
pub use entity_id::EntityId;
pub use event_bus::EventBus;
pub use ledger_event::LedgerEvent;
pub use prize::Prize;
pub use run::{Player, Run, RunMetadata, Team, User, UserSocials};
pub use schedule::{Event, EventSummary, Schedule};
