//! Runs and the people who play them.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Bid, EntityId};

/// Game and category details shown next to a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RunMetadata {
    /// Speedrun category (e.g. `"Any%"`).
    pub category: String,
    /// Platform the run is played on.
    pub platform: String,
    /// Game name as known to the streaming platform.
    pub twitch_game_name: String,
    /// Game id on the streaming platform.
    pub twitch_game_id: String,
    /// Free-form note.
    pub note: String,
}

/// A scheduled speedrun with its teams and incentive bids.
///
/// Teams and bids are owned by the run; the schedule is referenced by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Run {
    /// Run identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Scheduled start, epoch milliseconds.
    pub start_time_mili: i64,
    /// Human-readable estimate (e.g. `"1:30:00"`).
    pub estimate_string: String,
    /// Estimate in milliseconds.
    pub estimate_mili: i64,
    /// Setup time before the run, in milliseconds.
    pub setup_time_mili: i64,
    /// Run status (e.g. `"default"`, `"playing"`, `"finished"`).
    pub status: String,
    /// Game/category metadata.
    pub metadata: RunMetadata,
    /// Owning schedule.
    pub schedule_id: EntityId,
    /// Teams in first-seen order.
    pub teams: Vec<Team>,
    /// Incentive bids in first-seen order.
    pub bids: Vec<Bid>,
}

/// A team competing in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Team {
    /// Team identifier.
    pub id: EntityId,
    /// Team name.
    pub name: String,
    /// Players in first-seen order.
    pub players: Vec<Player>,
}

/// A user's membership in a team, with a read-only copy of their profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Player {
    /// Referenced user.
    pub user_id: EntityId,
    /// Denormalized public profile of the user.
    pub user: User,
}

/// Public user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// User identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Unique username.
    pub username: String,
    /// Social handles.
    pub socials: UserSocials,
}

/// Social handles of a user. Absent handles are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserSocials {
    /// Twitch handle.
    pub twitch: Option<String>,
    /// Twitter handle.
    pub twitter: Option<String>,
    /// YouTube handle.
    pub youtube: Option<String>,
    /// Facebook handle.
    pub facebook: Option<String>,
}
