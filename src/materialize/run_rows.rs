//! Row shape of the run query: run ⟶ (team ⟶ player) and (bid ⟶ option).

use crate::domain::{Bid, BidOption, BidType, Player, Run, RunMetadata, Team, User, UserSocials};

use super::{FlatRow, attach};

/// One row of `runs LEFT JOIN teams LEFT JOIN players LEFT JOIN users
/// LEFT JOIN user_socials LEFT JOIN bids LEFT JOIN bid_options`.
///
/// The team/player chain and the bid/option chain are independent: either
/// may be null on any row.
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct RunRow {
    /// Run id.
    pub run_id: String,
    /// Run name.
    pub run_name: String,
    /// Scheduled start, epoch milliseconds.
    pub start_time_mili: i64,
    /// Human-readable estimate.
    pub estimate_string: String,
    /// Estimate, milliseconds.
    pub estimate_mili: i64,
    /// Setup time, milliseconds.
    pub setup_time_mili: i64,
    /// Run status.
    pub status: String,
    /// Metadata: category.
    pub category: String,
    /// Metadata: platform.
    pub platform: String,
    /// Metadata: game name on the streaming platform.
    pub twitch_game_name: String,
    /// Metadata: game id on the streaming platform.
    pub twitch_game_id: String,
    /// Metadata: note.
    pub note: String,
    /// Owning schedule.
    pub schedule_id: String,

    /// Team id; `None` when the run has no team on this row.
    pub team_id: Option<String>,
    /// Team name.
    pub team_name: Option<String>,

    /// Player's user id; `None` when the team has no player on this row.
    pub user_id: Option<String>,
    /// User display name.
    pub user_name: Option<String>,
    /// Username.
    pub username: Option<String>,
    /// Twitch handle.
    pub twitch: Option<String>,
    /// Twitter handle.
    pub twitter: Option<String>,
    /// YouTube handle.
    pub youtube: Option<String>,
    /// Facebook handle.
    pub facebook: Option<String>,

    /// Bid id; `None` when the run has no bid on this row.
    pub bid_id: Option<String>,
    /// Bid name.
    pub bidname: Option<String>,
    /// Bid goal.
    pub goal: Option<f64>,
    /// Bid running total.
    pub bid_current_amount: Option<f64>,
    /// Bid description.
    pub bid_description: Option<String>,
    /// Bid variant.
    pub bid_type: Option<BidType>,
    /// Whether donors may add options.
    pub create_new_options: Option<bool>,
    /// Bid status.
    pub bid_status: Option<String>,

    /// Option id; `None` when the bid has no option on this row.
    pub option_id: Option<String>,
    /// Option name.
    pub option_name: Option<String>,
    /// Option running total.
    pub option_current_amount: Option<f64>,
}

impl RunRow {
    fn team(&self) -> Team {
        Team {
            id: self.team_id.clone().unwrap_or_default().into(),
            name: self.team_name.clone().unwrap_or_default(),
            players: Vec::new(),
        }
    }

    fn player(&self) -> Player {
        player_from_columns(
            self.user_id.as_deref(),
            self.user_name.as_deref(),
            self.username.as_deref(),
            UserSocials {
                twitch: self.twitch.clone(),
                twitter: self.twitter.clone(),
                youtube: self.youtube.clone(),
                facebook: self.facebook.clone(),
            },
        )
    }

    fn bid(&self) -> Bid {
        Bid {
            id: self.bid_id.clone().unwrap_or_default().into(),
            bidname: self.bidname.clone().unwrap_or_default(),
            goal: self.goal.unwrap_or_default(),
            current_amount: self.bid_current_amount.unwrap_or_default(),
            description: self.bid_description.clone().unwrap_or_default(),
            bid_type: self.bid_type.unwrap_or(BidType::Total),
            create_new_options: self.create_new_options.unwrap_or_default(),
            status: self.bid_status.clone().unwrap_or_default(),
            run_id: self.run_id.as_str().into(),
            options: Vec::new(),
        }
    }

    fn option(&self) -> BidOption {
        BidOption {
            id: self.option_id.clone().unwrap_or_default().into(),
            name: self.option_name.clone().unwrap_or_default(),
            current_amount: self.option_current_amount.unwrap_or_default(),
            bid_id: self.bid_id.clone().unwrap_or_default().into(),
        }
    }
}

/// Builds a player from nullable user columns shared by the run and
/// schedule queries.
pub(crate) fn player_from_columns(
    user_id: Option<&str>,
    name: Option<&str>,
    username: Option<&str>,
    socials: UserSocials,
) -> Player {
    let user_id = user_id.unwrap_or_default();
    Player {
        user_id: user_id.into(),
        user: User {
            id: user_id.into(),
            name: name.unwrap_or_default().to_owned(),
            username: username.unwrap_or_default().to_owned(),
            socials,
        },
    }
}

impl FlatRow for RunRow {
    type Parent = Run;

    fn parent_key(&self) -> &str {
        &self.run_id
    }

    fn build_parent(&self) -> Run {
        Run {
            id: self.run_id.as_str().into(),
            name: self.run_name.clone(),
            start_time_mili: self.start_time_mili,
            estimate_string: self.estimate_string.clone(),
            estimate_mili: self.estimate_mili,
            setup_time_mili: self.setup_time_mili,
            status: self.status.clone(),
            metadata: RunMetadata {
                category: self.category.clone(),
                platform: self.platform.clone(),
                twitch_game_name: self.twitch_game_name.clone(),
                twitch_game_id: self.twitch_game_id.clone(),
                note: self.note.clone(),
            },
            schedule_id: self.schedule_id.as_str().into(),
            teams: Vec::new(),
            bids: Vec::new(),
        }
    }

    fn attach_children(&self, run: &mut Run) {
        if let Some(team) = attach(&mut run.teams, self.team_id.as_deref(), || self.team()) {
            attach(&mut team.players, self.user_id.as_deref(), || self.player());
        }
        if let Some(bid) = attach(&mut run.bids, self.bid_id.as_deref(), || self.bid()) {
            attach(&mut bid.options, self.option_id.as_deref(), || self.option());
        }
    }
}
