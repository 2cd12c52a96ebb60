//! Row shape of the schedule query: schedule ⟶ run ⟶ team ⟶ player.

use crate::domain::{Run, RunMetadata, Schedule, Team, UserSocials};

use super::run_rows::player_from_columns;
use super::{FlatRow, attach};

/// One row of `schedules LEFT JOIN runs LEFT JOIN teams LEFT JOIN players
/// LEFT JOIN users LEFT JOIN user_socials`, ordered by run start time.
///
/// Runs materialized from this query carry teams but no bids.
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct ScheduleRow {
    /// Schedule id.
    pub schedule_id: String,
    /// Schedule name.
    pub schedule_name: String,
    /// Schedule window start, epoch milliseconds.
    pub schedule_start_time_mili: i64,
    /// Schedule window end, epoch milliseconds.
    pub schedule_end_time_mili: i64,
    /// Owning event.
    pub event_id: String,

    /// Run id; `None` for an empty schedule.
    pub run_id: Option<String>,
    /// Run name.
    pub run_name: Option<String>,
    /// Run start, epoch milliseconds.
    pub start_time_mili: Option<i64>,
    /// Human-readable estimate.
    pub estimate_string: Option<String>,
    /// Estimate, milliseconds.
    pub estimate_mili: Option<i64>,
    /// Setup time, milliseconds.
    pub setup_time_mili: Option<i64>,
    /// Run status.
    pub status: Option<String>,
    /// Metadata: category.
    pub category: Option<String>,
    /// Metadata: platform.
    pub platform: Option<String>,
    /// Metadata: game name on the streaming platform.
    pub twitch_game_name: Option<String>,
    /// Metadata: game id on the streaming platform.
    pub twitch_game_id: Option<String>,
    /// Metadata: note.
    pub note: Option<String>,

    /// Team id.
    pub team_id: Option<String>,
    /// Team name.
    pub team_name: Option<String>,

    /// Player's user id.
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
}

impl ScheduleRow {
    fn run(&self) -> Run {
        Run {
            id: self.run_id.clone().unwrap_or_default().into(),
            name: self.run_name.clone().unwrap_or_default(),
            start_time_mili: self.start_time_mili.unwrap_or_default(),
            estimate_string: self.estimate_string.clone().unwrap_or_default(),
            estimate_mili: self.estimate_mili.unwrap_or_default(),
            setup_time_mili: self.setup_time_mili.unwrap_or_default(),
            status: self.status.clone().unwrap_or_default(),
            metadata: RunMetadata {
                category: self.category.clone().unwrap_or_default(),
                platform: self.platform.clone().unwrap_or_default(),
                twitch_game_name: self.twitch_game_name.clone().unwrap_or_default(),
                twitch_game_id: self.twitch_game_id.clone().unwrap_or_default(),
                note: self.note.clone().unwrap_or_default(),
            },
            schedule_id: self.schedule_id.as_str().into(),
            teams: Vec::new(),
            bids: Vec::new(),
        }
    }

    fn team(&self) -> Team {
        Team {
            id: self.team_id.clone().unwrap_or_default().into(),
            name: self.team_name.clone().unwrap_or_default(),
            players: Vec::new(),
        }
    }
}

impl FlatRow for ScheduleRow {
    type Parent = Schedule;

    fn parent_key(&self) -> &str {
        &self.schedule_id
    }

    fn build_parent(&self) -> Schedule {
        Schedule {
            id: self.schedule_id.as_str().into(),
            name: self.schedule_name.clone(),
            start_time_mili: self.schedule_start_time_mili,
            end_time_mili: self.schedule_end_time_mili,
            event_id: self.event_id.as_str().into(),
            runs: Vec::new(),
        }
    }

    fn attach_children(&self, schedule: &mut Schedule) {
        let Some(run) = attach(&mut schedule.runs, self.run_id.as_deref(), || self.run()) else {
            return;
        };
        let Some(team) = attach(&mut run.teams, self.team_id.as_deref(), || self.team()) else {
            return;
        };
        attach(&mut team.players, self.user_id.as_deref(), || {
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
        });
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::materialize::materialize;

    fn row(schedule: &str, run: Option<&str>, team: Option<&str>, user: Option<&str>) -> ScheduleRow {
        ScheduleRow {
            schedule_id: schedule.to_string(),
            schedule_name: format!("{schedule} name"),
            event_id: "E1".to_string(),
            run_id: run.map(str::to_string),
            run_name: run.map(|r| format!("{r} name")),
            start_time_mili: run.map(|_| 1_000),
            team_id: team.map(str::to_string),
            user_id: user.map(str::to_string),
            ..ScheduleRow::default()
        }
    }

    #[test]
    fn three_level_chain_is_nested() {
        let rows = vec![
            row("S1", Some("R1"), Some("T1"), Some("U1")),
            row("S1", Some("R1"), Some("T1"), Some("U2")),
            row("S1", Some("R2"), Some("T2"), Some("U1")),
        ];
        let schedules = materialize(&rows);
        assert_eq!(schedules.len(), 1);
        let runs = &schedules[0].runs;
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].teams[0].players.len(), 2);
        assert_eq!(runs[1].teams[0].players.len(), 1);
        assert!(runs.iter().all(|r| r.bids.is_empty()));
        assert_eq!(runs[0].schedule_id.as_str(), "S1");
    }

    #[test]
    fn empty_schedule_has_no_runs() {
        let schedules = materialize(&[row("S1", None, None, None)]);
        assert!(schedules[0].runs.is_empty());
        assert_eq!(schedules[0].event_id.as_str(), "E1");
    }

    #[test]
    fn run_without_team_keeps_empty_teams() {
        let schedules = materialize(&[row("S1", Some("R1"), None, None)]);
        assert_eq!(schedules[0].runs.len(), 1);
        assert!(schedules[0].runs[0].teams.is_empty());
    }

    #[test]
    fn repeated_run_processes_new_grandchildren() {
        let rows = vec![
            row("S1", Some("R1"), Some("T1"), None),
            row("S1", Some("R1"), Some("T1"), Some("U1")),
        ];
        let schedules = materialize(&rows);
        let team = &schedules[0].runs[0].teams[0];
        assert_eq!(team.players.len(), 1);
    }
}
