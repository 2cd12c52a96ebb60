//! PostgreSQL implementation of the row source and the ledger store.

use std::fmt;

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use super::models::{
    BidRecordRow, DonationRecordRow, DonationRow, EarmarkRow, EarmarkedAmountRow, EventSummaryRow,
    OptionRecordRow, PrizeRow,
};
use super::{RowScope, RowSource};
use crate::domain::{Donation, Earmark, EntityId, EventSummary, Prize};
use crate::error::MarathonError;
use crate::ledger::{Adjusted, BidRecord, EarmarkedAmount, LedgerStore, LedgerTx, OptionRecord};
use crate::materialize::{BidRow, RunRow, ScheduleRow};

const RUN_ROWS: &str = "\
    SELECT r.id AS run_id, r.name AS run_name, r.start_time_mili, r.estimate_string, \
           r.estimate_mili, r.setup_time_mili, r.status, \
           COALESCE(rm.category, '') AS category, COALESCE(rm.platform, '') AS platform, \
           COALESCE(rm.twitch_game_name, '') AS twitch_game_name, \
           COALESCE(rm.twitch_game_id, '') AS twitch_game_id, COALESCE(rm.note, '') AS note, \
           r.schedule_id, \
           t.id AS team_id, t.name AS team_name, \
           pl.user_id, u.name AS user_name, u.username, \
           us.twitch, us.twitter, us.youtube, us.facebook, \
           b.id AS bid_id, b.bidname, b.goal, b.current_amount AS bid_current_amount, \
           b.description AS bid_description, b.type AS bid_type, b.create_new_options, \
           b.status AS bid_status, \
           bo.id AS option_id, bo.name AS option_name, bo.current_amount AS option_current_amount \
    FROM runs AS r \
    LEFT JOIN run_metadata AS rm ON rm.run_id = r.id \
    LEFT JOIN teams AS t ON t.run_id = r.id \
    LEFT JOIN players AS pl ON pl.team_id = t.id \
    LEFT JOIN users AS u ON u.id = pl.user_id \
    LEFT JOIN user_socials AS us ON us.user_id = u.id \
    LEFT JOIN bids AS b ON b.run_id = r.id \
    LEFT JOIN bid_options AS bo ON bo.bid_id = b.id";

const RUN_ORDER: &str =
    "ORDER BY r.start_time_mili, r.id, t.id, pl.user_id, b.id, bo.created_at, bo.id";

const SCHEDULE_ROWS: &str = "\
    SELECT s.id AS schedule_id, s.name AS schedule_name, \
           s.start_time_mili AS schedule_start_time_mili, \
           s.end_time_mili AS schedule_end_time_mili, s.event_id, \
           r.id AS run_id, r.name AS run_name, r.start_time_mili, r.estimate_string, \
           r.estimate_mili, r.setup_time_mili, r.status, \
           rm.category, rm.platform, rm.twitch_game_name, rm.twitch_game_id, rm.note, \
           t.id AS team_id, t.name AS team_name, \
           pl.user_id, u.name AS user_name, u.username, \
           us.twitch, us.twitter, us.youtube, us.facebook \
    FROM schedules AS s \
    LEFT JOIN runs AS r ON r.schedule_id = s.id \
    LEFT JOIN run_metadata AS rm ON rm.run_id = r.id \
    LEFT JOIN teams AS t ON t.run_id = r.id \
    LEFT JOIN players AS pl ON pl.team_id = t.id \
    LEFT JOIN users AS u ON u.id = pl.user_id \
    LEFT JOIN user_socials AS us ON us.user_id = u.id";

const SCHEDULE_ORDER: &str =
    "ORDER BY s.start_time_mili, s.id, r.start_time_mili, r.id, t.id, pl.user_id";

const BID_ROWS: &str = "\
    SELECT b.id AS bid_id, b.bidname, b.goal, b.current_amount, b.description, \
           b.type AS bid_type, b.create_new_options, b.status, b.run_id, \
           bo.id AS option_id, bo.name AS option_name, bo.current_amount AS option_current_amount \
    FROM bids AS b \
    LEFT JOIN bid_options AS bo ON bo.bid_id = b.id";

const BID_ORDER: &str = "ORDER BY b.id, bo.created_at, bo.id";

const DONATION_ROWS: &str = "\
    SELECT d.id AS donation_id, d.name AS donor_name, d.email, d.time_mili, d.amount, \
           d.description, d.to_bid, d.event_id, \
           b.id AS bid_id, b.bidname, b.type AS bid_type, \
           b.current_amount AS bid_current_amount, b.run_id, \
           bo.id AS option_id, bo.name AS option_name, \
           bo.current_amount AS option_current_amount \
    FROM donations AS d \
    LEFT JOIN donation_bids AS db ON db.donation_id = d.id \
    LEFT JOIN bids AS b ON b.id = db.bid_id \
    LEFT JOIN bid_options AS bo ON bo.id = db.bid_option_id";

const DONATION_ORDER: &str = "ORDER BY d.time_mili, d.id";

const PRIZE_ROWS: &str = "\
    SELECT p.id, p.name, p.description, p.url, p.min_amount, p.status, \
           p.international_delivery, p.event_id \
    FROM prizes AS p";

const PRIZE_ORDER: &str = "ORDER BY p.min_amount, p.id";

const EVENT_SUMMARY: &str = "\
    SELECT e.id, e.name, e.start_time_mili, e.end_time_mili, \
      (SELECT COUNT(*) FROM schedules AS s WHERE s.event_id = e.id) AS schedules_count, \
      (SELECT COUNT(*) FROM runs AS r JOIN schedules AS s ON s.id = r.schedule_id \
        WHERE s.event_id = e.id) AS runs_count, \
      (SELECT COUNT(*) FROM prizes AS p WHERE p.event_id = e.id) AS prizes_count, \
      (SELECT COUNT(*) FROM bids AS b JOIN runs AS r ON r.id = b.run_id \
        JOIN schedules AS s ON s.id = r.schedule_id WHERE s.event_id = e.id) AS bids_count, \
      (SELECT COUNT(*) FROM donations AS d WHERE d.event_id = e.id) AS donations_count, \
      (SELECT COUNT(DISTINCT pl.user_id) FROM players AS pl JOIN teams AS t ON t.id = pl.team_id \
        JOIN runs AS r ON r.id = t.run_id JOIN schedules AS s ON s.id = r.schedule_id \
        WHERE s.event_id = e.id) AS users_count \
    FROM events AS e WHERE e.id = $1";

/// Filters appended to a scoped query, keyed by scope.
struct Filters {
    id: &'static str,
    event: &'static str,
}

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_scoped<R>(
        &self,
        entity: &'static str,
        base: &str,
        filters: &Filters,
        order: &str,
        scope: RowScope,
    ) -> Result<Vec<R>, MarathonError>
    where
        R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let (filter, bind) = match scope {
            RowScope::All => ("", None),
            RowScope::Id(id) => (filters.id, Some(id.into_inner())),
            RowScope::Event(id) => (filters.event, Some(id.into_inner())),
        };
        let sql = format!("{base} {filter} {order}");
        let mut query = sqlx::query_as::<_, R>(&sql);
        if let Some(id) = bind {
            query = query.bind(id);
        }
        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| MarathonError::from_sqlx(entity, &e))
    }
}

impl RowSource for PostgresStore {
    async fn run_rows(&self, scope: RowScope) -> Result<Vec<RunRow>, MarathonError> {
        let filters = Filters {
            id: "WHERE r.id = $1",
            event: "WHERE r.schedule_id IN (SELECT id FROM schedules WHERE event_id = $1)",
        };
        self.fetch_scoped("run", RUN_ROWS, &filters, RUN_ORDER, scope)
            .await
    }

    async fn schedule_rows(&self, scope: RowScope) -> Result<Vec<ScheduleRow>, MarathonError> {
        let filters = Filters {
            id: "WHERE s.id = $1",
            event: "WHERE s.event_id = $1",
        };
        self.fetch_scoped("schedule", SCHEDULE_ROWS, &filters, SCHEDULE_ORDER, scope)
            .await
    }

    async fn bid_rows(&self, scope: RowScope) -> Result<Vec<BidRow>, MarathonError> {
        let filters = Filters {
            id: "WHERE b.id = $1",
            event: "WHERE b.run_id IN (SELECT r.id FROM runs AS r \
                    JOIN schedules AS s ON s.id = r.schedule_id WHERE s.event_id = $1)",
        };
        self.fetch_scoped("bid", BID_ROWS, &filters, BID_ORDER, scope)
            .await
    }

    async fn donation_rows(&self, scope: RowScope) -> Result<Vec<DonationRow>, MarathonError> {
        let filters = Filters {
            id: "WHERE d.id = $1",
            event: "WHERE d.event_id = $1",
        };
        self.fetch_scoped("donation", DONATION_ROWS, &filters, DONATION_ORDER, scope)
            .await
    }

    async fn prizes(&self, scope: RowScope) -> Result<Vec<Prize>, MarathonError> {
        let filters = Filters {
            id: "WHERE p.id = $1",
            event: "WHERE p.event_id = $1",
        };
        let rows: Vec<PrizeRow> = self
            .fetch_scoped("prize", PRIZE_ROWS, &filters, PRIZE_ORDER, scope)
            .await?;
        Ok(rows.into_iter().map(Prize::from).collect())
    }

    async fn event_summary(&self, event_id: &EntityId) -> Result<EventSummary, MarathonError> {
        sqlx::query_as::<_, EventSummaryRow>(EVENT_SUMMARY)
            .bind(event_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| MarathonError::from_sqlx("event", &e))?
            .map(EventSummary::from)
            .ok_or_else(|| MarathonError::not_found("event", event_id))
    }

    async fn total_donated(&self, event_id: &EntityId) -> Result<f64, MarathonError> {
        sqlx::query_scalar::<_, f64>(
            "SELECT COALESCE(SUM(amount), 0)::DOUBLE PRECISION FROM donations WHERE event_id = $1",
        )
        .bind(event_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| MarathonError::from_sqlx("donation", &e))
    }
}

impl LedgerStore for PostgresStore {
    type Tx = PgLedgerTx;

    async fn begin(&self) -> Result<PgLedgerTx, MarathonError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| MarathonError::Database(e.to_string()))?;
        Ok(PgLedgerTx { tx })
    }
}

/// A ledger unit of work backed by a PostgreSQL transaction.
///
/// Dropping it without committing rolls the transaction back.
pub struct PgLedgerTx {
    tx: Transaction<'static, Postgres>,
}

impl fmt::Debug for PgLedgerTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgLedgerTx").finish_non_exhaustive()
    }
}

fn not_found_if_missing<T>(row: Option<T>, entity: &'static str, id: &EntityId) -> Result<T, MarathonError> {
    row.ok_or_else(|| MarathonError::not_found(entity, id))
}

fn affected(rows: u64, entity: &'static str, id: &EntityId) -> Result<(), MarathonError> {
    if rows == 0 {
        Err(MarathonError::not_found(entity, id))
    } else {
        Ok(())
    }
}

impl LedgerTx for PgLedgerTx {
    async fn find_bid(&mut self, bid_id: &EntityId) -> Result<BidRecord, MarathonError> {
        let row = sqlx::query_as::<_, BidRecordRow>(
            "SELECT id, type AS bid_type, create_new_options, current_amount \
             FROM bids WHERE id = $1 FOR UPDATE",
        )
        .bind(bid_id.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| MarathonError::from_sqlx("bid", &e))?;
        not_found_if_missing(row, "bid", bid_id).map(BidRecord::from)
    }

    async fn find_option(&mut self, option_id: &EntityId) -> Result<OptionRecord, MarathonError> {
        let row = sqlx::query_as::<_, OptionRecordRow>(
            "SELECT id, bid_id, name, current_amount FROM bid_options WHERE id = $1",
        )
        .bind(option_id.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| MarathonError::from_sqlx("bid_option", &e))?;
        not_found_if_missing(row, "bid_option", option_id).map(OptionRecord::from)
    }

    async fn find_option_by_name(
        &mut self,
        bid_id: &EntityId,
        name: &str,
    ) -> Result<Option<OptionRecord>, MarathonError> {
        let row = sqlx::query_as::<_, OptionRecordRow>(
            "SELECT id, bid_id, name, current_amount FROM bid_options \
             WHERE bid_id = $1 AND name = $2",
        )
        .bind(bid_id.as_str())
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| MarathonError::from_sqlx("bid_option", &e))?;
        Ok(row.map(OptionRecord::from))
    }

    async fn options_of_bid(&mut self, bid_id: &EntityId) -> Result<Vec<OptionRecord>, MarathonError> {
        let rows = sqlx::query_as::<_, OptionRecordRow>(
            "SELECT id, bid_id, name, current_amount FROM bid_options \
             WHERE bid_id = $1 ORDER BY created_at, id",
        )
        .bind(bid_id.as_str())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| MarathonError::from_sqlx("bid_option", &e))?;
        Ok(rows.into_iter().map(OptionRecord::from).collect())
    }

    async fn upsert_option(&mut self, option: &OptionRecord) -> Result<Adjusted, MarathonError> {
        let current = sqlx::query_scalar::<_, f64>(
            "INSERT INTO bid_options (id, name, current_amount, bid_id) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE \
             SET current_amount = bid_options.current_amount + EXCLUDED.current_amount \
             RETURNING current_amount",
        )
        .bind(option.id.as_str())
        .bind(&option.name)
        .bind(option.current_amount)
        .bind(option.bid_id.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| MarathonError::from_sqlx("bid_option", &e))?;
        Ok(Adjusted {
            previous: (current - option.current_amount).max(0.0),
            current,
        })
    }

    async fn find_donation(&mut self, donation_id: &EntityId) -> Result<Donation, MarathonError> {
        let row = sqlx::query_as::<_, DonationRecordRow>(
            "SELECT id, name, email, time_mili, amount, description, to_bid, event_id \
             FROM donations WHERE id = $1 FOR UPDATE",
        )
        .bind(donation_id.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| MarathonError::from_sqlx("donation", &e))?;
        not_found_if_missing(row, "donation", donation_id).map(Donation::from)
    }

    async fn insert_donation(&mut self, donation: &Donation) -> Result<(), MarathonError> {
        sqlx::query(
            "INSERT INTO donations (id, name, email, time_mili, amount, description, to_bid, event_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(donation.id.as_str())
        .bind(&donation.name)
        .bind(&donation.email)
        .bind(donation.time_mili)
        .bind(donation.amount)
        .bind(&donation.description)
        .bind(donation.to_bid)
        .bind(donation.event_id.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| MarathonError::from_sqlx("donation", &e))?;
        Ok(())
    }

    async fn update_donation(&mut self, donation: &Donation) -> Result<(), MarathonError> {
        let result = sqlx::query(
            "UPDATE donations SET name = $2, email = $3, time_mili = $4, amount = $5, \
             description = $6, to_bid = $7, event_id = $8 WHERE id = $1",
        )
        .bind(donation.id.as_str())
        .bind(&donation.name)
        .bind(&donation.email)
        .bind(donation.time_mili)
        .bind(donation.amount)
        .bind(&donation.description)
        .bind(donation.to_bid)
        .bind(donation.event_id.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| MarathonError::from_sqlx("donation", &e))?;
        affected(result.rows_affected(), "donation", &donation.id)
    }

    async fn delete_donation(&mut self, donation_id: &EntityId) -> Result<(), MarathonError> {
        let result = sqlx::query("DELETE FROM donations WHERE id = $1")
            .bind(donation_id.as_str())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| MarathonError::from_sqlx("donation", &e))?;
        affected(result.rows_affected(), "donation", donation_id)
    }

    async fn find_earmark(&mut self, donation_id: &EntityId) -> Result<Option<Earmark>, MarathonError> {
        let row = sqlx::query_as::<_, EarmarkRow>(
            "SELECT bid_id, bid_option_id FROM donation_bids WHERE donation_id = $1",
        )
        .bind(donation_id.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| MarathonError::from_sqlx("donation_bid", &e))?;
        Ok(row.map(Earmark::from))
    }

    async fn set_earmark(&mut self, donation_id: &EntityId, earmark: &Earmark) -> Result<(), MarathonError> {
        sqlx::query(
            "INSERT INTO donation_bids (donation_id, bid_id, bid_option_id) VALUES ($1, $2, $3) \
             ON CONFLICT (donation_id) DO UPDATE \
             SET bid_id = EXCLUDED.bid_id, bid_option_id = EXCLUDED.bid_option_id",
        )
        .bind(donation_id.as_str())
        .bind(earmark.bid_id.as_str())
        .bind(earmark.option_id.as_ref().map(EntityId::as_str))
        .execute(&mut *self.tx)
        .await
        .map_err(|e| MarathonError::from_sqlx("donation_bid", &e))?;
        Ok(())
    }

    async fn clear_earmark(&mut self, donation_id: &EntityId) -> Result<(), MarathonError> {
        sqlx::query("DELETE FROM donation_bids WHERE donation_id = $1")
            .bind(donation_id.as_str())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| MarathonError::from_sqlx("donation_bid", &e))?;
        Ok(())
    }

    async fn adjust_bid_total(&mut self, bid_id: &EntityId, delta: f64) -> Result<Adjusted, MarathonError> {
        let row = sqlx::query_as::<_, (f64, f64)>(
            "WITH prev AS (SELECT id, current_amount FROM bids WHERE id = $1 FOR UPDATE) \
             UPDATE bids AS b SET current_amount = GREATEST(prev.current_amount + $2, 0) \
             FROM prev WHERE b.id = prev.id \
             RETURNING prev.current_amount, b.current_amount",
        )
        .bind(bid_id.as_str())
        .bind(delta)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| MarathonError::from_sqlx("bid", &e))?;
        let (previous, current) = not_found_if_missing(row, "bid", bid_id)?;
        Ok(Adjusted { previous, current })
    }

    async fn adjust_option_total(
        &mut self,
        option_id: &EntityId,
        delta: f64,
    ) -> Result<Adjusted, MarathonError> {
        let row = sqlx::query_as::<_, (f64, f64)>(
            "WITH prev AS (SELECT id, current_amount FROM bid_options WHERE id = $1 FOR UPDATE) \
             UPDATE bid_options AS bo SET current_amount = GREATEST(prev.current_amount + $2, 0) \
             FROM prev WHERE bo.id = prev.id \
             RETURNING prev.current_amount, bo.current_amount",
        )
        .bind(option_id.as_str())
        .bind(delta)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| MarathonError::from_sqlx("bid_option", &e))?;
        let (previous, current) = not_found_if_missing(row, "bid_option", option_id)?;
        Ok(Adjusted { previous, current })
    }

    async fn set_bid_total(&mut self, bid_id: &EntityId, total: f64) -> Result<Adjusted, MarathonError> {
        let row = sqlx::query_as::<_, (f64, f64)>(
            "WITH prev AS (SELECT id, current_amount FROM bids WHERE id = $1 FOR UPDATE) \
             UPDATE bids AS b SET current_amount = GREATEST($2, 0) \
             FROM prev WHERE b.id = prev.id \
             RETURNING prev.current_amount, b.current_amount",
        )
        .bind(bid_id.as_str())
        .bind(total)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| MarathonError::from_sqlx("bid", &e))?;
        let (previous, current) = not_found_if_missing(row, "bid", bid_id)?;
        Ok(Adjusted { previous, current })
    }

    async fn set_option_total(
        &mut self,
        option_id: &EntityId,
        total: f64,
    ) -> Result<Adjusted, MarathonError> {
        let row = sqlx::query_as::<_, (f64, f64)>(
            "WITH prev AS (SELECT id, current_amount FROM bid_options WHERE id = $1 FOR UPDATE) \
             UPDATE bid_options AS bo SET current_amount = GREATEST($2, 0) \
             FROM prev WHERE bo.id = prev.id \
             RETURNING prev.current_amount, bo.current_amount",
        )
        .bind(option_id.as_str())
        .bind(total)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| MarathonError::from_sqlx("bid_option", &e))?;
        let (previous, current) = not_found_if_missing(row, "bid_option", option_id)?;
        Ok(Adjusted { previous, current })
    }

    async fn earmarked_amounts(&mut self, bid_id: &EntityId) -> Result<Vec<EarmarkedAmount>, MarathonError> {
        let rows = sqlx::query_as::<_, EarmarkedAmountRow>(
            "SELECT db.donation_id, db.bid_option_id AS option_id, d.amount \
             FROM donation_bids AS db JOIN donations AS d ON d.id = db.donation_id \
             WHERE db.bid_id = $1 ORDER BY d.time_mili, d.id",
        )
        .bind(bid_id.as_str())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| MarathonError::from_sqlx("donation_bid", &e))?;
        Ok(rows.into_iter().map(EarmarkedAmount::from).collect())
    }

    async fn commit(self) -> Result<(), MarathonError> {
        self.tx
            .commit()
            .await
            .map_err(|e| MarathonError::Database(e.to_string()))
    }

    async fn rollback(self) -> Result<(), MarathonError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| MarathonError::Database(e.to_string()))
    }
}
