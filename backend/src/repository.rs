//! Storage port + Postgres adapter (spec.md §6).
//!
//! The core never depends on this module — `queue`, `ingame`, `games`,
//! `principal`, and `matchmaker` operate entirely on the in-memory `domain`
//! types. This is the boundary an external caller (the CLI binary, or a
//! chat-platform front-end out of scope per spec.md §1) uses to make the
//! core's decisions durable: persist a newly-registered team, hydrate a
//! team by name before queueing it, record a formed round's matches,
//! absorb a reported result's delta.
//!
//! Grounded on the teacher's `src/models/*.rs` (per-entity `query_as`
//! helpers bound to a `PgPool`) and `src/db.rs` (`create_pool`), generalized
//! to the `exists`/`insert`/`load` shape spec.md §6 names rather than the
//! teacher's ad hoc per-entity method names — the teacher never needed a
//! uniform port because it has no pluggable storage backend either, but the
//! narrower contract is what this spec asks the core to demand.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::domain::{Match, MatchResult, Player, Round, Team};
use crate::error::Result;

/// Minimal interface the core demands from storage (spec.md §2 row 2,
/// §6): `insert`, `exists`, `load` over one domain entity type, plus the
/// `execute` escape hatch on the concrete adapter for derived views.
#[async_trait::async_trait]
pub trait Repository<T>: Send + Sync {
    /// True iff an entity with matching key fields exists.
    async fn exists(&self, probe: &T) -> Result<bool>;
    /// Inserts `entity`; returns whether the insert happened.
    async fn insert(&self, entity: &T) -> Result<bool>;
    /// Hydrates an entity from a partial key (e.g. team by name).
    async fn load(&self, probe: &T) -> Result<Option<T>>;
}

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(Into::into)
}

/// Postgres-backed implementation of [`Repository`] for the five domain
/// entities (spec.md §3), sharing one pool.
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Executes a structured query and returns its rows, for the derived
    /// views spec.md §6 names (`team_with_details`,
    /// `team_details_with_delta`, `result_with_team_details`) that don't
    /// map onto a single domain entity.
    pub async fn execute_query(&self, query: &str) -> Result<Vec<sqlx::postgres::PgRow>> {
        // callers `.get::<T, _>(col)` against the returned `PgRow`s the way
        // the teacher's `models::Player::find_by_*` helpers do.
        sqlx::query(query).fetch_all(&self.pool).await.map_err(Into::into)
    }
}

#[async_trait::async_trait]
impl Repository<Player> for PgRepository {
    async fn exists(&self, probe: &Player) -> Result<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT discord_id FROM players WHERE discord_id = $1")
                .bind(probe.discord_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    async fn insert(&self, entity: &Player) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO players (discord_id, name) VALUES ($1, $2)
             ON CONFLICT (discord_id) DO NOTHING",
        )
        .bind(entity.discord_id)
        .bind(&entity.name)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn load(&self, probe: &Player) -> Result<Option<Player>> {
        sqlx::query_as::<_, Player>("SELECT discord_id, name FROM players WHERE discord_id = $1")
            .bind(probe.discord_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Into::into)
    }
}

#[async_trait::async_trait]
impl Repository<Team> for PgRepository {
    async fn exists(&self, probe: &Team) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT team_id FROM teams WHERE team_id = $1 OR name = $2",
        )
        .bind(probe.team_id)
        .bind(&probe.name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    async fn insert(&self, entity: &Team) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO teams (team_id, name, player_one, player_two, elo)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (team_id) DO NOTHING",
        )
        .bind(entity.team_id)
        .bind(&entity.name)
        .bind(entity.player_one)
        .bind(entity.player_two)
        .bind(entity.elo)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hydrates by `team_id` when non-zero, else by `name` — the "load by
    /// partial key" case spec.md §6 calls out explicitly ("team by name").
    async fn load(&self, probe: &Team) -> Result<Option<Team>> {
        let query = if probe.team_id != 0 {
            sqlx::query_as::<_, Team>(
                "SELECT team_id, name, player_one, player_two, elo FROM teams WHERE team_id = $1",
            )
            .bind(probe.team_id)
        } else {
            sqlx::query_as::<_, Team>(
                "SELECT team_id, name, player_one, player_two, elo FROM teams WHERE name = $1",
            )
            .bind(&probe.name)
        };
        query.fetch_optional(&self.pool).await.map_err(Into::into)
    }
}

#[async_trait::async_trait]
impl Repository<Round> for PgRepository {
    async fn exists(&self, probe: &Round) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT round_id FROM rounds WHERE round_id = $1")
            .bind(probe.round_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn insert(&self, entity: &Round) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO rounds (round_id, start_time, end_time, participants)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (round_id) DO NOTHING",
        )
        .bind(entity.round_id)
        .bind(entity.start_time)
        .bind(entity.end_time)
        .bind(entity.participants)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn load(&self, probe: &Round) -> Result<Option<Round>> {
        sqlx::query_as::<_, Round>(
            "SELECT round_id, start_time, end_time, participants FROM rounds WHERE round_id = $1",
        )
        .bind(probe.round_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }
}

#[async_trait::async_trait]
impl Repository<MatchResult> for PgRepository {
    async fn exists(&self, probe: &MatchResult) -> Result<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT result_id FROM results WHERE result_id = $1")
                .bind(probe.result_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    async fn insert(&self, entity: &MatchResult) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO results (result_id, team_id, points, delta) VALUES ($1, $2, $3, $4)
             ON CONFLICT (result_id) DO NOTHING",
        )
        .bind(entity.result_id)
        .bind(entity.team)
        .bind(entity.points)
        .bind(entity.delta)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn load(&self, probe: &MatchResult) -> Result<Option<MatchResult>> {
        sqlx::query_as::<_, MatchResult>(
            "SELECT result_id, team_id AS team, points, delta FROM results WHERE result_id = $1",
        )
        .bind(probe.result_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }
}

impl PgRepository {
    /// `Match` is not itself `FromRow` (its two `Result` slots are stored
    /// as separate rows joined on `match_id`, per spec.md §9's "resolve by
    /// storing IDs plus a lookup" note) so it gets dedicated insert/load
    /// methods rather than a blanket `Repository<Match>` impl.
    pub async fn insert_match(&self, m: &Match) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO matches (match_id, round_id, odds_ratio) VALUES ($1, $2, $3)
             ON CONFLICT (match_id) DO NOTHING",
        )
        .bind(m.match_id)
        .bind(m.round)
        .bind(m.odds_ratio)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        for side in [&m.team_one, &m.team_two] {
            sqlx::query(
                "INSERT INTO results (result_id, match_id, team_id, points, delta)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (result_id) DO UPDATE SET points = EXCLUDED.points, delta = EXCLUDED.delta",
            )
            .bind(side.result_id)
            .bind(m.match_id)
            .bind(side.team)
            .bind(side.points)
            .bind(side.delta)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Updates a team's `elo` column directly; absorbing a result's delta
    /// (spec.md §3) is the only mutation a team ever undergoes after
    /// creation, so this sits next to `insert_match`/`load_match` rather
    /// than growing the generic `Repository<Team>` contract.
    pub async fn update_team_elo(&self, team_id: crate::domain::TeamId, elo: f64) -> Result<()> {
        sqlx::query("UPDATE teams SET elo = $1 WHERE team_id = $2")
            .bind(elo)
            .bind(team_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn load_match(&self, match_id: crate::domain::MatchId) -> Result<Option<Match>> {
        let row: Option<(i64, i64, f64)> =
            sqlx::query_as("SELECT match_id, round_id, odds_ratio FROM matches WHERE match_id = $1")
                .bind(match_id)
                .fetch_optional(&self.pool)
                .await?;
        let Some((match_id, round_id, odds_ratio)) = row else { return Ok(None) };

        let results: Vec<MatchResult> = sqlx::query_as(
            "SELECT result_id, team_id AS team, points, delta FROM results
             WHERE match_id = $1 ORDER BY result_id ASC",
        )
        .bind(match_id)
        .fetch_all(&self.pool)
        .await?;

        let [team_one, team_two]: [MatchResult; 2] = results
            .try_into()
            .map_err(|_| crate::error::MatchmakerError::MatchNotFound)?;

        Ok(Some(Match { match_id, round: round_id, team_one, team_two, odds_ratio }))
    }
}
