use thiserror::Error;

use crate::domain::{PlayerId, Team};

/// The full error taxonomy surfaced at the engine's boundary.
///
/// Domain mutations (queue, games registry, in-game context) return one of
/// the non-ambient variants directly; the repository adapter and CLI layers
/// add their own (`Database`, `Io`, `EnvVar`) by `?`-propagating through the
/// same alias.
#[derive(Error, Debug)]
pub enum MatchmakerError {
    #[error("missing fields: {0}")]
    MissingFields(String),

    #[error("player {player:?} is already queued on team {team:?}")]
    AlreadyQueued { player: PlayerId, team: Box<Team> },

    #[error("team is not queued")]
    NotQueued,

    #[error("a game already exists for round key {0}")]
    GameAlreadyExist(u64),

    #[error("the game for this round has already ended")]
    GameEnded,

    #[error("no ongoing round contains this match")]
    MatchNotFound,

    #[error("a result for this match has already been reported")]
    DuplicateResult,

    #[error("result was routed but no in-game context accepted it")]
    MissingContext,

    #[error("handler {handler} failed: {message}")]
    HandlingError { handler: String, message: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, MatchmakerError>;
