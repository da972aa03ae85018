//! Administrative command-line entry point, modeled on the teacher's
//! `bin/migrate.rs` (clap `Parser`/`Subcommand`, `dotenv` then
//! `Config::from_env`, one `#[tokio::main]`).
//!
//! This binary is deliberately thin: the core (`Matchmaker`) is an
//! in-memory, single-process engine with no cross-restart recovery
//! (spec.md §1 Non-goals), so each invocation below spins up a fresh
//! engine, drives it through whatever the subcommand asks for, and
//! persists the result through the repository port. A long-running
//! chat-platform front-end would instead hold one `Matchmaker` alive for
//! the process lifetime and call the same façade methods per command —
//! that front-end is out of scope (spec.md §1).

use std::collections::HashMap;

use clap::{Parser, Subcommand};
use duo_matchmaker_backend::config::Config;
use duo_matchmaker_backend::domain::{Match, MatchResult, Round, Team};
use duo_matchmaker_backend::error::{MatchmakerError, Result};
use duo_matchmaker_backend::ingame::InGameContext;
use duo_matchmaker_backend::repository::{create_pool, PgRepository, Repository};
use duo_matchmaker_backend::telemetry::init_telemetry;
use duo_matchmaker_backend::Matchmaker;

#[derive(Parser)]
#[command(name = "duo-matchmaker")]
#[command(about = "Administrative CLI for the duo matchmaker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run pending database migrations.
    MigrateUp,
    /// Show the effective configuration.
    Status,
    /// Load teams by id and queue them against a fresh engine, forming and
    /// persisting a round if the threshold is reached.
    Queue {
        /// Team ids to load from the repository and queue, in order.
        #[arg(required = true)]
        team_ids: Vec<i64>,
    },
    /// Report a result for `match_id` (reported points for each side),
    /// absorb the computed delta into both teams' Elo, and persist both.
    Result { match_id: i64, points_one: f64, points_two: f64 },
    /// Print a reminder that the core holds no state across restarts.
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_telemetry();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::MigrateUp => {
            let pool = create_pool(&config.database_url, config.database_max_connections).await?;
            tracing::info!("running migrations");
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("migrations complete");
        }
        Commands::Status => {
            tracing::info!(
                principal = %config.principal,
                trigger_threshold = config.trigger_threshold,
                max_history = config.max_history,
                k_factor = config.k_factor,
                points_per_match = config.points_per_match,
                "effective configuration"
            );
        }
        Commands::Queue { team_ids } => queue_teams(&config, team_ids).await?,
        Commands::Result { match_id, points_one, points_two } => {
            report_result(&config, match_id, points_one, points_two).await?
        }
        Commands::Reset => {
            tracing::info!(
                "the core holds no state across process restarts (spec.md §1 Non-goals); nothing to reset"
            );
        }
    }

    Ok(())
}

async fn queue_teams(config: &Config, team_ids: Vec<i64>) -> Result<()> {
    let pool = create_pool(&config.database_url, config.database_max_connections).await?;
    let repo = PgRepository::new(pool);
    let mut mm = Matchmaker::new(config.clone());

    for team_id in team_ids {
        let probe = Team { team_id, name: String::new(), player_one: 0, player_two: 0, elo: 0.0 };
        let team = repo.load(&probe).await?.ok_or(MatchmakerError::NotQueued)?;
        tracing::info!(team_id, name = %team.name, "queueing team");
        mm.queue_team(team)?;
    }

    for game in mm.get_games().iter() {
        for m in game.matches() {
            repo.insert_match(m).await?;
        }
        tracing::info!(round_id = game.round_id(), matches = game.matches().len(), "round persisted");
    }

    Ok(())
}

/// Rebuilds a single-match `InGameContext` around the persisted match so
/// the delta is computed by the same `add_result` the live engine uses,
/// rather than re-deriving the Elo formula here.
async fn report_result(config: &Config, match_id: i64, points_one: f64, points_two: f64) -> Result<()> {
    let pool = create_pool(&config.database_url, config.database_max_connections).await?;
    let repo = PgRepository::new(pool);

    let stored = repo.load_match(match_id).await?.ok_or(MatchmakerError::MatchNotFound)?;
    let mut team_one = repo
        .load(&Team { team_id: stored.team_one.team, ..empty_team() })
        .await?
        .ok_or(MatchmakerError::MatchNotFound)?;
    let mut team_two = repo
        .load(&Team { team_id: stored.team_two.team, ..empty_team() })
        .await?
        .ok_or(MatchmakerError::MatchNotFound)?;

    let mut rosters = HashMap::new();
    rosters.insert(team_one.team_id, (team_one.player_one, team_one.player_two));
    rosters.insert(team_two.team_id, (team_two.player_one, team_two.player_two));

    let round = Round::new(stored.round, 2, chrono::Utc::now());
    let mut ctx = InGameContext::new(round, config.principal, vec![stored.clone()], rosters);

    let reported = Match {
        match_id: stored.match_id,
        round: stored.round,
        team_one: MatchResult { result_id: stored.team_one.result_id, team: stored.team_one.team, points: points_one, delta: 0.0 },
        team_two: MatchResult { result_id: stored.team_two.result_id, team: stored.team_two.team, points: points_two, delta: 0.0 },
        odds_ratio: stored.odds_ratio,
    };

    let finalized = ctx.add_result(&reported, config.k_factor)?;
    repo.insert_match(&finalized).await?;

    team_one.absorb_delta(finalized.team_one.delta);
    team_two.absorb_delta(finalized.team_two.delta);
    repo.update_team_elo(team_one.team_id, team_one.elo).await?;
    repo.update_team_elo(team_two.team_id, team_two.elo).await?;

    tracing::info!(
        match_id,
        delta_one = finalized.team_one.delta,
        delta_two = finalized.team_two.delta,
        "result absorbed"
    );
    Ok(())
}

fn empty_team() -> Team {
    Team { team_id: 0, name: String::new(), player_one: 0, player_two: 0, elo: 0.0 }
}
