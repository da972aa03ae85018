//! Domain model: Player, Team, Round, Result, Match.
//!
//! Entities, validation, and equality/hashing by primary key (spec.md §3).
//! Kept free of any repository or event-kernel dependency so the engine
//! modules that sit on top of it (`queue`, `ingame`, `games`, `principal`)
//! stay testable without a database.

pub mod lookup;
pub mod player;
#[path = "match_.rs"]
pub mod r#match;
pub mod result;
pub mod round;
pub mod team;

pub use lookup::LookupKey;
pub use player::{Player, PlayerId};
pub use r#match::{Match, MatchId};
pub use result::{MatchResult, ResultId};
pub use round::{Round, RoundId};
pub use team::{Team, TeamId};
