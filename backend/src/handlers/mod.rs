//! Built-in handlers driving queue → round → end transitions (spec.md §4.5).

pub mod game_end;
pub mod match_trigger;

pub use game_end::GameEndHandler;
pub use match_trigger::MatchTriggerHandler;
