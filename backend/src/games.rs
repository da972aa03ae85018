use std::collections::HashMap;

use crate::domain::{LookupKey, Match};
use crate::error::{MatchmakerError, Result};
use crate::ingame::InGameContext;

/// Mapping from round-key to in-game context; routes results (spec.md
/// §4.3). Removal happens only at round completion.
#[derive(Debug, Clone, Default)]
pub struct GamesRegistry {
    games: HashMap<u64, InGameContext>,
}

impl GamesRegistry {
    pub fn new() -> Self {
        Self { games: HashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn contains_key(&self, key: u64) -> bool {
        self.games.contains_key(&key)
    }

    pub fn get(&self, key: u64) -> Option<&InGameContext> {
        self.games.get(&key)
    }

    pub fn get_mut(&mut self, key: u64) -> Option<&mut InGameContext> {
        self.games.get_mut(&key)
    }

    /// Iterates the ongoing contexts; used by the CLI to persist the round
    /// a `Queue` dispatch just formed.
    pub fn iter(&self) -> impl Iterator<Item = &InGameContext> {
        self.games.values()
    }

    pub fn push_game(&mut self, ctx: InGameContext) -> Result<()> {
        if self.games.contains_key(&ctx.key()) {
            return Err(MatchmakerError::GameAlreadyExist(ctx.key()));
        }
        self.games.insert(ctx.key(), ctx);
        Ok(())
    }

    pub fn remove(&mut self, key: u64) -> Option<InGameContext> {
        self.games.remove(&key)
    }

    pub fn clear(&mut self) {
        self.games.clear();
    }

    /// Polymorphic lookup (spec.md §4.3): by raw key, or by delegating a
    /// player/team/match key to each context's own `lookup`.
    pub fn lookup(&self, key: LookupKey) -> Option<&InGameContext> {
        match key {
            LookupKey::Id(id) => self.games.get(&id),
            _ => self.games.values().find(|ctx| ctx.lookup(key).is_some()),
        }
    }

    pub fn lookup_key(&self, key: LookupKey) -> Option<u64> {
        self.lookup(key).map(|ctx| ctx.key())
    }

    /// Routes a reported `Match` to the context that owns it, returning
    /// that context's key and the finalized match on success. Fails with
    /// `MissingContext` if no ongoing context accepted it.
    pub fn add_result(&mut self, reported: &Match, k_factor: f64) -> Result<(u64, Match)> {
        let key = self
            .lookup_key(LookupKey::Match(reported.match_id))
            .ok_or(MatchmakerError::MissingContext)?;

        let ctx = self.games.get_mut(&key).ok_or(MatchmakerError::MissingContext)?;
        let finalized = ctx.add_result(reported, k_factor)?;
        Ok((key, finalized))
    }
}
