use chrono::Utc;

use crate::domain::RoundId;
use crate::error::{MatchmakerError, Result};
use crate::kernel::{Event, EventContext, EventHandler, EventKind, HandlerTag, OriginatingContext};
use crate::matchmaker::Matchmaker;

/// Closes out a round once every one of its matches has reported (spec.md
/// §4.5). Single-shot: never requeued, one instance per round, `tag =
/// round_id`.
#[derive(Debug)]
pub struct GameEndHandler {
    round_id: RoundId,
    key: u64,
}

impl GameEndHandler {
    pub fn new(round_id: RoundId, key: u64) -> Self {
        Self { round_id, key }
    }
}

impl EventHandler for GameEndHandler {
    fn kind(&self) -> EventKind {
        EventKind::Result
    }

    fn tag(&self) -> HandlerTag {
        HandlerTag::GameEnd(self.round_id)
    }

    fn is_ready(&self, engine: &Matchmaker, ctx: &EventContext) -> bool {
        matches!(ctx.origin, OriginatingContext::InGame(key) if key == self.key)
            && engine.get_games().get(self.key).is_some_and(|g| g.is_complete())
    }

    fn handle(&self, engine: &mut Matchmaker, _ctx: &EventContext) -> Result<()> {
        let mut ctx = engine.games_mut().remove(self.key).ok_or(MatchmakerError::MissingContext)?;
        ctx.round.end(Utc::now());

        let event = Event::new(
            EventKind::RoundEnd,
            EventContext::new(OriginatingContext::InGame(self.key))
                .with_round(self.round_id)
                .with_closed_round(ctx.round.clone(), ctx.matches().to_vec()),
        );
        if let Some(e) = engine.dispatch(event) {
            return Err(e);
        }
        Ok(())
    }

    fn requeue(&self) -> bool {
        false
    }
}
