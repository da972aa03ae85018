use chrono::Utc;

use crate::domain::Round;
use crate::error::{MatchmakerError, Result};
use crate::handlers::GameEndHandler;
use crate::ingame::InGameContext;
use crate::kernel::{Event, EventContext, EventHandler, EventKind, HandlerTag, OriginatingContext};
use crate::matchmaker::Matchmaker;
use crate::principal::{self, PolicyParams};

/// Forms a round once the queue reaches `trigger_threshold` (spec.md §4.5).
///
/// Requeueable: stays registered after firing, since the queue will refill
/// and trigger again.
#[derive(Debug, Default)]
pub struct MatchTriggerHandler;

impl MatchTriggerHandler {
    pub fn new() -> Self {
        Self
    }
}

impl EventHandler for MatchTriggerHandler {
    fn kind(&self) -> EventKind {
        EventKind::Queue
    }

    fn tag(&self) -> HandlerTag {
        HandlerTag::MatchTrigger
    }

    fn is_ready(&self, engine: &Matchmaker, ctx: &EventContext) -> bool {
        matches!(ctx.origin, OriginatingContext::Queue) && engine.get_queue().len() == engine.config().trigger_threshold
    }

    fn handle(&self, engine: &mut Matchmaker, _ctx: &EventContext) -> Result<()> {
        let teams = engine.get_queue().teams().to_vec();
        let round_id = engine.get_queue().round_id();

        let params = PolicyParams {
            points_per_match: engine.config().points_per_match,
            period_active: engine.config().period_active,
            period_duty_cycle: engine.config().period_duty_cycle,
            round_id,
        };

        let matches = principal::form_matches(engine.config().principal, &teams, engine.get_queue(), params)
            .ok_or_else(|| MatchmakerError::MissingFields("not enough queued teams to form a round".to_string()))?;

        let rosters = teams.iter().map(|t| (t.team_id, (t.player_one, t.player_two))).collect();
        let round = Round::new(round_id, teams.len(), Utc::now());
        let ctx_game = InGameContext::new(round, engine.config().principal, matches, rosters);
        let key = ctx_game.key();

        engine.queue_mut().clear();
        engine.games_mut().push_game(ctx_game)?;
        engine.queue_mut().advance_round();
        engine.register_handler(Box::new(GameEndHandler::new(round_id, key)));

        let event = Event::new(
            EventKind::RoundStart,
            EventContext::new(OriginatingContext::InGame(key)).with_round(round_id),
        );
        if let Some(e) = engine.dispatch(event) {
            return Err(e);
        }
        Ok(())
    }

    fn requeue(&self) -> bool {
        true
    }
}
