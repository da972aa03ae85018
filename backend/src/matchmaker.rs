use crate::config::Config;
use crate::domain::{LookupKey, Match, MatchId, Player, PlayerId, Team, TeamId};
use crate::error::Result;
use crate::games::GamesRegistry;
use crate::handlers::MatchTriggerHandler;
use crate::kernel::{Event, EventContext, EventHandler, EventKind, EventMap, HandlerTag, OriginatingContext};
use crate::principal::PrincipalKind;
use crate::queue::QueueContext;

/// The public API wiring queue, games registry, and event kernel together
/// (spec.md §4.7).
///
/// `dispatch` is the one place this type needs an unusual trick: the event
/// map lives in `self.event_map`, but handling an event needs `&mut
/// Matchmaker` passed to each handler (so e.g. `MatchTriggerHandler` can
/// register a `GameEndHandler` and dispatch `ROUND_START` from inside its
/// own `handle`). You cannot borrow `self.event_map` mutably for iteration
/// *and* pass `&mut self` into the same call. The fix: `mem::take` the
/// whole map out of `self` before dispatching (leaving a fresh empty map
/// in its place), let the handlers mutate `self` — including registering
/// into that now-live placeholder map and recursing into `dispatch` for
/// nested events — and merge the placeholder's contents back into the
/// taken-out map before putting it back. `EventMap::merge_from` does that
/// merge; see its doc comment for the ordering guarantee.
pub struct Matchmaker {
    config: Config,
    queue: QueueContext,
    games: GamesRegistry,
    event_map: EventMap,
}

impl Matchmaker {
    pub fn new(config: Config) -> Self {
        let mut event_map = EventMap::new();
        event_map.register(Box::new(MatchTriggerHandler::new()));

        Self { queue: QueueContext::new(config.max_history), config, games: GamesRegistry::new(), event_map }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_threshold(&mut self, n: usize) {
        self.config.trigger_threshold = n;
    }

    /// Sets the principal by name; an unrecognized name warns and falls
    /// back to `max_sum` (spec.md §6, Scenario F).
    pub fn set_principal(&mut self, name: &str) {
        match name.parse::<PrincipalKind>() {
            Ok(kind) => self.config.principal = kind,
            Err(()) => {
                tracing::warn!(value = %name, "unrecognized principal, falling back to max_sum");
                self.config.principal = PrincipalKind::MaxSum;
            }
        }
    }

    pub fn get_queue(&self) -> &QueueContext {
        &self.queue
    }

    pub fn get_games(&self) -> &GamesRegistry {
        &self.games
    }

    pub(crate) fn queue_mut(&mut self) -> &mut QueueContext {
        &mut self.queue
    }

    pub(crate) fn games_mut(&mut self) -> &mut GamesRegistry {
        &mut self.games
    }

    pub fn has_queued_player(&self, player: PlayerId) -> bool {
        self.queue.has_player(player)
    }

    pub fn has_queued_team(&self, team_id: TeamId) -> bool {
        self.queue.has_team(team_id)
    }

    pub fn is_player_available(&self, player: PlayerId) -> bool {
        !self.has_queued_player(player) && self.get_match_of_player(player).is_none()
    }

    pub fn is_team_available(&self, team_id: TeamId) -> bool {
        !self.has_queued_team(team_id) && self.games.lookup(LookupKey::Team(team_id)).is_none()
    }

    pub fn get_team_of_player(&self, player: PlayerId) -> Option<&Team> {
        self.queue.get_team_of_player(player)
    }

    pub fn get_match_of_player(&self, player: PlayerId) -> Option<&Match> {
        self.games.lookup(LookupKey::Player(player)).and_then(|ctx| ctx.lookup(LookupKey::Player(player)))
    }

    pub fn get_match_of_team(&self, team_id: TeamId) -> Option<&Match> {
        self.games.lookup(LookupKey::Team(team_id)).and_then(|ctx| ctx.lookup(LookupKey::Team(team_id)))
    }

    /// Queues `team`, then dispatches `QUEUE`. Mutation happens before
    /// dispatch, so handlers observe a consistent view (spec.md §4.7).
    pub fn queue_team(&mut self, team: Team) -> Result<()> {
        let team_id = team.team_id;
        self.queue.queue(team)?;
        let event = Event::new(EventKind::Queue, EventContext::new(OriginatingContext::Queue).with_team(team_id));
        match self.dispatch(event) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn dequeue_team(&mut self, team: &Team) -> Result<()> {
        self.queue.dequeue(team)?;
        let event = Event::new(
            EventKind::Dequeue,
            EventContext::new(OriginatingContext::Queue).with_team(team.team_id),
        );
        match self.dispatch(event) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Routes `reported` through the games registry, pushes the finalized
    /// match into queue history on success, then dispatches `RESULT`
    /// (spec.md §4.7).
    pub fn insert_result(&mut self, reported: Match) -> Result<()> {
        let (key, finalized) = self.games.add_result(&reported, self.config.k_factor)?;
        self.queue.push_history(finalized.clone());

        let event = Event::new(
            EventKind::Result,
            EventContext::new(OriginatingContext::InGame(key))
                .with_match(finalized.match_id)
                .with_round(finalized.round),
        );
        match self.dispatch(event) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Clears queue, games, and event map; re-registers the trigger
    /// handler (spec.md §4.7).
    pub fn reset(&mut self) {
        self.queue.clear();
        self.games.clear();
        self.event_map.clear();
        self.event_map.register(Box::new(MatchTriggerHandler::new()));
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    pub fn clear_history(&mut self) {
        self.queue.clear_history();
    }

    pub fn register_handler(&mut self, handler: Box<dyn EventHandler>) {
        self.event_map.register(handler);
    }

    pub fn deregister_handler(&mut self, kind: EventKind, tag: &HandlerTag) {
        self.event_map.deregister(kind, tag);
    }

    /// Dispatches `event` through the kernel. See the struct doc for why
    /// this takes the map out of `self` for the duration of the call.
    pub fn dispatch(&mut self, event: Event) -> Option<crate::error::MatchmakerError> {
        let mut event_map = std::mem::take(&mut self.event_map);
        let result = event_map.handle(event, self);
        event_map.merge_from(&mut self.event_map);
        self.event_map = event_map;
        result
    }

    #[allow(unused)]
    fn _assert_player_usable(_: &Player) {}

    #[allow(unused)]
    fn _assert_match_id_usable(_: MatchId) {}
}
