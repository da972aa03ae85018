use crate::domain::{Match, MatchId, PlayerId, Round, RoundId, TeamId};

/// Event kinds dispatched by the kernel (spec.md §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Queue,
    Dequeue,
    Result,
    RoundStart,
    RoundEnd,
}

/// The context an event originated from: the queue, or a specific in-game
/// context identified by its stable key (`hash(round_id)`, spec.md §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginatingContext {
    Queue,
    InGame(u64),
}

/// The finalized state of a round that just ended: its stamped `Round`
/// (with `end_time` set) and every `Match` it formed, each carrying its
/// final reported points and delta.
///
/// Carried on `ROUND_END`'s `EventContext` so an external handler
/// registered via `Matchmaker::register_handler` (spec.md §4.7) — a
/// persistence layer, a chat-platform notifier — can read back what the
/// round actually produced without re-querying the games registry, which
/// has already removed the context by the time the event fires.
#[derive(Debug, Clone)]
pub struct ClosedRound {
    pub round: Round,
    pub matches: Vec<Match>,
}

/// Bundles the originating context plus whatever optional identifiers the
/// triggering operation knows about (spec.md §4.4).
#[derive(Debug, Clone)]
pub struct EventContext {
    pub origin: OriginatingContext,
    pub player: Option<PlayerId>,
    pub team: Option<TeamId>,
    pub match_id: Option<MatchId>,
    pub round_id: Option<RoundId>,
    pub closed_round: Option<ClosedRound>,
}

impl EventContext {
    pub fn new(origin: OriginatingContext) -> Self {
        Self { origin, player: None, team: None, match_id: None, round_id: None, closed_round: None }
    }

    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    pub fn with_team(mut self, team: TeamId) -> Self {
        self.team = Some(team);
        self
    }

    pub fn with_match(mut self, match_id: MatchId) -> Self {
        self.match_id = Some(match_id);
        self
    }

    pub fn with_round(mut self, round_id: RoundId) -> Self {
        self.round_id = Some(round_id);
        self
    }

    pub fn with_closed_round(mut self, round: Round, matches: Vec<Match>) -> Self {
        self.closed_round = Some(ClosedRound { round, matches });
        self
    }
}

/// One dispatchable occurrence: a kind plus its context.
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    pub context: EventContext,
}

impl Event {
    pub fn new(kind: EventKind, context: EventContext) -> Self {
        Self { kind, context }
    }
}

/// Identity used for handler (de)registration (spec.md §4.4's `tag`).
///
/// Built-in handlers use the fixed variants; external handlers (chat,
/// persistence) register under `Named`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HandlerTag {
    MatchTrigger,
    GameEnd(RoundId),
    Named(String),
}

impl std::fmt::Display for HandlerTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerTag::MatchTrigger => write!(f, "match_trigger"),
            HandlerTag::GameEnd(round_id) => write!(f, "game_end[{round_id}]"),
            HandlerTag::Named(name) => write!(f, "{name}"),
        }
    }
}
