use super::match_::MatchId;
use super::player::PlayerId;
use super::team::TeamId;

/// A polymorphic key accepted by `QueueContext`, `InGameContext`, and
/// `GamesRegistry` lookups (spec.md §3: "both Queue and In-Game contexts,
/// and the Games registry, accept a polymorphic lookup key
/// `{Player | Team | Match | integer}`").
///
/// Modeled as a tagged enum rather than dynamic type tests, per spec.md
/// §9's re-architecture note: each container dispatches on the variant
/// with one small match arm instead of reaching for `dyn Any`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKey {
    Player(PlayerId),
    Team(TeamId),
    Match(MatchId),
    /// A raw integer key, e.g. a `GamesRegistry` round key.
    Id(u64),
}

impl LookupKey {
    pub fn player(id: PlayerId) -> Self {
        LookupKey::Player(id)
    }

    pub fn team(id: TeamId) -> Self {
        LookupKey::Team(id)
    }

    pub fn match_(id: MatchId) -> Self {
        LookupKey::Match(id)
    }
}
