use super::result::MatchResult;
use super::round::RoundId;
use super::team::TeamId;

pub type MatchId = i64;

/// A single pairing within a round. Belongs to exactly one round; its two
/// results reference distinct teams (spec.md §3 invariant).
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub match_id: MatchId,
    pub round: RoundId,
    pub team_one: MatchResult,
    pub team_two: MatchResult,
    /// Ratio of the two sides' expected scores at formation time, derived
    /// from the same Elo formula the principal uses for `match_utility`
    /// (spec.md §4.6 does not name an explicit formula for this field; we
    /// adopt `expected(team_one) / expected(team_two)` as the natural
    /// reading — see DESIGN.md).
    pub odds_ratio: f64,
}

impl Match {
    pub fn teams(&self) -> (TeamId, TeamId) {
        (self.team_one.team, self.team_two.team)
    }

    pub fn contains_team(&self, team: TeamId) -> bool {
        self.team_one.team == team || self.team_two.team == team
    }

    pub fn result_for(&self, team: TeamId) -> Option<MatchResult> {
        if self.team_one.team == team {
            Some(self.team_one)
        } else if self.team_two.team == team {
            Some(self.team_two)
        } else {
            None
        }
    }
}

impl std::hash::Hash for Match {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.match_id.hash(state);
    }
}
impl Eq for Match {}
