use super::team::TeamId;

pub type ResultId = i64;

/// One team's half of a `Match`: the points it earned and the Elo delta
/// that follows from them.
///
/// Before a match has been reported, `points` holds the *expected* score
/// the principal computed at formation time (spec.md §4.6) and `delta` is
/// `0.0`. Once a result is submitted, both fields are overwritten with the
/// reported values (spec.md §4.2).
///
/// `team` is stored as an id rather than an owned `Team` (spec.md §9's
/// "cyclic references... resolve by storing IDs plus a lookup" note) —
/// the owning `Match`/`InGameContext` never needs to dereference it, only
/// compare it for identity and look it up through the repository port
/// when the caller needs the full entity.
#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct MatchResult {
    pub result_id: ResultId,
    pub team: TeamId,
    pub points: f64,
    pub delta: f64,
}

impl MatchResult {
    pub fn expected(result_id: ResultId, team: TeamId, expected_points: f64) -> Self {
        Self { result_id, team, points: expected_points, delta: 0.0 }
    }

    /// Combines two results for the *same* team by summing points and
    /// deltas (spec.md §3: `result + result` for the same team).
    pub fn combine(self, other: Self) -> Self {
        assert_eq!(self.team, other.team, "combine requires matching team");
        Self {
            result_id: self.result_id,
            team: self.team,
            points: self.points + other.points,
            delta: self.delta + other.delta,
        }
    }
}
