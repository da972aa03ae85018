use super::player::PlayerId;

pub type TeamId = i64;

/// A fixed two-player team. `elo = base_elo + sum of deltas of its results`
/// (spec.md §3); the repository is responsible for keeping this column in
/// sync as results are absorbed, the in-memory copy held by the queue and
/// principal only needs to be current as of the last load.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Team {
    pub team_id: TeamId,
    pub name: String,
    pub player_one: PlayerId,
    pub player_two: PlayerId,
    pub elo: f64,
}

impl PartialEq for Team {
    fn eq(&self, other: &Self) -> bool {
        self.team_id == other.team_id
    }
}
impl Eq for Team {}

impl std::hash::Hash for Team {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.team_id.hash(state);
    }
}

impl Team {
    /// Both player slots populated and distinct (spec.md §3 invariant).
    pub fn is_valid(&self) -> bool {
        self.player_one != 0 && self.player_two != 0 && self.player_one != self.player_two
    }

    pub fn has_player(&self, player: PlayerId) -> bool {
        self.player_one == player || self.player_two == player
    }

    /// Mutates `elo` by absorbing a result's delta (spec.md §3).
    pub fn absorb_delta(&mut self, delta: f64) {
        self.elo += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: TeamId, p1: PlayerId, p2: PlayerId) -> Team {
        Team { team_id: id, name: format!("team-{id}"), player_one: p1, player_two: p2, elo: 1000.0 }
    }

    #[test]
    fn rejects_duplicate_players() {
        assert!(!team(1, 5, 5).is_valid());
    }

    #[test]
    fn rejects_missing_players() {
        assert!(!team(1, 0, 5).is_valid());
        assert!(!team(1, 5, 0).is_valid());
    }

    #[test]
    fn absorb_delta_updates_elo() {
        let mut t = team(1, 1, 2);
        t.absorb_delta(-12.5);
        assert_eq!(t.elo, 987.5);
    }
}
