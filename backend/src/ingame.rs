use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use crate::domain::{LookupKey, Match, MatchId, MatchResult, PlayerId, Round, RoundId, TeamId};
use crate::error::{MatchmakerError, Result};
use crate::principal::PrincipalKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InGameState {
    InGame,
    Ended,
}

/// An ongoing round: its matches, which players have reported, and whether
/// it has finished (spec.md §4.2).
#[derive(Debug, Clone)]
pub struct InGameContext {
    pub round: Round,
    pub principal: PrincipalKind,
    matches: Vec<Match>,
    /// Team rosters captured at formation time, so `add_result` can tell
    /// which four players a match concerns without the `Match`/`MatchResult`
    /// pair carrying a full `Team` back-reference (spec.md §9's
    /// id-plus-lookup redesign note).
    rosters: HashMap<TeamId, (PlayerId, PlayerId)>,
    reported: HashSet<PlayerId>,
    state: InGameState,
    key: u64,
}

impl InGameContext {
    pub fn new(
        round: Round,
        principal: PrincipalKind,
        matches: Vec<Match>,
        rosters: HashMap<TeamId, (PlayerId, PlayerId)>,
    ) -> Self {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        round.round_id.hash(&mut hasher);
        let key = hasher.finish();

        Self { round, principal, matches, rosters, reported: HashSet::new(), state: InGameState::InGame, key }
    }

    /// Stable for the lifetime of the context (spec.md §4.2): `hash(round_id)`.
    pub fn key(&self) -> u64 {
        self.key
    }

    pub fn round_id(&self) -> RoundId {
        self.round.round_id
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn is_complete(&self) -> bool {
        self.state == InGameState::Ended
    }

    fn players_of(&self, team: TeamId) -> Option<(PlayerId, PlayerId)> {
        self.rosters.get(&team).copied()
    }

    fn find_match_mut(&mut self, match_id: MatchId) -> Option<&mut Match> {
        self.matches.iter_mut().find(|m| m.match_id == match_id)
    }

    /// Polymorphic lookup analogous to `QueueContext::lookup` (spec.md
    /// §4.2): by player (membership), by team (`team_id` equality via
    /// either side), or by match (`match_id` equality).
    pub fn lookup(&self, key: LookupKey) -> Option<&Match> {
        match key {
            LookupKey::Player(player) => self.matches.iter().find(|m| {
                self.players_of(m.team_one.team).is_some_and(|(a, b)| a == player || b == player)
                    || self.players_of(m.team_two.team).is_some_and(|(a, b)| a == player || b == player)
            }),
            LookupKey::Team(team) => self.matches.iter().find(|m| m.contains_team(team)),
            LookupKey::Match(match_id) => self.matches.iter().find(|m| m.match_id == match_id),
            LookupKey::Id(_) => None,
        }
    }

    /// Absorbs a reported `Match`, computing each side's Elo delta from the
    /// expected score the principal stashed in the formed match at formation
    /// time (spec.md §4.2, §4.6).
    ///
    /// Rejects with `GameEnded` if the round has already finished,
    /// `MatchNotFound` if no stored match shares `match_id`, and
    /// `DuplicateResult` if any of the four players already reported.
    pub fn add_result(&mut self, reported: &Match, k_factor: f64) -> Result<Match> {
        if self.is_complete() {
            return Err(MatchmakerError::GameEnded);
        }

        let stored = match self.find_match_mut(reported.match_id) {
            Some(m) => m.clone(),
            None => return Err(MatchmakerError::MatchNotFound),
        };

        let (p1a, p1b) = self
            .players_of(stored.team_one.team)
            .ok_or(MatchmakerError::MatchNotFound)?;
        let (p2a, p2b) = self
            .players_of(stored.team_two.team)
            .ok_or(MatchmakerError::MatchNotFound)?;

        if [p1a, p1b, p2a, p2b].iter().any(|p| self.reported.contains(p)) {
            return Err(MatchmakerError::DuplicateResult);
        }

        let reported_one = reported
            .result_for(stored.team_one.team)
            .ok_or(MatchmakerError::MatchNotFound)?;
        let reported_two = reported
            .result_for(stored.team_two.team)
            .ok_or(MatchmakerError::MatchNotFound)?;

        let final_one = MatchResult {
            result_id: stored.team_one.result_id,
            team: stored.team_one.team,
            points: reported_one.points,
            delta: k_factor * (reported_one.points - stored.team_one.points),
        };
        let final_two = MatchResult {
            result_id: stored.team_two.result_id,
            team: stored.team_two.team,
            points: reported_two.points,
            delta: k_factor * (reported_two.points - stored.team_two.points),
        };

        self.reported.insert(p1a);
        self.reported.insert(p1b);
        self.reported.insert(p2a);
        self.reported.insert(p2b);

        let slot = self.find_match_mut(reported.match_id).expect("checked above");
        slot.team_one = final_one;
        slot.team_two = final_two;
        let finalized = slot.clone();

        if self.reported.len() == 4 * self.matches.len() {
            self.state = InGameState::Ended;
        }

        Ok(finalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn setup() -> (InGameContext, Match) {
        let round = Round::new(1, 4, Utc::now());
        let m = Match {
            match_id: 1,
            round: 1,
            team_one: MatchResult::expected(1, 1, 0.5),
            team_two: MatchResult::expected(2, 2, 0.5),
            odds_ratio: 1.0,
        };
        let mut rosters = HashMap::new();
        rosters.insert(1, (10, 20));
        rosters.insert(2, (30, 40));
        (InGameContext::new(round, PrincipalKind::MaxSum, vec![m.clone()], rosters), m)
    }

    #[test]
    fn scenario_c_result_delta() {
        let (mut ctx, m) = setup();
        let reported = Match {
            match_id: m.match_id,
            round: 1,
            team_one: MatchResult { result_id: 1, team: 1, points: 7.0, delta: 0.0 },
            team_two: MatchResult { result_id: 2, team: 2, points: 3.0, delta: 0.0 },
            odds_ratio: 1.0,
        };
        ctx.add_result(&reported, 32.0).unwrap();
        assert!(ctx.is_complete());

        let stored = ctx.lookup(LookupKey::Match(1)).unwrap();
        assert!((stored.team_one.delta - 208.0).abs() < 1e-9);
        assert!((stored.team_two.delta - 80.0).abs() < 1e-9);
    }

    #[test]
    fn scenario_d_duplicate_result_rejected() {
        let (mut ctx, m) = setup();
        let reported = Match {
            match_id: m.match_id,
            round: 1,
            team_one: MatchResult { result_id: 1, team: 1, points: 7.0, delta: 0.0 },
            team_two: MatchResult { result_id: 2, team: 2, points: 3.0, delta: 0.0 },
            odds_ratio: 1.0,
        };
        ctx.add_result(&reported, 32.0).unwrap();
        let before = ctx.lookup(LookupKey::Match(1)).unwrap().clone();

        let err = ctx.add_result(&reported, 32.0).unwrap_err();
        assert!(matches!(err, MatchmakerError::DuplicateResult));
        assert_eq!(ctx.lookup(LookupKey::Match(1)).unwrap(), &before);
    }

    #[test]
    fn completion_is_monotonic() {
        let (mut ctx, m) = setup();
        let reported = Match {
            match_id: m.match_id,
            round: 1,
            team_one: MatchResult { result_id: 1, team: 1, points: 7.0, delta: 0.0 },
            team_two: MatchResult { result_id: 2, team: 2, points: 3.0, delta: 0.0 },
            odds_ratio: 1.0,
        };
        ctx.add_result(&reported, 32.0).unwrap();
        assert!(ctx.is_complete());
        assert!(matches!(ctx.add_result(&reported, 32.0), Err(MatchmakerError::GameEnded)));
        assert!(ctx.is_complete());
    }
}
