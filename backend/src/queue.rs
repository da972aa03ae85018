use std::collections::{HashSet, VecDeque};

use crate::domain::{LookupKey, Match, MatchId, Player, PlayerId, Team, TeamId};
use crate::error::{MatchmakerError, Result};

/// Wait queue + duplicate-player guard + bounded history ring (spec.md
/// §4.1).
///
/// Invariants upheld by every mutator: every player in `players` belongs to
/// exactly one queued team, and `players.len() == 2 * queue.len()`.
#[derive(Debug, Clone)]
pub struct QueueContext {
    players: HashSet<PlayerId>,
    queue: Vec<Team>,
    history: VecDeque<Match>,
    max_history: usize,
    /// The round id the next formed round will take (spec.md §4.1: "the
    /// next round descriptor"). Advanced by `MatchTriggerHandler`.
    round_id: i64,
}

impl QueueContext {
    pub fn new(max_history: usize) -> Self {
        Self {
            players: HashSet::new(),
            queue: Vec::new(),
            history: VecDeque::with_capacity(max_history),
            max_history,
            round_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.queue.is_empty()
    }

    pub fn round_id(&self) -> i64 {
        self.round_id
    }

    pub fn advance_round(&mut self) {
        self.round_id += 1;
    }

    pub fn teams(&self) -> &[Team] {
        &self.queue
    }

    pub fn history(&self) -> &VecDeque<Match> {
        &self.history
    }

    pub fn has_player(&self, player: PlayerId) -> bool {
        self.players.contains(&player)
    }

    pub fn has_team(&self, team_id: TeamId) -> bool {
        self.queue.iter().any(|t| t.team_id == team_id)
    }

    /// Returns the queued team containing `player`, `team_id`, if any.
    /// `Match` keys never match (the queue holds teams, not matches).
    pub fn lookup(&self, key: LookupKey) -> Option<&Team> {
        match key {
            LookupKey::Player(player) => self.queue.iter().find(|t| t.has_player(player)),
            LookupKey::Team(team_id) => self.queue.iter().find(|t| t.team_id == team_id),
            LookupKey::Match(_) | LookupKey::Id(_) => None,
        }
    }

    pub fn get_team_of_player(&self, player: PlayerId) -> Option<&Team> {
        self.lookup(LookupKey::Player(player))
    }

    /// Queues `team`. Fails with `MissingFields` if the team isn't fully
    /// populated, or `AlreadyQueued` if either player is already present.
    pub fn queue(&mut self, team: Team) -> Result<()> {
        if !team.is_valid() {
            return Err(MatchmakerError::MissingFields(
                "team must have two distinct players to queue".to_string(),
            ));
        }
        if let Some(existing) = self.get_team_of_player(team.player_one) {
            return Err(MatchmakerError::AlreadyQueued {
                player: team.player_one,
                team: Box::new(existing.clone()),
            });
        }
        if let Some(existing) = self.get_team_of_player(team.player_two) {
            return Err(MatchmakerError::AlreadyQueued {
                player: team.player_two,
                team: Box::new(existing.clone()),
            });
        }

        self.players.insert(team.player_one);
        self.players.insert(team.player_two);
        self.queue.push(team);
        Ok(())
    }

    /// Dequeues `team`. Fails with `MissingFields` or `NotQueued`.
    pub fn dequeue(&mut self, team: &Team) -> Result<()> {
        if !team.is_valid() {
            return Err(MatchmakerError::MissingFields(
                "team must have two distinct players to dequeue".to_string(),
            ));
        }
        if !self.has_team(team.team_id) {
            return Err(MatchmakerError::NotQueued);
        }

        self.players.remove(&team.player_one);
        self.players.remove(&team.player_two);
        self.queue.retain(|t| t.team_id != team.team_id);
        Ok(())
    }

    /// Appends to history; drops the oldest entry once length exceeds
    /// `max_history`. No-op when `max_history == 0`.
    pub fn push_history(&mut self, m: Match) {
        if self.max_history == 0 {
            return;
        }
        self.history.push_back(m);
        while self.history.len() > self.max_history {
            self.history.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.players.clear();
        self.queue.clear();
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn contains_match_in_history(&self, a: TeamId, b: TeamId) -> bool {
        self.history.iter().any(|m| {
            let (t1, t2) = m.teams();
            (t1 == a && t2 == b) || (t1 == b && t2 == a)
        })
    }

    pub fn find_history_match(&self, id: MatchId) -> Option<&Match> {
        self.history.iter().find(|m| m.match_id == id)
    }
}

/// Helper only used by tests/CLI to build a `Player`-backed team cheaply.
pub fn valid_team(team_id: TeamId, name: &str, p1: PlayerId, p2: PlayerId, elo: f64) -> Team {
    Team { team_id, name: name.to_string(), player_one: p1, player_two: p2, elo }
}

#[allow(unused)]
fn _assert_player_is_hashable(_: &Player) {}
