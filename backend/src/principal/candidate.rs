use itertools::Itertools;

use crate::domain::{Match, MatchResult, RoundId, Team, TeamId};
use crate::queue::QueueContext;

/// A not-yet-realized pairing between two queued teams, carrying the
/// elo snapshot needed for `match_utility` (spec.md §4.6, step 1).
///
/// Carries no id of its own: a candidate only becomes a `Match` (with a
/// globally unique id) once `realize_matches` commits it as part of the
/// round's chosen feasible set.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub team_one: Team,
    pub team_two: Team,
}

/// Upper bound on matches formed in a single round, used to carve out a
/// disjoint id range per round (`round_id * MAX_MATCHES_PER_ROUND + i`) so
/// two rounds open at once — the queue can refill and retrigger before an
/// earlier round's `GameEndHandler` has closed it out — never mint the same
/// `match_id`/`result_id` pair.
const MAX_MATCHES_PER_ROUND: i64 = 1000;

impl Candidate {
    pub fn teams(&self) -> (TeamId, TeamId) {
        (self.team_one.team_id, self.team_two.team_id)
    }
}

/// Expected score of the side with `elo_self` facing `elo_other`, scaled by
/// `points_per_match`, rounded to 4 decimals (spec.md §4.6).
pub fn expected_score(elo_self: f64, elo_other: f64, points_per_match: f64) -> f64 {
    let raw = points_per_match / (1.0 + 10f64.powf((elo_other - elo_self) / 400.0));
    (raw * 10_000.0).round() / 10_000.0
}

/// Square-wave `{0, 1}` diversity signal on `round_id` (spec.md §4.6; this
/// spec adopts the `round_id` scaling over the source's alternate
/// `turn * 100` form — see spec.md §9's open question and DESIGN.md).
pub fn period_factor(round_id: RoundId, active: u64, duty_cycle: f64) -> f64 {
    if active == 0 {
        return 0.0;
    }
    let phase = (round_id.rem_euclid(active as i64)) as f64 / active as f64;
    if phase >= duty_cycle / 5.0 { 0.0 } else { 1.0 }
}

/// A candidate's utility: `distance + period_factor / distance`, where
/// `distance = exp(-|E(A) - E(B)|) ∈ (0, 1]` (spec.md §4.6). Also returns
/// the two expected scores so the caller can stash them on the formed
/// match's results.
pub fn match_utility(
    candidate: &Candidate,
    points_per_match: f64,
    period_active: u64,
    period_duty_cycle: f64,
    round_id: RoundId,
) -> (f64, f64, f64) {
    let e_a = expected_score(candidate.team_one.elo, candidate.team_two.elo, points_per_match);
    let e_b = expected_score(candidate.team_two.elo, candidate.team_one.elo, points_per_match);
    let distance = (-(e_a - e_b).abs()).exp();
    let pf = period_factor(round_id, period_active, period_duty_cycle);
    (distance + pf / distance, e_a, e_b)
}

/// Enumerates all unordered candidate pairs of queued teams (spec.md §4.6
/// step 1), dropping pairs seen in `history` unless `max_history == 0`.
fn candidate_pairs(teams: &[Team], exclude_history: bool, history: &QueueContext) -> Vec<Candidate> {
    teams
        .iter()
        .tuple_combinations()
        .filter(|(a, b)| !exclude_history || !history.contains_match_in_history(a.team_id, b.team_id))
        .map(|(a, b)| Candidate { team_one: a.clone(), team_two: b.clone() })
        .collect()
}

/// Enumerates all size-`teams.len()/2` combinations of candidates in which
/// every team appears exactly once (spec.md §4.6 step 3, the feasible set
/// `S`). Falls back to the unfiltered candidate pool when history exclusion
/// leaves no feasible set (spec.md §8 invariant 5).
pub fn feasible_sets(teams: &[Team], history: &QueueContext) -> Vec<Vec<Candidate>> {
    let n_matches = teams.len() / 2;

    let filtered = candidate_pairs(teams, true, history);
    let sets = enumerate_feasible(&filtered, n_matches);
    if !sets.is_empty() {
        return sets;
    }

    let unfiltered = candidate_pairs(teams, false, history);
    enumerate_feasible(&unfiltered, n_matches)
}

fn enumerate_feasible(candidates: &[Candidate], n_matches: usize) -> Vec<Vec<Candidate>> {
    if n_matches == 0 {
        return Vec::new();
    }
    candidates
        .iter()
        .cloned()
        .combinations(n_matches)
        .filter(|set| all_teams_distinct(set))
        .collect()
}

fn all_teams_distinct(set: &[Candidate]) -> bool {
    let mut seen = std::collections::HashSet::new();
    set.iter().all(|c| {
        let (a, b) = c.teams();
        seen.insert(a) && seen.insert(b)
    })
}

/// Realizes a chosen feasible set into `Match`es, populating each side's
/// `Result.points` with the expected score computed for it (spec.md §4.6's
/// side effect, consumed later by `InGameContext::add_result`).
///
/// `match_id` is derived from `round_id` and the candidate's position in
/// the chosen set rather than reused from enumeration — `round_id` strictly
/// increases every time a round forms (`QueueContext::advance_round`), so
/// the resulting ids stay unique across rounds that are concurrently open.
pub fn realize_matches(
    chosen: &[Candidate],
    round_id: RoundId,
    points_per_match: f64,
    period_active: u64,
    period_duty_cycle: f64,
) -> Vec<Match> {
    chosen
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let (_, e_a, e_b) = match_utility(c, points_per_match, period_active, period_duty_cycle, round_id);
            let match_id = round_id * MAX_MATCHES_PER_ROUND + i as i64;
            Match {
                match_id,
                round: round_id,
                team_one: MatchResult::expected(match_id * 2, c.team_one.team_id, e_a),
                team_two: MatchResult::expected(match_id * 2 + 1, c.team_two.team_id, e_b),
                odds_ratio: if e_b != 0.0 { e_a / e_b } else { f64::INFINITY },
            }
        })
        .collect()
}
