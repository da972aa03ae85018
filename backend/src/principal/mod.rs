//! Round-formation policies (spec.md §4.6).
//!
//! A principal picks one feasible set of candidate matches out of the ones
//! `candidate::feasible_sets` enumerates, by optimizing a policy-specific
//! aggregate of each candidate's `match_utility`. Ties break on first-seen
//! order, matching the stability spec.md §8's Testable Property #6 requires.

pub mod candidate;

use std::str::FromStr;

use crate::domain::{Match, RoundId, Team};
use crate::queue::QueueContext;

pub use candidate::{expected_score, match_utility, period_factor, Candidate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrincipalKind {
    MaxSum,
    MinVariance,
    MaxMin,
    MinMax,
}

impl FromStr for PrincipalKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "max_sum" | "maxsum" => Ok(PrincipalKind::MaxSum),
            "min_variance" | "minvariance" => Ok(PrincipalKind::MinVariance),
            "max_min" | "maxmin" => Ok(PrincipalKind::MaxMin),
            "min_max" | "minmax" => Ok(PrincipalKind::MinMax),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PrincipalKind::MaxSum => "max_sum",
            PrincipalKind::MinVariance => "min_variance",
            PrincipalKind::MaxMin => "max_min",
            PrincipalKind::MinMax => "min_max",
        };
        f.write_str(s)
    }
}

/// Tunables the policy needs to score a candidate (spec.md §6).
#[derive(Debug, Clone, Copy)]
pub struct PolicyParams {
    pub points_per_match: f64,
    pub period_active: u64,
    pub period_duty_cycle: f64,
    pub round_id: RoundId,
}

/// Forms one round's worth of matches out of `teams` (spec.md §4.6):
/// enumerates the feasible sets, scores each with this principal's
/// aggregate, and returns the winner's realized `Match`es. Returns `None`
/// if `teams` has fewer than two entries (nothing to pair).
pub fn form_matches(
    kind: PrincipalKind,
    teams: &[Team],
    history: &QueueContext,
    params: PolicyParams,
) -> Option<Vec<Match>> {
    if teams.len() < 2 {
        return None;
    }

    let sets = candidate::feasible_sets(teams, history);
    let scored: Vec<(Vec<Candidate>, Vec<f64>)> = sets
        .into_iter()
        .map(|set| {
            let utilities = set
                .iter()
                .map(|c| {
                    match_utility(c, params.points_per_match, params.period_active, params.period_duty_cycle, params.round_id).0
                })
                .collect();
            (set, utilities)
        })
        .collect();

    let chosen = kind.select(&scored)?;

    Some(candidate::realize_matches(
        chosen,
        params.round_id,
        params.points_per_match,
        params.period_active,
        params.period_duty_cycle,
    ))
}

impl PrincipalKind {
    /// Picks the winning feasible set's candidates out of `scored`, each
    /// entry pairing a set with its per-candidate utilities. First-seen
    /// wins ties: a later set must do *strictly* better to replace the
    /// incumbent.
    fn select<'a>(&self, scored: &'a [(Vec<Candidate>, Vec<f64>)]) -> Option<&'a [Candidate]> {
        if scored.is_empty() {
            return None;
        }

        let aggregate = |utilities: &[f64]| -> f64 {
            match self {
                PrincipalKind::MaxSum => utilities.iter().sum(),
                PrincipalKind::MinVariance => variance(utilities),
                PrincipalKind::MaxMin => utilities.iter().cloned().fold(f64::INFINITY, f64::min),
                PrincipalKind::MinMax => utilities.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            }
        };
        let minimizes = matches!(self, PrincipalKind::MinVariance | PrincipalKind::MinMax);

        let mut best_idx = 0usize;
        let mut best_score = aggregate(&scored[0].1);
        for (idx, (_, utilities)) in scored.iter().enumerate().skip(1) {
            let score = aggregate(utilities);
            let better = if minimizes { score < best_score } else { score > best_score };
            if better {
                best_score = score;
                best_idx = idx;
            }
        }

        Some(&scored[best_idx].0)
    }
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: i64, elo: f64) -> Team {
        Team { team_id: id, name: format!("t{id}"), player_one: id * 10 + 1, player_two: id * 10 + 2, elo }
    }

    fn params(round_id: RoundId) -> PolicyParams {
        PolicyParams { points_per_match: 1.0, period_active: 10, period_duty_cycle: 2.5, round_id }
    }

    #[test]
    fn parses_known_names_case_insensitively() {
        assert_eq!("MAX_SUM".parse::<PrincipalKind>().unwrap(), PrincipalKind::MaxSum);
        assert_eq!("minmax".parse::<PrincipalKind>().unwrap(), PrincipalKind::MinMax);
        assert!("bogus".parse::<PrincipalKind>().is_err());
    }

    #[test]
    fn form_matches_pairs_every_team_exactly_once() {
        let teams = vec![team(1, 1000.0), team(2, 1050.0), team(3, 980.0), team(4, 1100.0)];
        let history = QueueContext::new(16);

        let matches = form_matches(PrincipalKind::MaxSum, &teams, &history, params(1)).unwrap();
        assert_eq!(matches.len(), 2);

        let mut seen = std::collections::HashSet::new();
        for m in &matches {
            let (a, b) = m.teams();
            assert!(seen.insert(a));
            assert!(seen.insert(b));
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn two_teams_always_pairs_them() {
        let teams = vec![team(1, 1000.0), team(2, 1000.0)];
        let history = QueueContext::new(16);
        for kind in [PrincipalKind::MaxSum, PrincipalKind::MinVariance, PrincipalKind::MaxMin, PrincipalKind::MinMax] {
            let matches = form_matches(kind, &teams, &history, params(1)).unwrap();
            assert_eq!(matches.len(), 1);
        }
    }

    #[test]
    fn fewer_than_two_teams_yields_none() {
        let teams = vec![team(1, 1000.0)];
        let history = QueueContext::new(16);
        assert!(form_matches(PrincipalKind::MaxSum, &teams, &history, params(1)).is_none());
    }
}
