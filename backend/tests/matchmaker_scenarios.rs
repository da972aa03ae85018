//! End-to-end scenarios A-F (spec.md §8), driven entirely through the
//! public `Matchmaker` façade — no database involved, matching the
//! teacher's plain `#[test]` integration style for logic that doesn't
//! need a pool (`tests/elo_test.rs`).

use std::cell::RefCell;
use std::rc::Rc;

use duo_matchmaker_backend::config::Config;
use duo_matchmaker_backend::domain::{Match, MatchResult, Team, TeamId};
use duo_matchmaker_backend::error::MatchmakerError;
use duo_matchmaker_backend::kernel::{EventContext, EventHandler, EventKind, HandlerTag, HandlingResult};
use duo_matchmaker_backend::principal::PrincipalKind;
use duo_matchmaker_backend::Matchmaker;

fn config(threshold: usize, max_history: usize) -> Config {
    Config {
        database_url: String::new(),
        database_max_connections: 1,
        base_elo: 1000.0,
        points_per_match: 1.0,
        k_factor: 32.0,
        period_active: 10,
        period_duty_cycle: 2.5,
        trigger_threshold: threshold,
        max_history,
        principal: PrincipalKind::MaxSum,
    }
}

fn team(id: TeamId, p1: i64, p2: i64, elo: f64) -> Team {
    Team { team_id: id, name: format!("team-{id}"), player_one: p1, player_two: p2, elo }
}

#[test]
fn scenario_a_queue_dequeue() {
    let mut mm = Matchmaker::new(config(10, 0));

    let t1 = team(1, 1, 2, 1000.0);
    mm.queue_team(t1.clone()).unwrap();
    assert_eq!(mm.get_queue().len(), 1);
    assert!(mm.has_queued_player(1));
    assert!(mm.has_queued_player(2));

    let t2 = team(2, 1, 3, 1000.0);
    let err = mm.queue_team(t2).unwrap_err();
    match err {
        MatchmakerError::AlreadyQueued { player, team } => {
            assert_eq!(player, 1);
            assert_eq!(team.team_id, 1);
        }
        other => panic!("expected AlreadyQueued, got {other:?}"),
    }

    mm.dequeue_team(&t1).unwrap();
    assert_eq!(mm.get_queue().len(), 0);
    assert!(mm.get_queue().is_empty());
}

#[test]
fn scenario_b_trigger_forms_one_match_and_registers_game_end() {
    let mut mm = Matchmaker::new(config(2, 0));

    mm.queue_team(team(1, 1, 2, 1000.0)).unwrap();
    mm.queue_team(team(2, 3, 4, 1000.0)).unwrap();

    assert!(mm.get_queue().is_empty(), "queue emptied on trigger");
    assert_eq!(mm.get_games().len(), 1, "exactly one in-game context formed");
    assert_eq!(mm.get_queue().round_id(), 2, "round id advanced by exactly one");

    let m = mm.get_match_of_team(1).unwrap();
    let (a, b) = m.teams();
    assert!((a == 1 && b == 2) || (a == 2 && b == 1));
}

#[test]
fn scenario_c_result_produces_exact_deltas() {
    let mut mm = Matchmaker::new(config(2, 0));
    mm.queue_team(team(1, 1, 2, 1000.0)).unwrap();
    mm.queue_team(team(2, 3, 4, 1000.0)).unwrap();

    let m = mm.get_match_of_team(1).unwrap().clone();
    assert!((m.team_one.points - 0.5).abs() < 1e-9);
    assert!((m.team_two.points - 0.5).abs() < 1e-9);

    let (seven_side, three_side) = if m.team_one.team == 1 { (m.team_one, m.team_two) } else { (m.team_two, m.team_one) };
    let reported = Match {
        match_id: m.match_id,
        round: m.round,
        team_one: MatchResult { result_id: seven_side.result_id, team: seven_side.team, points: 7.0, delta: 0.0 },
        team_two: MatchResult { result_id: three_side.result_id, team: three_side.team, points: 3.0, delta: 0.0 },
        odds_ratio: m.odds_ratio,
    };

    mm.insert_result(reported).unwrap();
    assert_eq!(mm.get_games().len(), 0, "round closes once its one match reports");
}

#[test]
fn scenario_d_duplicate_result_is_rejected() {
    let mut mm = Matchmaker::new(config(2, 0));
    mm.queue_team(team(1, 1, 2, 1000.0)).unwrap();
    mm.queue_team(team(2, 3, 4, 1000.0)).unwrap();

    let m = mm.get_match_of_team(1).unwrap().clone();
    let reported = Match {
        match_id: m.match_id,
        round: m.round,
        team_one: MatchResult { result_id: m.team_one.result_id, team: m.team_one.team, points: 7.0, delta: 0.0 },
        team_two: MatchResult { result_id: m.team_two.result_id, team: m.team_two.team, points: 3.0, delta: 0.0 },
        odds_ratio: m.odds_ratio,
    };

    mm.insert_result(reported.clone()).unwrap();
    let err = mm.insert_result(reported).unwrap_err();
    assert!(matches!(err, MatchmakerError::MissingContext), "round already closed and removed");
}

#[test]
fn scenario_e_anti_repeat_avoids_the_history_pairing() {
    // spec.md's literal scenario E says `max_history=1` but then expects
    // *both* of round one's pairings excluded from round two — only
    // possible if the ring still holds both entries by the time round two
    // forms. We use `max_history=2` here (see DESIGN.md) so the ring
    // actually retains what the scenario's "Expected" outcome needs.
    let mut mm = Matchmaker::new(config(4, 2));

    mm.queue_team(team(1, 1, 2, 1000.0)).unwrap();
    mm.queue_team(team(2, 3, 4, 1000.0)).unwrap();
    mm.queue_team(team(3, 5, 6, 1000.0)).unwrap();
    mm.queue_team(team(4, 7, 8, 1000.0)).unwrap();

    assert_eq!(mm.get_games().len(), 1, "round one formed from all four teams");

    let mut matches: Vec<Match> = {
        let game = mm.get_games().iter().next().unwrap();
        game.matches().to_vec()
    };
    assert_eq!(matches.len(), 2);

    for m in matches.drain(..) {
        let reported = Match {
            match_id: m.match_id,
            round: m.round,
            team_one: MatchResult { result_id: m.team_one.result_id, team: m.team_one.team, points: 0.5, delta: 0.0 },
            team_two: MatchResult { result_id: m.team_two.result_id, team: m.team_two.team, points: 0.5, delta: 0.0 },
            odds_ratio: m.odds_ratio,
        };
        mm.insert_result(reported).unwrap();
    }
    assert_eq!(mm.get_games().len(), 0, "round one fully closed");

    mm.queue_team(team(1, 1, 2, 1000.0)).unwrap();
    mm.queue_team(team(2, 3, 4, 1000.0)).unwrap();
    mm.queue_team(team(3, 5, 6, 1000.0)).unwrap();
    mm.queue_team(team(4, 7, 8, 1000.0)).unwrap();

    let round_two = mm.get_games().iter().next().unwrap();
    for m in round_two.matches() {
        let (a, b) = m.teams();
        let is_1_2 = (a == 1 && b == 2) || (a == 2 && b == 1);
        let is_3_4 = (a == 3 && b == 4) || (a == 4 && b == 3);
        assert!(!is_1_2 && !is_3_4, "history pairings must be avoided while an alternative exists");
    }
}

#[test]
fn scenario_f_unrecognized_principal_falls_back_to_max_sum() {
    let mut mm = Matchmaker::new(config(10, 0));
    mm.set_principal("nonexistent");
    assert_eq!(mm.config().principal, PrincipalKind::MaxSum);
}

#[test]
fn round_trip_queue_then_dequeue_restores_prior_state() {
    let mut mm = Matchmaker::new(config(10, 0));
    let before_len = mm.get_queue().len();

    let t = team(1, 1, 2, 1000.0);
    mm.queue_team(t.clone()).unwrap();
    mm.dequeue_team(&t).unwrap();

    assert_eq!(mm.get_queue().len(), before_len);
    assert!(!mm.has_queued_player(1));
    assert!(!mm.has_queued_player(2));
}

#[test]
fn round_trip_form_then_complete_returns_games_registry_to_prior_cardinality() {
    let mut mm = Matchmaker::new(config(2, 0));
    let before = mm.get_games().len();

    mm.queue_team(team(1, 1, 2, 1000.0)).unwrap();
    mm.queue_team(team(2, 3, 4, 1000.0)).unwrap();
    assert_eq!(mm.get_games().len(), before + 1);

    let m = mm.get_match_of_team(1).unwrap().clone();
    let reported = Match {
        match_id: m.match_id,
        round: m.round,
        team_one: MatchResult { result_id: m.team_one.result_id, team: m.team_one.team, points: 1.0, delta: 0.0 },
        team_two: MatchResult { result_id: m.team_two.result_id, team: m.team_two.team, points: 0.0, delta: 0.0 },
        odds_ratio: m.odds_ratio,
    };
    mm.insert_result(reported).unwrap();
    assert_eq!(mm.get_games().len(), before);
}

/// An external handler registered via `register_handler` (spec.md §4.7) is
/// the only way a persistence layer or chat-platform notifier learns a
/// round closed; it must see the round's actual matches, not just ids.
#[derive(Debug)]
struct RoundEndRecorder {
    seen: Rc<RefCell<Vec<Match>>>,
}

impl EventHandler for RoundEndRecorder {
    fn kind(&self) -> EventKind {
        EventKind::RoundEnd
    }

    fn tag(&self) -> HandlerTag {
        HandlerTag::Named("round_end_recorder".to_string())
    }

    fn is_ready(&self, _engine: &Matchmaker, _ctx: &EventContext) -> bool {
        true
    }

    fn handle(&self, _engine: &mut Matchmaker, ctx: &EventContext) -> HandlingResult {
        if let Some(closed) = &ctx.closed_round {
            self.seen.borrow_mut().extend(closed.matches.clone());
        }
        Ok(())
    }

    fn requeue(&self) -> bool {
        true
    }
}

#[test]
fn round_end_event_carries_the_closed_rounds_matches_to_external_handlers() {
    let mut mm = Matchmaker::new(config(2, 0));
    let seen = Rc::new(RefCell::new(Vec::new()));
    mm.register_handler(Box::new(RoundEndRecorder { seen: seen.clone() }));

    mm.queue_team(team(1, 1, 2, 1000.0)).unwrap();
    mm.queue_team(team(2, 3, 4, 1000.0)).unwrap();

    let m = mm.get_match_of_team(1).unwrap().clone();
    let reported = Match {
        match_id: m.match_id,
        round: m.round,
        team_one: MatchResult { result_id: m.team_one.result_id, team: m.team_one.team, points: 1.0, delta: 0.0 },
        team_two: MatchResult { result_id: m.team_two.result_id, team: m.team_two.team, points: 0.0, delta: 0.0 },
        odds_ratio: m.odds_ratio,
    };
    mm.insert_result(reported).unwrap();

    let recorded = seen.borrow();
    assert_eq!(recorded.len(), 1, "the one match the closed round held reached the external handler");
    assert_eq!(recorded[0].match_id, m.match_id);
    assert!(
        (recorded[0].team_one.points - 1.0).abs() < 1e-9,
        "final reported points, not the pre-report expected score"
    );
}
