//! Integration tests for stage item creation and initial match generation.

mod common;

use common::{fixture, inputs, rounds};
use court_planner::{
    create_stage_item, generate_matches, logic::rounds_for_team_count,
    logic::validate_team_count, InputSource, MatchSide, StageItemCreate, StageType,
    TournamentError,
};
use std::collections::BTreeSet;

#[test]
fn round_count_lookup() {
    assert_eq!(rounds_for_team_count(0), Ok(0));
    assert_eq!(rounds_for_team_count(2), Ok(1));
    assert_eq!(rounds_for_team_count(4), Ok(2));
    assert_eq!(rounds_for_team_count(8), Ok(3));
    assert_eq!(rounds_for_team_count(16), Ok(4));
    for n in [6, 10, 12, 32] {
        assert!(matches!(
            rounds_for_team_count(n),
            Err(TournamentError::InvalidConfiguration(_))
        ));
    }
}

#[test]
fn team_count_must_fit_format() {
    assert!(validate_team_count(StageType::RoundRobin, 6).is_ok());
    assert!(validate_team_count(StageType::Swiss, 6).is_ok());
    assert!(validate_team_count(StageType::SingleElimination, 6).is_err());
    assert!(validate_team_count(StageType::RoundRobin, 3).is_err());
    assert!(validate_team_count(StageType::Swiss, 0).is_err());
}

#[test]
fn round_robin_plays_every_pair_once() {
    let mut fx = fixture(2, 4);
    let item = fx.add_item(StageType::RoundRobin, 4);
    let t = &fx.tournament;

    let rounds = rounds(t, item);
    assert_eq!(rounds.len(), 1);
    assert_eq!(rounds[0].len(), 6);

    let pairs: BTreeSet<_> = rounds[0]
        .iter()
        .map(|id| {
            let m = &t.matches[id];
            let (a, b) = (m.side_1.input_id.unwrap(), m.side_2.input_id.unwrap());
            assert_ne!(a, b);
            (a.min(b), a.max(b))
        })
        .collect();
    assert_eq!(pairs.len(), 6);
    assert!(t.matches.values().all(|m| m.is_scheduled()));
}

#[test]
fn single_elimination_builds_bracket() {
    let mut fx = fixture(4, 8);
    let item = fx.add_item(StageType::SingleElimination, 8);
    let t = &fx.tournament;
    let slots = inputs(t, item);

    let rounds = rounds(t, item);
    let sizes: Vec<usize> = rounds.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![4, 2, 1]);
    assert_eq!(t.rounds_of(item)[0].name, "Round 01");
    assert!(t.rounds_of(item).iter().all(|r| !r.is_draft));

    for (i, id) in rounds[0].iter().enumerate() {
        let m = &t.matches[id];
        assert_eq!(m.side_1, MatchSide::input(slots[2 * i]));
        assert_eq!(m.side_2, MatchSide::input(slots[2 * i + 1]));
    }
    for (later, earlier) in [(1, 0), (2, 1)] {
        for (i, id) in rounds[later].iter().enumerate() {
            let m = &t.matches[id];
            assert_eq!(m.side_1, MatchSide::winner_of(rounds[earlier][2 * i]));
            assert_eq!(m.side_2, MatchSide::winner_of(rounds[earlier][2 * i + 1]));
        }
    }
}

#[test]
fn swiss_starts_without_rounds() {
    let mut fx = fixture(2, 6);
    let item = fx.add_item(StageType::Swiss, 6);
    assert_eq!(inputs(&fx.tournament, item).len(), 6);
    assert!(fx.tournament.rounds_of(item).is_empty());
    assert!(fx.tournament.matches.is_empty());
}

#[test]
fn unsupported_elimination_size_is_rejected() {
    let mut fx = fixture(2, 6);
    let body = StageItemCreate {
        stage_id: fx.stage_id,
        name: "Bracket".to_string(),
        stage_type: StageType::SingleElimination,
        team_count: 6,
        ranking_id: None,
        inputs: fx
            .teams
            .iter()
            .map(|&team_id| InputSource::Team { team_id })
            .collect(),
    };
    assert!(matches!(
        create_stage_item(&mut fx.tournament, &body),
        Err(TournamentError::InvalidConfiguration(_))
    ));
    assert!(fx.tournament.stage_items.is_empty());
    assert!(fx.tournament.inputs.is_empty());
}

#[test]
fn input_count_must_match_team_count() {
    let mut fx = fixture(2, 4);
    let body = StageItemCreate {
        stage_id: fx.stage_id,
        name: "Group".to_string(),
        stage_type: StageType::RoundRobin,
        team_count: 4,
        ranking_id: None,
        inputs: vec![InputSource::Team {
            team_id: fx.teams[0],
        }],
    };
    assert!(matches!(
        create_stage_item(&mut fx.tournament, &body),
        Err(TournamentError::InvalidConfiguration(_))
    ));
}

#[test]
fn generating_twice_is_rejected() {
    let mut fx = fixture(1, 2);
    let item = fx.add_item(StageType::RoundRobin, 2);
    let before = fx.tournament.matches.clone();
    assert!(matches!(
        generate_matches(&mut fx.tournament, item),
        Err(TournamentError::InvalidState(_))
    ));
    assert_eq!(fx.tournament.matches, before);
}
