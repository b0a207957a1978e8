//! Integration tests for Swiss pairing suggestions and round advancement.

mod common;

use common::{fixture, inputs};
use court_planner::{
    advance_swiss_round, create_match, create_round, record_score, upcoming_matches, InputId,
    MatchFilter, StageType, SuggestedMatch, TournamentError,
};
use std::collections::BTreeSet;

fn pairs(suggestions: &[SuggestedMatch]) -> Vec<(InputId, InputId)> {
    suggestions.iter().map(|s| (s.input_1, s.input_2)).collect()
}

fn played_pairs(t: &court_planner::Tournament) -> BTreeSet<(InputId, InputId)> {
    t.matches
        .values()
        .filter_map(|m| {
            let (a, b) = (m.side_1.input_id?, m.side_2.input_id?);
            Some((a.min(b), a.max(b)))
        })
        .collect()
}

#[test]
fn fresh_stage_suggests_every_pair() {
    let mut fx = fixture(2, 4);
    let item = fx.add_item(StageType::Swiss, 4);
    let s = inputs(&fx.tournament, item);
    let suggestions = upcoming_matches(&fx.tournament, item, &MatchFilter::default()).unwrap();

    assert_eq!(suggestions.len(), 6);
    assert!(suggestions.iter().all(|m| m.is_recommended && m.times_played == 0));
    // The cheapest full round pairs neighbours in seeding order.
    assert_eq!(pairs(&suggestions[..2]), vec![(s[0], s[1]), (s[2], s[3])]);
    assert!(suggestions[..2].iter().all(|m| m.in_best_round));
    assert!(suggestions[2..].iter().all(|m| !m.in_best_round));
}

#[test]
fn limit_caps_the_list() {
    let mut fx = fixture(2, 6);
    let item = fx.add_item(StageType::Swiss, 6);
    let filter = MatchFilter {
        limit: 4,
        ..MatchFilter::default()
    };
    assert_eq!(upcoming_matches(&fx.tournament, item, &filter).unwrap().len(), 4);
}

#[test]
fn played_pairs_are_not_suggested_again() {
    let mut fx = fixture(2, 6);
    let item = fx.add_item(StageType::Swiss, 6);

    for _ in 0..3 {
        let before = played_pairs(&fx.tournament);
        let suggestions = upcoming_matches(&fx.tournament, item, &MatchFilter::default()).unwrap();
        assert!(!suggestions.is_empty());
        for pair in pairs(&suggestions) {
            assert!(!before.contains(&pair), "rematch {pair:?} suggested");
        }
        advance_swiss_round(&mut fx.tournament, item, None, &MatchFilter::default()).unwrap();
    }
    // Two matches per round on two courts, never the same pair twice.
    assert_eq!(played_pairs(&fx.tournament).len(), 6);
}

#[test]
fn inputs_in_draft_round_are_left_out() {
    let mut fx = fixture(3, 4);
    let item = fx.add_item(StageType::Swiss, 4);
    let s = inputs(&fx.tournament, item);
    let round = create_round(&mut fx.tournament, item).unwrap();
    create_match(&mut fx.tournament, round, s[0], s[2]).unwrap();

    let suggestions = upcoming_matches(&fx.tournament, item, &MatchFilter::default()).unwrap();
    assert_eq!(pairs(&suggestions), vec![(s[1], s[3])]);

    create_match(&mut fx.tournament, round, s[1], s[3]).unwrap();
    assert!(upcoming_matches(&fx.tournament, item, &MatchFilter::default())
        .unwrap()
        .is_empty());
}

#[test]
fn full_draft_round_has_no_suggestions() {
    let mut fx = fixture(1, 4);
    let item = fx.add_item(StageType::Swiss, 4);
    let s = inputs(&fx.tournament, item);
    let round = create_round(&mut fx.tournament, item).unwrap();
    create_match(&mut fx.tournament, round, s[0], s[1]).unwrap();
    assert!(upcoming_matches(&fx.tournament, item, &MatchFilter::default())
        .unwrap()
        .is_empty());
}

#[test]
fn same_seed_gives_same_suggestions() {
    let mut fx = fixture(2, 8);
    let item = fx.add_item(StageType::Swiss, 8);
    let round = advance_swiss_round(&mut fx.tournament, item, None, &MatchFilter::default()).unwrap();
    let ids: Vec<_> = fx
        .tournament
        .matches_of_round(round)
        .iter()
        .map(|m| m.id)
        .collect();
    record_score(&mut fx.tournament, ids[0], 3, 0).unwrap();
    record_score(&mut fx.tournament, ids[1], 1, 2).unwrap();

    let filter = MatchFilter {
        seed: 42,
        iterations: 200,
        ..MatchFilter::default()
    };
    let first = upcoming_matches(&fx.tournament, item, &filter).unwrap();
    let second = upcoming_matches(&fx.tournament, item, &filter).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 26);
}

#[test]
fn only_recommended_respects_skill_threshold() {
    let mut fx = fixture(2, 4);
    let item = fx.add_item(StageType::Swiss, 4);
    let s = inputs(&fx.tournament, item);
    let round = advance_swiss_round(&mut fx.tournament, item, None, &MatchFilter::default()).unwrap();
    let ids: Vec<_> = fx
        .tournament
        .matches_of_round(round)
        .iter()
        .map(|m| m.id)
        .collect();
    // Slots 1 and 3 win by the same margin, so winners and losers stay level.
    record_score(&mut fx.tournament, ids[0], 3, 0).unwrap();
    record_score(&mut fx.tournament, ids[1], 3, 0).unwrap();

    let filter = MatchFilter {
        elo_diff_threshold: 0,
        only_recommended: true,
        ..MatchFilter::default()
    };
    let suggestions = upcoming_matches(&fx.tournament, item, &filter).unwrap();
    let found: BTreeSet<_> = pairs(&suggestions).into_iter().collect();
    assert_eq!(found, BTreeSet::from([(s[0], s[2]), (s[1], s[3])]));
    assert!(suggestions.iter().all(|m| m.elo_diff == 0.0 && m.swiss_diff == 0.0));
}

#[test]
fn inputs_behind_schedule_are_flagged() {
    let mut fx = fixture(1, 4);
    let item = fx.add_item(StageType::Swiss, 4);
    let s = inputs(&fx.tournament, item);
    advance_swiss_round(&mut fx.tournament, item, None, &MatchFilter::default()).unwrap();

    let suggestions = upcoming_matches(&fx.tournament, item, &MatchFilter::default()).unwrap();
    assert_eq!(suggestions.len(), 5);
    let behind = |a: InputId, b: InputId| {
        suggestions
            .iter()
            .find(|m| (m.input_1, m.input_2) == (a, b))
            .map(|m| m.behind_schedule_count)
    };
    assert_eq!(behind(s[2], s[3]), Some(2));
    assert_eq!(behind(s[0], s[2]), Some(1));
}

#[test]
fn exhausted_pairings_fail_unless_rematches_allowed() {
    let mut fx = fixture(1, 2);
    let item = fx.add_item(StageType::Swiss, 2);
    advance_swiss_round(&mut fx.tournament, item, None, &MatchFilter::default()).unwrap();

    // The first match has no result yet but still counts as played.
    assert_eq!(
        advance_swiss_round(&mut fx.tournament, item, None, &MatchFilter::default()),
        Err(TournamentError::NoMatchesAvailable {
            stage_item_id: item
        })
    );
    assert_eq!(fx.tournament.rounds_of(item).len(), 1);

    let rematches = MatchFilter {
        allow_rematches: true,
        ..MatchFilter::default()
    };
    let suggestions = upcoming_matches(&fx.tournament, item, &rematches).unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].times_played, 1);
    assert!(!suggestions[0].is_recommended);

    advance_swiss_round(&mut fx.tournament, item, None, &rematches).unwrap();
    assert_eq!(fx.tournament.rounds_of(item).len(), 2);
}

#[test]
fn suggestions_require_swiss() {
    let mut fx = fixture(1, 2);
    let item = fx.add_item(StageType::RoundRobin, 2);
    assert!(matches!(
        upcoming_matches(&fx.tournament, item, &MatchFilter::default()),
        Err(TournamentError::InvalidState(_))
    ));
}
