//! Integration tests for tournament setup, stage activation, rounds and stage item deletion.

mod common;

use common::{at, fixture, inputs, rounds, start, start_of};
use court_planner::{
    activate_next_stage, activate_round, advance_swiss_round, create_match, create_round,
    create_stage_item, delete_match, delete_round, delete_stage_item, logic::in_transaction,
    InputSource, MatchFilter, StageDirection, StageItemCreate, StageType, Tournament,
    TournamentError,
};

#[test]
fn new_tournament_validates_defaults() {
    assert!(matches!(
        Tournament::new("Cup", start(), 0, 5),
        Err(TournamentError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        Tournament::new("Cup", start(), 10, -5),
        Err(TournamentError::InvalidConfiguration(_))
    ));
    let t = Tournament::new("Cup", start(), 10, 0).unwrap();
    assert_eq!(t.rankings.len(), 1);
    assert!(t.default_ranking_id().is_some());
}

#[test]
fn first_stage_is_active_and_activation_moves() {
    let mut fx = fixture(1, 2);
    let second = fx.tournament.add_stage("Finals");
    assert_eq!(fx.tournament.active_stage().map(|s| s.id), Some(fx.stage_id));

    assert_eq!(
        activate_next_stage(&mut fx.tournament, StageDirection::Next),
        Ok(second)
    );
    assert_eq!(fx.tournament.active_stage().map(|s| s.id), Some(second));
    assert!(matches!(
        activate_next_stage(&mut fx.tournament, StageDirection::Next),
        Err(TournamentError::InvalidState(_))
    ));
    assert_eq!(fx.tournament.active_stage().map(|s| s.id), Some(second));

    assert_eq!(
        activate_next_stage(&mut fx.tournament, StageDirection::Previous),
        Ok(fx.stage_id)
    );
    assert!(matches!(
        activate_next_stage(&mut fx.tournament, StageDirection::Previous),
        Err(TournamentError::InvalidState(_))
    ));
    assert_eq!(fx.tournament.stages.values().filter(|s| s.is_active).count(), 1);
}

#[test]
fn advancing_swiss_fills_every_court() {
    let mut fx = fixture(2, 6);
    let item = fx.add_item(StageType::Swiss, 6);
    let round = advance_swiss_round(&mut fx.tournament, item, None, &MatchFilter::default()).unwrap();
    let t = &fx.tournament;

    assert!(!t.rounds[&round].is_draft);
    assert_eq!(t.rounds[&round].name, "Round 01");
    let matches = t.matches_of_round(round);
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].court_id, Some(fx.courts[0]));
    assert_eq!(matches[1].court_id, Some(fx.courts[1]));
    assert!(matches.iter().all(|m| m.start_time == Some(start())));

    let round = advance_swiss_round(&mut fx.tournament, item, None, &MatchFilter::default()).unwrap();
    assert_eq!(fx.tournament.rounds[&round].name, "Round 02");
    for m in fx.tournament.matches_of_round(round) {
        assert_eq!(m.start_time, Some(at(15)));
    }
}

#[test]
fn advancing_with_a_draft_round_fails() {
    let mut fx = fixture(2, 4);
    let item = fx.add_item(StageType::Swiss, 4);
    create_round(&mut fx.tournament, item).unwrap();
    assert!(matches!(
        advance_swiss_round(&mut fx.tournament, item, None, &MatchFilter::default()),
        Err(TournamentError::InvalidState(_))
    ));
    assert!(matches!(
        create_round(&mut fx.tournament, item),
        Err(TournamentError::InvalidState(_))
    ));
}

#[test]
fn advancing_without_courts_fails() {
    let mut fx = fixture(0, 4);
    let item = fx.add_item(StageType::Swiss, 4);
    assert!(matches!(
        advance_swiss_round(&mut fx.tournament, item, None, &MatchFilter::default()),
        Err(TournamentError::CapacityExceeded { courts: 0, .. })
    ));
    assert!(fx.tournament.rounds.is_empty());
}

#[test]
fn rounds_are_swiss_only() {
    let mut fx = fixture(1, 2);
    let item = fx.add_item(StageType::RoundRobin, 2);
    assert!(matches!(
        create_round(&mut fx.tournament, item),
        Err(TournamentError::InvalidState(_))
    ));
    let round = fx.tournament.rounds_of(item)[0].id;
    assert!(matches!(
        delete_round(&mut fx.tournament, round),
        Err(TournamentError::InvalidState(_))
    ));
}

#[test]
fn manual_round_building() {
    let mut fx = fixture(2, 4);
    let item = fx.add_item(StageType::Swiss, 4);
    let other = fx.add_item(StageType::Swiss, 4);
    let s = inputs(&fx.tournament, item);
    let round = create_round(&mut fx.tournament, item).unwrap();

    assert!(matches!(
        create_match(&mut fx.tournament, round, s[0], s[0]),
        Err(TournamentError::InvalidConfiguration(_))
    ));
    let foreign = inputs(&fx.tournament, other)[0];
    assert!(matches!(
        create_match(&mut fx.tournament, round, s[0], foreign),
        Err(TournamentError::InvalidConfiguration(_))
    ));

    let first = create_match(&mut fx.tournament, round, s[0], s[1]).unwrap();
    assert!(matches!(
        create_match(&mut fx.tournament, round, s[1], s[2]),
        Err(TournamentError::InvalidState(_))
    ));
    delete_match(&mut fx.tournament, first).unwrap();
    assert!(matches!(
        activate_round(&mut fx.tournament, round, None),
        Err(TournamentError::InvalidState(_))
    ));

    let m = create_match(&mut fx.tournament, round, s[1], s[2]).unwrap();
    activate_round(&mut fx.tournament, round, None).unwrap();
    assert!(!fx.tournament.rounds[&round].is_draft);
    assert_eq!(start_of(&fx.tournament, m), start());

    // Matches of an active round are fixed.
    assert!(matches!(
        delete_match(&mut fx.tournament, m),
        Err(TournamentError::InvalidState(_))
    ));
}

#[test]
fn deleting_a_round_frees_its_slots() {
    let mut fx = fixture(1, 4);
    let item = fx.add_item(StageType::Swiss, 4);
    let first = advance_swiss_round(&mut fx.tournament, item, None, &MatchFilter::default()).unwrap();
    let second = advance_swiss_round(&mut fx.tournament, item, None, &MatchFilter::default()).unwrap();
    let later = fx.tournament.matches_of_round(second)[0].id;
    assert_eq!(start_of(&fx.tournament, later), at(15));

    delete_round(&mut fx.tournament, first).unwrap();
    let t = &fx.tournament;
    assert!(!t.rounds.contains_key(&first));
    assert!(t.matches.values().all(|m| m.round_id != first));
    assert_eq!(start_of(t, later), start());
    assert_eq!(t.matches[&later].position_in_schedule, Some(1));
}

#[test]
fn deleting_a_stage_item_cascades() {
    let mut fx = fixture(1, 4);
    let first = fx.add_item(StageType::RoundRobin, 2);
    let (t3, t4) = (fx.teams[2], fx.teams[3]);
    let second = fx.add_item_with_teams(StageType::RoundRobin, &[t3, t4]);
    let later = rounds(&fx.tournament, second)[0][0];
    assert_eq!(start_of(&fx.tournament, later), at(15));

    delete_stage_item(&mut fx.tournament, first).unwrap();
    let t = &fx.tournament;
    assert!(!t.stage_items.contains_key(&first));
    assert!(t.inputs.values().all(|i| i.stage_item_id != first));
    assert!(t.rounds.values().all(|r| r.stage_item_id != first));
    assert_eq!(t.matches.len(), 1);
    assert_eq!(start_of(t, later), start());
}

#[test]
fn stage_item_feeding_another_cannot_be_deleted() {
    let mut fx = fixture(1, 2);
    let group = fx.add_item(StageType::RoundRobin, 2);
    let body = StageItemCreate {
        stage_id: fx.stage_id,
        name: "Final".to_string(),
        stage_type: StageType::RoundRobin,
        team_count: 2,
        ranking_id: None,
        inputs: (1..=2)
            .map(|winner_position| InputSource::Tentative {
                winner_from_stage_item_id: group,
                winner_position,
            })
            .collect(),
    };
    let final_item = create_stage_item(&mut fx.tournament, &body).unwrap();
    let matches_before = fx.tournament.matches.clone();

    assert!(matches!(
        delete_stage_item(&mut fx.tournament, group),
        Err(TournamentError::InvalidState(_))
    ));
    assert_eq!(fx.tournament.matches, matches_before);

    delete_stage_item(&mut fx.tournament, final_item).unwrap();
    delete_stage_item(&mut fx.tournament, group).unwrap();
    assert!(fx.tournament.matches.is_empty());
}

#[test]
fn failed_creation_leaves_tournament_untouched() {
    let mut fx = fixture(1, 2);
    let body = StageItemCreate {
        stage_id: fx.stage_id,
        name: "Group".to_string(),
        stage_type: StageType::RoundRobin,
        team_count: 2,
        ranking_id: None,
        inputs: vec![
            InputSource::Team {
                team_id: fx.teams[0],
            },
            InputSource::Team {
                team_id: court_planner::TeamId(999),
            },
        ],
    };
    assert_eq!(
        create_stage_item(&mut fx.tournament, &body),
        Err(TournamentError::NotFound {
            entity: "team",
            id: 999
        })
    );
    assert!(fx.tournament.stage_items.is_empty());
    assert!(fx.tournament.inputs.is_empty());
}

#[test]
fn transaction_rolls_back_on_error() {
    let mut fx = fixture(1, 2);
    let result: Result<(), _> = in_transaction(&mut fx.tournament, |t| {
        t.add_team("Late entry");
        t.name = "Renamed".to_string();
        Err(TournamentError::InvalidState("abort".to_string()))
    });
    assert!(result.is_err());
    assert_eq!(fx.tournament.name, "Spring Cup");
    assert_eq!(fx.tournament.teams.len(), 2);
}

#[test]
fn stage_item_request_from_json() {
    let fx = fixture(1, 2);
    let body: StageItemCreate = serde_json::from_value(serde_json::json!({
        "stage_id": fx.stage_id,
        "name": "Bracket",
        "stage_type": "SINGLE_ELIMINATION",
        "team_count": 2,
        "inputs": [
            { "kind": "team", "team_id": fx.teams[0] },
            { "kind": "tentative", "winner_from_stage_item_id": 7, "winner_position": 1 }
        ]
    }))
    .unwrap();
    assert_eq!(body.ranking_id, None);
    assert_eq!(body.stage_type, StageType::SingleElimination);
    assert_eq!(
        body.inputs[1],
        InputSource::Tentative {
            winner_from_stage_item_id: court_planner::StageItemId(7),
            winner_position: 1
        }
    );
}
