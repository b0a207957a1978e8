//! Integration tests for CSV team import.

mod common;

use common::fixture;
use court_planner::{import_teams_csv, TournamentError};

#[test]
fn imports_one_team_per_row() {
    let mut fx = fixture(1, 0);
    let csv = "name,active\nFalcons,true\n  Otters  ,false\n";
    let ids = import_teams_csv(&mut fx.tournament, csv.as_bytes()).unwrap();

    assert_eq!(ids.len(), 2);
    let falcons = &fx.tournament.teams[&ids[0]];
    assert_eq!((falcons.name.as_str(), falcons.active), ("Falcons", true));
    let otters = &fx.tournament.teams[&ids[1]];
    assert_eq!((otters.name.as_str(), otters.active), ("Otters", false));
}

#[test]
fn active_column_is_optional() {
    let mut fx = fixture(1, 0);
    let ids = import_teams_csv(&mut fx.tournament, "name\nA\nB\nC\n".as_bytes()).unwrap();
    assert_eq!(ids.len(), 3);
    assert!(fx.tournament.teams.values().all(|t| t.active));
}

#[test]
fn empty_name_rejects_whole_file() {
    let mut fx = fixture(1, 1);
    let csv = "name,active\nFalcons,true\n,true\n";
    assert_eq!(
        import_teams_csv(&mut fx.tournament, csv.as_bytes()),
        Err(TournamentError::InvalidImport {
            row: 3,
            reason: "team name is empty".to_string()
        })
    );
    assert_eq!(fx.tournament.teams.len(), 1);
}

#[test]
fn malformed_row_names_its_line() {
    let mut fx = fixture(1, 0);
    let csv = "name,active\nFalcons,maybe\n";
    assert!(matches!(
        import_teams_csv(&mut fx.tournament, csv.as_bytes()),
        Err(TournamentError::InvalidImport { row: 2, .. })
    ));
    assert!(fx.tournament.teams.is_empty());
}
