//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use court_planner::{
    create_stage_item, CourtId, InputId, InputSource, MatchId, StageId, StageItemCreate,
    StageItemId, StageType, TeamId, Tournament,
};

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 4, 9, 0, 0).unwrap()
}

/// Tournament start plus `minutes`.
pub fn at(minutes: i64) -> DateTime<Utc> {
    start() + Duration::minutes(minutes)
}

pub struct Fixture {
    pub tournament: Tournament,
    pub stage_id: StageId,
    pub courts: Vec<CourtId>,
    pub teams: Vec<TeamId>,
}

/// Tournament with 10 minute matches, 5 minute margins, one active stage.
pub fn fixture(courts: usize, teams: usize) -> Fixture {
    let mut tournament = Tournament::new("Spring Cup", start(), 10, 5).unwrap();
    let courts = (1..=courts)
        .map(|i| tournament.add_court(format!("Court {i}")))
        .collect();
    let teams = (1..=teams)
        .map(|i| tournament.add_team(format!("T{i}")))
        .collect();
    let stage_id = tournament.add_stage("Main");
    Fixture {
        tournament,
        stage_id,
        courts,
        teams,
    }
}

impl Fixture {
    /// Stage item over the first `team_count` teams, in team order.
    pub fn add_item(&mut self, stage_type: StageType, team_count: usize) -> StageItemId {
        let teams = self.teams[..team_count].to_vec();
        self.add_item_with_teams(stage_type, &teams)
    }

    pub fn add_item_with_teams(&mut self, stage_type: StageType, teams: &[TeamId]) -> StageItemId {
        let body = StageItemCreate {
            stage_id: self.stage_id,
            name: format!("{stage_type:?}"),
            stage_type,
            team_count: teams.len() as u32,
            ranking_id: None,
            inputs: teams
                .iter()
                .map(|&team_id| InputSource::Team { team_id })
                .collect(),
        };
        create_stage_item(&mut self.tournament, &body).unwrap()
    }
}

/// Input ids of a stage item in slot order.
pub fn inputs(t: &Tournament, stage_item_id: StageItemId) -> Vec<InputId> {
    t.inputs_of(stage_item_id).iter().map(|i| i.id).collect()
}

/// Match ids of every round of a stage item, one Vec per round.
pub fn rounds(t: &Tournament, stage_item_id: StageItemId) -> Vec<Vec<MatchId>> {
    t.rounds_of(stage_item_id)
        .iter()
        .map(|r| t.matches_of_round(r.id).iter().map(|m| m.id).collect())
        .collect()
}

/// The match between two inputs (either side order).
pub fn find_match(t: &Tournament, a: InputId, b: InputId) -> MatchId {
    t.matches
        .values()
        .find(|m| {
            let pair = (m.side_1.input_id, m.side_2.input_id);
            pair == (Some(a), Some(b)) || pair == (Some(b), Some(a))
        })
        .map(|m| m.id)
        .unwrap()
}

pub fn start_of(t: &Tournament, match_id: MatchId) -> DateTime<Utc> {
    t.matches[&match_id].start_time.unwrap()
}
