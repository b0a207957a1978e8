//! Tournament: defaults, courts, and the id-keyed arena holding every other entity.

use crate::models::error::TournamentError;
use crate::models::game::GameMatch;
use crate::models::ids::{
    CourtId, InputId, MatchId, RankingId, RoundId, StageId, StageItemId, TeamId, TournamentId,
};
use crate::models::ranking::RankingPolicy;
use crate::models::stage_item::{Input, Round, Stage, StageItem};
use crate::models::team::Team;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A court; matches on the same court form one schedule lane.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub id: CourtId,
    pub name: String,
}

/// Full tournament state.
///
/// Entities reference each other only by id; parent/child relations are answered by
/// lookups over the maps below, never by stored object references.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub start_time: DateTime<Utc>,
    /// Default match duration in minutes (>= 1).
    pub duration_minutes: i64,
    /// Default gap between matches on a court in minutes (>= 0).
    pub margin_minutes: i64,
    /// Courts in assignment order.
    pub courts: Vec<Court>,
    pub teams: BTreeMap<TeamId, Team>,
    pub rankings: BTreeMap<RankingId, RankingPolicy>,
    pub stages: BTreeMap<StageId, Stage>,
    pub stage_items: BTreeMap<StageItemId, StageItem>,
    pub inputs: BTreeMap<InputId, Input>,
    pub rounds: BTreeMap<RoundId, Round>,
    pub matches: BTreeMap<MatchId, GameMatch>,
    next_id: u32,
}

/// Upper bound for any duration or margin, in minutes (one week).
pub const MAX_TIMING_MINUTES: i64 = 7 * 24 * 60;

/// Check the tournament-wide duration and margin defaults.
pub fn validate_defaults(duration_minutes: i64, margin_minutes: i64) -> Result<(), TournamentError> {
    if duration_minutes < 1 {
        return Err(TournamentError::InvalidConfiguration(format!(
            "match duration must be at least 1 minute, got {duration_minutes}"
        )));
    }
    if margin_minutes < 0 {
        return Err(TournamentError::InvalidConfiguration(format!(
            "match margin cannot be negative, got {margin_minutes}"
        )));
    }
    if duration_minutes > MAX_TIMING_MINUTES || margin_minutes > MAX_TIMING_MINUTES {
        return Err(TournamentError::InvalidConfiguration(format!(
            "match duration and margin must not exceed {MAX_TIMING_MINUTES} minutes"
        )));
    }
    Ok(())
}

impl Tournament {
    /// Create an empty tournament with a default ranking policy.
    pub fn new(
        name: impl Into<String>,
        start_time: DateTime<Utc>,
        duration_minutes: i64,
        margin_minutes: i64,
    ) -> Result<Self, TournamentError> {
        validate_defaults(duration_minutes, margin_minutes)?;
        let mut tournament = Self {
            id: Uuid::new_v4(),
            name: name.into(),
            start_time,
            duration_minutes,
            margin_minutes,
            courts: Vec::new(),
            teams: BTreeMap::new(),
            rankings: BTreeMap::new(),
            stages: BTreeMap::new(),
            stage_items: BTreeMap::new(),
            inputs: BTreeMap::new(),
            rounds: BTreeMap::new(),
            matches: BTreeMap::new(),
            next_id: 1,
        };
        tournament.add_ranking(RankingPolicy::standard(RankingId(0), 0));
        Ok(tournament)
    }

    /// Allocate the next arena id. Ids are never reused within a tournament.
    pub(crate) fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add_court(&mut self, name: impl Into<String>) -> CourtId {
        let id = CourtId(self.next_id());
        self.courts.push(Court {
            id,
            name: name.into(),
        });
        id
    }

    pub fn add_team(&mut self, name: impl Into<String>) -> TeamId {
        let id = TeamId(self.next_id());
        self.teams.insert(id, Team::new(id, name));
        id
    }

    /// Add a stage at the end; the first stage of a tournament starts active.
    pub fn add_stage(&mut self, name: impl Into<String>) -> StageId {
        let id = StageId(self.next_id());
        let position = self.stages.values().map(|s| s.position + 1).max().unwrap_or(0);
        let is_active = self.stages.is_empty();
        self.stages.insert(
            id,
            Stage {
                id,
                name: name.into(),
                position,
                is_active,
            },
        );
        id
    }

    /// Insert a ranking policy, assigning it a fresh id. Returns the id.
    pub fn add_ranking(&mut self, mut policy: RankingPolicy) -> RankingId {
        let id = RankingId(self.next_id());
        policy.id = id;
        self.rankings.insert(id, policy);
        id
    }

    /// The ranking policy created with the tournament (lowest position).
    pub fn default_ranking_id(&self) -> Option<RankingId> {
        self.rankings.values().min_by_key(|r| r.position).map(|r| r.id)
    }

    pub fn court_index(&self, court_id: CourtId) -> Option<usize> {
        self.courts.iter().position(|c| c.id == court_id)
    }

    pub fn stage(&self, id: StageId) -> Result<&Stage, TournamentError> {
        self.stages
            .get(&id)
            .ok_or_else(|| TournamentError::not_found("stage", id))
    }

    pub fn active_stage(&self) -> Option<&Stage> {
        self.stages.values().find(|s| s.is_active)
    }

    pub fn team(&self, id: TeamId) -> Result<&Team, TournamentError> {
        self.teams
            .get(&id)
            .ok_or_else(|| TournamentError::not_found("team", id))
    }

    pub fn ranking(&self, id: RankingId) -> Result<&RankingPolicy, TournamentError> {
        self.rankings
            .get(&id)
            .ok_or_else(|| TournamentError::not_found("ranking", id))
    }

    pub fn stage_item(&self, id: StageItemId) -> Result<&StageItem, TournamentError> {
        self.stage_items
            .get(&id)
            .ok_or_else(|| TournamentError::not_found("stage item", id))
    }

    pub fn input(&self, id: InputId) -> Result<&Input, TournamentError> {
        self.inputs
            .get(&id)
            .ok_or_else(|| TournamentError::not_found("input", id))
    }

    pub fn input_mut(&mut self, id: InputId) -> Result<&mut Input, TournamentError> {
        self.inputs
            .get_mut(&id)
            .ok_or_else(|| TournamentError::not_found("input", id))
    }

    pub fn round(&self, id: RoundId) -> Result<&Round, TournamentError> {
        self.rounds
            .get(&id)
            .ok_or_else(|| TournamentError::not_found("round", id))
    }

    pub fn round_mut(&mut self, id: RoundId) -> Result<&mut Round, TournamentError> {
        self.rounds
            .get_mut(&id)
            .ok_or_else(|| TournamentError::not_found("round", id))
    }

    pub fn game_match(&self, id: MatchId) -> Result<&GameMatch, TournamentError> {
        self.matches
            .get(&id)
            .ok_or_else(|| TournamentError::not_found("match", id))
    }

    pub fn game_match_mut(&mut self, id: MatchId) -> Result<&mut GameMatch, TournamentError> {
        self.matches
            .get_mut(&id)
            .ok_or_else(|| TournamentError::not_found("match", id))
    }

    /// Inputs of a stage item in slot order.
    pub fn inputs_of(&self, stage_item_id: StageItemId) -> Vec<&Input> {
        let mut inputs: Vec<_> = self
            .inputs
            .values()
            .filter(|i| i.stage_item_id == stage_item_id)
            .collect();
        inputs.sort_by_key(|i| (i.slot, i.id));
        inputs
    }

    /// Rounds of a stage item in creation order.
    pub fn rounds_of(&self, stage_item_id: StageItemId) -> Vec<&Round> {
        self.rounds
            .values()
            .filter(|r| r.stage_item_id == stage_item_id)
            .collect()
    }

    /// Matches of a round in creation order.
    pub fn matches_of_round(&self, round_id: RoundId) -> Vec<&GameMatch> {
        self.matches
            .values()
            .filter(|m| m.round_id == round_id)
            .collect()
    }

    /// Ids of every match in a stage item, in round order then creation order.
    pub fn match_ids_of_stage_item(&self, stage_item_id: StageItemId) -> Vec<MatchId> {
        self.rounds_of(stage_item_id)
            .into_iter()
            .flat_map(|r| self.matches_of_round(r.id))
            .map(|m| m.id)
            .collect()
    }

    /// The (single) draft round of a stage item, if any.
    pub fn draft_round(&self, stage_item_id: StageItemId) -> Option<&Round> {
        self.rounds_of(stage_item_id).into_iter().find(|r| r.is_draft)
    }

    pub fn stage_item_of_round(&self, round_id: RoundId) -> Result<&StageItem, TournamentError> {
        let round = self.round(round_id)?;
        self.stage_item(round.stage_item_id)
    }

    /// Both scores present and the match is outside a draft round.
    pub fn is_decisive(&self, game_match: &GameMatch) -> bool {
        game_match.has_scores()
            && self
                .rounds
                .get(&game_match.round_id)
                .is_some_and(|r| !r.is_draft)
    }
}
