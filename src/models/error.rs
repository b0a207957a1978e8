//! Errors returned by tournament operations.

use crate::models::ids::{CourtId, MatchId, RoundId, StageItemId, TournamentId};
use thiserror::Error;

/// Errors that can occur during tournament operations.
///
/// Every variant carries the ids involved and the rule that was violated so the caller
/// can explain the rejection without inspecting tournament state.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TournamentError {
    /// Bad team count / format combination, or invalid tournament defaults.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The round has more matches than the tournament has courts.
    #[error("Round {round_id} has {matches} matches but only {courts} courts are available")]
    CapacityExceeded {
        round_id: RoundId,
        matches: usize,
        courts: usize,
    },

    /// Moving a lane to `adjust_to_time` would make a previous match end before it could finish.
    #[error(
        "A match from the previous round is still happening: match {match_id} on court {court_id} \
         would need {overshoot_minutes} minutes less margin than its {margin_minutes} minute margin"
    )]
    SchedulingInfeasible {
        match_id: MatchId,
        court_id: CourtId,
        overshoot_minutes: i64,
        margin_minutes: i64,
    },

    /// The Swiss suggester found no valid pairing.
    #[error(
        "No more matches to schedule in stage item {stage_item_id}, all combinations of teams have been added already"
    )]
    NoMatchesAvailable { stage_item_id: StageItemId },

    /// A referenced entity does not exist in this tournament.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u32 },

    /// No tournament with this id is loaded.
    #[error("Tournament {0} not found")]
    TournamentNotFound(TournamentId),

    /// The tournament is not in a state that allows this action.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A team import file could not be read.
    #[error("Invalid import at row {row}: {reason}")]
    InvalidImport { row: usize, reason: String },
}

impl TournamentError {
    pub(crate) fn not_found(entity: &'static str, id: impl Into<u32>) -> Self {
        TournamentError::NotFound {
            entity,
            id: id.into(),
        }
    }
}
