//! Match edits: scores, custom timing, manual rescheduling, ranking recomputation.

use crate::logic::conflicts::handle_conflicts;
use crate::logic::elimination::{
    update_inputs_in_complete_elimination_stage_item,
    update_inputs_in_subsequent_elimination_rounds,
};
use crate::logic::ranking::recalculate_ranking_for_stage_item;
use crate::logic::scheduling::{
    handle_match_reschedule, reorder_matches_for_court, validate_custom_timing, RescheduleRequest,
};
use crate::logic::setup::in_transaction;
use crate::models::{MatchId, StageItemId, Tournament, TournamentError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// New values for a match. Every field replaces the current one (`None` clears it).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchUpdate {
    pub score_1: Option<u32>,
    pub score_2: Option<u32>,
    pub custom_duration_minutes: Option<i64>,
    pub custom_margin_minutes: Option<i64>,
}

/// Apply a match edit, then propagate the bracket, recompute standings and, if the timing
/// changed, re-cascade the match's court.
pub fn update_match(
    tournament: &mut Tournament,
    match_id: MatchId,
    update: &MatchUpdate,
) -> Result<(), TournamentError> {
    validate_custom_timing(update.custom_duration_minutes, update.custom_margin_minutes)?;
    in_transaction(tournament, |t| {
        let game_match = t.game_match_mut(match_id)?;
        let timing_changed = game_match.custom_duration_minutes != update.custom_duration_minutes
            || game_match.custom_margin_minutes != update.custom_margin_minutes;
        game_match.side_1.score = update.score_1;
        game_match.side_2.score = update.score_2;
        game_match.custom_duration_minutes = update.custom_duration_minutes;
        game_match.custom_margin_minutes = update.custom_margin_minutes;
        let round_id = game_match.round_id;
        let court_id = game_match.court_id;

        let stage_item_id = t.stage_item_of_round(round_id)?.id;
        let changed = BTreeSet::from([match_id]);
        update_inputs_in_subsequent_elimination_rounds(t, round_id, stage_item_id, &changed)?;
        recalculate_ranking_for_stage_item(t, stage_item_id)?;

        if timing_changed {
            if let Some(court_id) = court_id {
                reorder_matches_for_court(t, court_id)?;
            }
        }
        handle_conflicts(t);
        Ok(())
    })
}

/// Record both scores of a match, keeping its custom timing.
pub fn record_score(
    tournament: &mut Tournament,
    match_id: MatchId,
    score_1: u32,
    score_2: u32,
) -> Result<(), TournamentError> {
    let game_match = tournament.game_match(match_id)?;
    let update = MatchUpdate {
        score_1: Some(score_1),
        score_2: Some(score_2),
        custom_duration_minutes: game_match.custom_duration_minutes,
        custom_margin_minutes: game_match.custom_margin_minutes,
    };
    log::info!("Recording {}-{} for match {}", score_1, score_2, match_id);
    update_match(tournament, match_id, &update)
}

/// Move a match on the schedule (court, position, custom timing) and rescan conflicts.
pub fn reschedule_match(
    tournament: &mut Tournament,
    match_id: MatchId,
    request: &RescheduleRequest,
) -> Result<(), TournamentError> {
    in_transaction(tournament, |t| {
        handle_match_reschedule(t, match_id, request)?;
        handle_conflicts(t);
        Ok(())
    })
}

/// Rebuild an elimination bracket from scratch and recompute the stage item's standings.
pub fn recalculate_ranking(
    tournament: &mut Tournament,
    stage_item_id: StageItemId,
) -> Result<(), TournamentError> {
    in_transaction(tournament, |t| {
        update_inputs_in_complete_elimination_stage_item(t, stage_item_id)?;
        recalculate_ranking_for_stage_item(t, stage_item_id)?;
        handle_conflicts(t);
        Ok(())
    })
}
