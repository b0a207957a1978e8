//! Swiss round lifecycle: drafting, filling, activating and deleting rounds.

use crate::logic::conflicts::handle_conflicts;
use crate::logic::generation::{insert_match, insert_round};
use crate::logic::ranking::recalculate_ranking_for_stage_item;
use crate::logic::scheduling::{reorder_matches_for_court, schedule_round};
use crate::logic::setup::in_transaction;
use crate::logic::swiss::{get_upcoming_matches_for_swiss, MatchFilter, SuggestedMatch};
use crate::models::{
    CourtId, InputId, MatchId, MatchSide, RoundId, StageItemId, StageType, Tournament,
    TournamentError,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

fn require_swiss(tournament: &Tournament, stage_item_id: StageItemId) -> Result<(), TournamentError> {
    let stage_item = tournament.stage_item(stage_item_id)?;
    if !stage_item.stage_type.supports_dynamic_number_of_rounds() {
        return Err(TournamentError::InvalidState(format!(
            "stage type {:?} of stage item {} doesn't support manual creation of rounds",
            stage_item.stage_type, stage_item_id
        )));
    }
    Ok(())
}

/// Draft round of a Swiss stage item, or an error naming the rule.
fn require_draft_swiss_round(
    tournament: &Tournament,
    round_id: RoundId,
) -> Result<StageItemId, TournamentError> {
    let round = tournament.round(round_id)?;
    let stage_item = tournament.stage_item(round.stage_item_id)?;
    if !round.is_draft || stage_item.stage_type != StageType::Swiss {
        return Err(TournamentError::InvalidState(format!(
            "round {round_id} is not a draft round of a Swiss stage item"
        )));
    }
    Ok(stage_item.id)
}

/// Suggestions for the current draft round of a Swiss stage item.
///
/// Empty when the draft round already uses every court.
pub fn upcoming_matches(
    tournament: &Tournament,
    stage_item_id: StageItemId,
    filter: &MatchFilter,
) -> Result<Vec<SuggestedMatch>, TournamentError> {
    let draft_round = tournament.draft_round(stage_item_id).map(|r| r.id);
    if let Some(round_id) = draft_round {
        if tournament.courts.len() <= tournament.matches_of_round(round_id).len() {
            return Ok(Vec::new());
        }
    }
    get_upcoming_matches_for_swiss(tournament, filter, stage_item_id, draft_round)
}

/// Open an empty draft round in a Swiss stage item.
pub fn create_round(
    tournament: &mut Tournament,
    stage_item_id: StageItemId,
) -> Result<RoundId, TournamentError> {
    require_swiss(tournament, stage_item_id)?;
    if let Some(draft) = tournament.draft_round(stage_item_id) {
        return Err(TournamentError::InvalidState(format!(
            "stage item {} already has draft round {}",
            stage_item_id, draft.id
        )));
    }
    Ok(insert_round(tournament, stage_item_id, true))
}

/// Add a hand-picked pairing to a draft Swiss round.
pub fn create_match(
    tournament: &mut Tournament,
    round_id: RoundId,
    input_1: InputId,
    input_2: InputId,
) -> Result<MatchId, TournamentError> {
    let stage_item_id = require_draft_swiss_round(tournament, round_id)?;
    if input_1 == input_2 {
        return Err(TournamentError::InvalidConfiguration(format!(
            "input {input_1} cannot play against itself"
        )));
    }
    let busy: BTreeSet<InputId> = tournament
        .matches_of_round(round_id)
        .iter()
        .flat_map(|m| m.input_ids())
        .collect();
    for input_id in [input_1, input_2] {
        if tournament.input(input_id)?.stage_item_id != stage_item_id {
            return Err(TournamentError::InvalidConfiguration(format!(
                "input {input_id} does not belong to stage item {stage_item_id}"
            )));
        }
        if busy.contains(&input_id) {
            return Err(TournamentError::InvalidState(format!(
                "input {input_id} already plays in round {round_id}"
            )));
        }
    }
    Ok(insert_match(
        tournament,
        round_id,
        MatchSide::input(input_1),
        MatchSide::input(input_2),
    ))
}

/// Remove a match from a draft Swiss round.
pub fn delete_match(tournament: &mut Tournament, match_id: MatchId) -> Result<(), TournamentError> {
    let round_id = tournament.game_match(match_id)?.round_id;
    let stage_item_id = require_draft_swiss_round(tournament, round_id)?;
    in_transaction(tournament, |t| {
        let removed = t
            .matches
            .remove(&match_id)
            .ok_or_else(|| TournamentError::not_found("match", match_id))?;
        if let Some(court_id) = removed.court_id {
            reorder_matches_for_court(t, court_id)?;
        }
        recalculate_ranking_for_stage_item(t, stage_item_id)
    })
}

/// Schedule a draft round, promote it to active and refresh standings and conflicts.
fn finalize_round(
    tournament: &mut Tournament,
    stage_item_id: StageItemId,
    round_id: RoundId,
    adjust_to_time: Option<DateTime<Utc>>,
) -> Result<(), TournamentError> {
    schedule_round(tournament, round_id, adjust_to_time)?;
    tournament.round_mut(round_id)?.is_draft = false;
    recalculate_ranking_for_stage_item(tournament, stage_item_id)?;
    handle_conflicts(tournament);
    Ok(())
}

/// Promote a hand-built draft round: place its matches on the courts and make it active.
pub fn activate_round(
    tournament: &mut Tournament,
    round_id: RoundId,
    adjust_to_time: Option<DateTime<Utc>>,
) -> Result<(), TournamentError> {
    let stage_item_id = require_draft_swiss_round(tournament, round_id)?;
    if tournament.matches_of_round(round_id).is_empty() {
        return Err(TournamentError::InvalidState(format!(
            "round {round_id} has no matches to activate"
        )));
    }
    in_transaction(tournament, |t| {
        finalize_round(t, stage_item_id, round_id, adjust_to_time)
    })
}

/// Start the next Swiss round: open a draft round, fill every court with the best
/// non-repeating pairing available, schedule it and make it active.
pub fn advance_swiss_round(
    tournament: &mut Tournament,
    stage_item_id: StageItemId,
    adjust_to_time: Option<DateTime<Utc>>,
    filter: &MatchFilter,
) -> Result<RoundId, TournamentError> {
    require_swiss(tournament, stage_item_id)?;
    if tournament.draft_round(stage_item_id).is_some() {
        return Err(TournamentError::InvalidState(
            "There is already a draft round in this stage item, please delete it first".to_string(),
        ));
    }
    let one_at_a_time = MatchFilter {
        limit: 1,
        ..filter.clone()
    };
    if get_upcoming_matches_for_swiss(tournament, &one_at_a_time, stage_item_id, None)?.is_empty() {
        return Err(TournamentError::NoMatchesAvailable { stage_item_id });
    }

    in_transaction(tournament, |t| {
        let round_id = insert_round(t, stage_item_id, true);
        if t.courts.is_empty() {
            return Err(TournamentError::CapacityExceeded {
                round_id,
                matches: 1,
                courts: 0,
            });
        }

        for _ in 0..t.courts.len() {
            let suggestions =
                get_upcoming_matches_for_swiss(t, &one_at_a_time, stage_item_id, Some(round_id))?;
            let Some(best) = suggestions.first() else {
                break;
            };
            insert_match(
                t,
                round_id,
                MatchSide::input(best.input_1),
                MatchSide::input(best.input_2),
            );
        }

        finalize_round(t, stage_item_id, round_id, adjust_to_time)?;
        log::info!(
            "Started round {} of stage item {} with {} matches",
            round_id,
            stage_item_id,
            t.matches_of_round(round_id).len()
        );
        Ok(round_id)
    })
}

/// Delete a Swiss round and its matches, then recompute standings.
pub fn delete_round(tournament: &mut Tournament, round_id: RoundId) -> Result<(), TournamentError> {
    let stage_item_id = tournament.round(round_id)?.stage_item_id;
    require_swiss(tournament, stage_item_id)?;
    in_transaction(tournament, |t| {
        let courts: BTreeSet<CourtId> = t
            .matches_of_round(round_id)
            .iter()
            .filter_map(|m| m.court_id)
            .collect();
        t.matches.retain(|_, m| m.round_id != round_id);
        t.rounds.remove(&round_id);
        for court_id in courts {
            reorder_matches_for_court(t, court_id)?;
        }
        recalculate_ranking_for_stage_item(t, stage_item_id)?;
        handle_conflicts(t);
        Ok(())
    })
}
