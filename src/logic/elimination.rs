//! Bracket propagation: keep elimination-match participants in line with upstream results.

use crate::models::{
    InputId, MatchId, RoundId, Side, StageItemId, StageType, Tournament, TournamentError,
};
use std::collections::BTreeSet;

/// Result of a propagation request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PropagationOutcome {
    /// The stage item is not single elimination; nothing to do.
    Skipped,
    /// Matches whose participants were (re)assigned.
    Updated { changed_matches: Vec<MatchId> },
}

/// Input that won `match_id`, if the match is decisive and not tied.
fn winner_of_match(tournament: &Tournament, match_id: MatchId) -> Option<InputId> {
    let source = tournament.matches.get(&match_id)?;
    if !tournament.is_decisive(source) {
        return None;
    }
    source.winner_input()
}

/// Re-derive the inputs of every side of `match_id` that references a winner.
///
/// With `only_from` set, only sides fed by one of those matches are touched.
/// Returns whether any side changed.
fn refresh_sides(
    tournament: &mut Tournament,
    match_id: MatchId,
    only_from: Option<&BTreeSet<MatchId>>,
) -> Result<bool, TournamentError> {
    let mut updates: Vec<(Side, Option<InputId>)> = Vec::new();
    let game_match = tournament.game_match(match_id)?;
    for side in Side::BOTH {
        let Some(source_id) = game_match.side(side).winner_from_match_id else {
            continue;
        };
        if only_from.is_some_and(|dirty| !dirty.contains(&source_id)) {
            continue;
        }
        updates.push((side, winner_of_match(tournament, source_id)));
    }

    let game_match = tournament.game_match_mut(match_id)?;
    let mut changed = false;
    for (side, winner) in updates {
        let slot = game_match.side_mut(side);
        if slot.input_id != winner {
            slot.input_id = winner;
            changed = true;
        }
    }
    Ok(changed)
}

fn is_single_elimination(
    tournament: &Tournament,
    stage_item_id: StageItemId,
) -> Result<bool, TournamentError> {
    let stage_item = tournament.stage_item(stage_item_id)?;
    if stage_item.stage_type != StageType::SingleElimination {
        log::debug!(
            "Skipping bracket propagation for stage item {} ({:?})",
            stage_item_id,
            stage_item.stage_type
        );
        return Ok(false);
    }
    Ok(true)
}

/// Walk every round of the bracket in order and reassign all winner references from scratch.
pub fn update_inputs_in_complete_elimination_stage_item(
    tournament: &mut Tournament,
    stage_item_id: StageItemId,
) -> Result<PropagationOutcome, TournamentError> {
    if !is_single_elimination(tournament, stage_item_id)? {
        return Ok(PropagationOutcome::Skipped);
    }

    let mut changed_matches = Vec::new();
    for match_id in tournament.match_ids_of_stage_item(stage_item_id) {
        if refresh_sides(tournament, match_id, None)? {
            changed_matches.push(match_id);
        }
    }
    Ok(PropagationOutcome::Updated { changed_matches })
}

/// Reassign winner references in the rounds strictly after `round_id`, starting from the
/// matches in `changed` and following the bracket downstream.
///
/// Converges to the same state as [`update_inputs_in_complete_elimination_stage_item`]
/// as long as the bracket was consistent before `changed` were edited.
pub fn update_inputs_in_subsequent_elimination_rounds(
    tournament: &mut Tournament,
    round_id: RoundId,
    stage_item_id: StageItemId,
    changed: &BTreeSet<MatchId>,
) -> Result<PropagationOutcome, TournamentError> {
    if !is_single_elimination(tournament, stage_item_id)? {
        return Ok(PropagationOutcome::Skipped);
    }

    let round_ids: Vec<RoundId> = tournament
        .rounds_of(stage_item_id)
        .iter()
        .map(|r| r.id)
        .collect();
    let start = round_ids
        .iter()
        .position(|&id| id == round_id)
        .ok_or_else(|| {
            TournamentError::InvalidState(format!(
                "round {round_id} does not belong to stage item {stage_item_id}"
            ))
        })?;

    let mut dirty = changed.clone();
    let mut changed_matches = Vec::new();
    for &later_round in &round_ids[start + 1..] {
        let match_ids: Vec<MatchId> = tournament
            .matches_of_round(later_round)
            .iter()
            .filter(|m| {
                Side::BOTH.into_iter().any(|s| {
                    m.side(s)
                        .winner_from_match_id
                        .is_some_and(|src| dirty.contains(&src))
                })
            })
            .map(|m| m.id)
            .collect();
        for match_id in match_ids {
            if refresh_sides(tournament, match_id, Some(&dirty))? {
                changed_matches.push(match_id);
            }
            // Its winner's identity may differ now even if the scores did not move.
            dirty.insert(match_id);
        }
    }
    Ok(PropagationOutcome::Updated { changed_matches })
}
