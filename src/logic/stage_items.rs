//! Stage item lifecycle: creation with its initial matches, late scheduling and cascading
//! deletion.

use crate::logic::conflicts::handle_conflicts;
use crate::logic::generation::{build_matches_for_stage_item, validate_team_count};
use crate::logic::scheduling::{reorder_matches_for_court, schedule_all_unscheduled_matches};
use crate::logic::setup::in_transaction;
use crate::models::{
    CourtId, Input, InputId, InputSource, InputStats, MatchId, RankingId, StageId, StageItem,
    StageItemId, StageType, Tournament, TournamentError,
};
use serde::{Deserialize, Serialize};

/// Everything needed to create a stage item. `inputs` are given in slot order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageItemCreate {
    pub stage_id: StageId,
    pub name: String,
    pub stage_type: StageType,
    pub team_count: u32,
    /// Defaults to the tournament's first ranking policy.
    #[serde(default)]
    pub ranking_id: Option<RankingId>,
    pub inputs: Vec<InputSource>,
}

fn validate_input_source(
    tournament: &Tournament,
    source: &InputSource,
) -> Result<(), TournamentError> {
    match *source {
        InputSource::Team { team_id } => {
            tournament.team(team_id)?;
        }
        InputSource::Tentative {
            winner_from_stage_item_id,
            winner_position,
        } => {
            let upstream = tournament.stage_item(winner_from_stage_item_id)?;
            if winner_position == 0 || winner_position > upstream.team_count {
                return Err(TournamentError::InvalidConfiguration(format!(
                    "stage item {} has no position {}",
                    winner_from_stage_item_id, winner_position
                )));
            }
        }
    }
    Ok(())
}

/// Create a stage item with its inputs, generate its matches and place every finalized
/// round on the courts.
pub fn create_stage_item(
    tournament: &mut Tournament,
    body: &StageItemCreate,
) -> Result<StageItemId, TournamentError> {
    validate_team_count(body.stage_type, body.team_count)?;
    if body.inputs.len() != body.team_count as usize {
        return Err(TournamentError::InvalidConfiguration(format!(
            "stage item declares {} teams but {} inputs were given",
            body.team_count,
            body.inputs.len()
        )));
    }

    in_transaction(tournament, |t| {
        t.stage(body.stage_id)?;
        let ranking_id = match body.ranking_id {
            Some(id) => t.ranking(id)?.id,
            None => t.default_ranking_id().ok_or_else(|| {
                TournamentError::InvalidState("tournament has no ranking policy".to_string())
            })?,
        };
        for source in &body.inputs {
            validate_input_source(t, source)?;
        }

        let stage_item_id = StageItemId(t.next_id());
        t.stage_items.insert(
            stage_item_id,
            StageItem {
                id: stage_item_id,
                stage_id: body.stage_id,
                name: body.name.clone(),
                team_count: body.team_count,
                stage_type: body.stage_type,
                ranking_id,
            },
        );
        for (index, source) in body.inputs.iter().enumerate() {
            let input_id = InputId(t.next_id());
            t.inputs.insert(
                input_id,
                Input {
                    id: input_id,
                    stage_item_id,
                    slot: index as u32 + 1,
                    source: *source,
                    stats: InputStats::default(),
                },
            );
        }

        build_matches_for_stage_item(t, stage_item_id)?;
        schedule_all_unscheduled_matches(t, stage_item_id)?;
        handle_conflicts(t);
        log::info!(
            "Created stage item {} '{}' ({:?}, {} teams)",
            stage_item_id,
            body.name,
            body.stage_type,
            body.team_count
        );
        Ok(stage_item_id)
    })
}

/// Generate (and schedule) the initial matches of an existing stage item without rounds.
pub fn generate_matches(
    tournament: &mut Tournament,
    stage_item_id: StageItemId,
) -> Result<Vec<MatchId>, TournamentError> {
    in_transaction(tournament, |t| {
        let created = build_matches_for_stage_item(t, stage_item_id)?;
        schedule_all_unscheduled_matches(t, stage_item_id)?;
        handle_conflicts(t);
        Ok(created)
    })
}

/// Place every unscheduled match of a finalized round, in any stage item, on the courts.
///
/// Used once courts exist for stage items created before any court was added. Returns the
/// number of matches placed.
pub fn schedule_matches(tournament: &mut Tournament) -> Result<usize, TournamentError> {
    in_transaction(tournament, |t| {
        let stage_item_ids: Vec<StageItemId> = t.stage_items.keys().copied().collect();
        let mut placed = 0;
        for stage_item_id in stage_item_ids {
            placed += schedule_all_unscheduled_matches(t, stage_item_id)?;
        }
        handle_conflicts(t);
        Ok(placed)
    })
}

/// Delete a stage item: its matches, then its inputs, then its rounds, then the item itself.
/// Lanes are re-cascaded afterwards so the freed time is reused.
pub fn delete_stage_item(
    tournament: &mut Tournament,
    stage_item_id: StageItemId,
) -> Result<(), TournamentError> {
    in_transaction(tournament, |t| {
        t.stage_item(stage_item_id)?;
        let dependant = t.inputs.values().find(|i| {
            i.stage_item_id != stage_item_id
                && matches!(
                    i.source,
                    InputSource::Tentative { winner_from_stage_item_id, .. }
                        if winner_from_stage_item_id == stage_item_id
                )
        });
        if let Some(dependant) = dependant {
            return Err(TournamentError::InvalidState(format!(
                "stage item {} feeds input {} of stage item {}",
                stage_item_id, dependant.id, dependant.stage_item_id
            )));
        }

        let match_ids = t.match_ids_of_stage_item(stage_item_id);
        for match_id in &match_ids {
            t.matches.remove(match_id);
        }
        t.inputs.retain(|_, i| i.stage_item_id != stage_item_id);
        t.rounds.retain(|_, r| r.stage_item_id != stage_item_id);
        t.stage_items.remove(&stage_item_id);

        let court_ids: Vec<CourtId> = t.courts.iter().map(|c| c.id).collect();
        for court_id in court_ids {
            reorder_matches_for_court(t, court_id)?;
        }
        handle_conflicts(t);
        log::info!(
            "Deleted stage item {} and its {} matches",
            stage_item_id,
            match_ids.len()
        );
        Ok(())
    })
}
