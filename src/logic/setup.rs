//! Tournament-wide setup: transactions, defaults, stage activation and ranking policies.

use crate::logic::conflicts::handle_conflicts;
use crate::logic::elimination::update_inputs_in_complete_elimination_stage_item;
use crate::logic::ranking::recalculate_ranking_for_stage_item;
use crate::logic::scheduling::update_start_times_of_matches;
use crate::models::{
    validate_defaults, RankingId, RankingPolicy, StageId, StageItemId, Tournament, TournamentError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Run `op` on a working copy of the tournament and keep the result only if it succeeds.
///
/// A failure anywhere in a multi-step operation leaves `tournament` exactly as it was.
pub fn in_transaction<T>(
    tournament: &mut Tournament,
    op: impl FnOnce(&mut Tournament) -> Result<T, TournamentError>,
) -> Result<T, TournamentError> {
    let mut working = tournament.clone();
    match op(&mut working) {
        Ok(value) => {
            *tournament = working;
            Ok(value)
        }
        Err(e) => {
            log::info!("Rolled back operation on tournament {}: {}", tournament.id, e);
            Err(e)
        }
    }
}

/// Change the start time and default duration/margin, then re-derive every scheduled match's
/// timing from the new defaults.
pub fn update_tournament_defaults(
    tournament: &mut Tournament,
    start_time: DateTime<Utc>,
    duration_minutes: i64,
    margin_minutes: i64,
) -> Result<(), TournamentError> {
    validate_defaults(duration_minutes, margin_minutes)?;
    in_transaction(tournament, |t| {
        t.start_time = start_time;
        t.duration_minutes = duration_minutes;
        t.margin_minutes = margin_minutes;
        update_start_times_of_matches(t)?;
        handle_conflicts(t);
        Ok(())
    })
}

/// Which way to move the active stage.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageDirection {
    #[default]
    Next,
    Previous,
}

/// Make the stage after (or before) the active one active. Returns the newly active stage.
pub fn activate_next_stage(
    tournament: &mut Tournament,
    direction: StageDirection,
) -> Result<StageId, TournamentError> {
    in_transaction(tournament, |t| {
        let mut stages: Vec<(u32, StageId, bool)> = t
            .stages
            .values()
            .map(|s| (s.position, s.id, s.is_active))
            .collect();
        stages.sort();
        let active = stages
            .iter()
            .position(|&(_, _, is_active)| is_active)
            .ok_or_else(|| TournamentError::InvalidState("no stage is active".to_string()))?;
        let target = match direction {
            StageDirection::Next => active + 1,
            StageDirection::Previous => active.checked_sub(1).ok_or_else(|| {
                TournamentError::InvalidState("there is no previous stage".to_string())
            })?,
        };
        let &(_, target_id, _) = stages.get(target).ok_or_else(|| {
            TournamentError::InvalidState("there is no next stage".to_string())
        })?;

        for stage in t.stages.values_mut() {
            stage.is_active = stage.id == target_id;
        }
        log::info!("Activated stage {} ({:?})", target_id, direction);
        Ok(target_id)
    })
}

/// Points awarded per result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankingBody {
    pub win_points: f64,
    pub draw_points: f64,
    pub loss_points: f64,
    #[serde(default)]
    pub add_score_points: bool,
}

pub fn create_ranking(tournament: &mut Tournament, body: &RankingBody) -> RankingId {
    let position = tournament
        .rankings
        .values()
        .map(|r| r.position + 1)
        .max()
        .unwrap_or(0);
    tournament.add_ranking(RankingPolicy {
        id: RankingId(0),
        position,
        win_points: body.win_points,
        draw_points: body.draw_points,
        loss_points: body.loss_points,
        add_score_points: body.add_score_points,
    })
}

/// Replace a policy's weights and recompute every stage item that uses it.
pub fn update_ranking(
    tournament: &mut Tournament,
    ranking_id: RankingId,
    body: &RankingBody,
) -> Result<(), TournamentError> {
    in_transaction(tournament, |t| {
        let policy = t
            .rankings
            .get_mut(&ranking_id)
            .ok_or_else(|| TournamentError::not_found("ranking", ranking_id))?;
        policy.win_points = body.win_points;
        policy.draw_points = body.draw_points;
        policy.loss_points = body.loss_points;
        policy.add_score_points = body.add_score_points;

        let stage_item_ids: Vec<StageItemId> = t
            .stage_items
            .values()
            .filter(|s| s.ranking_id == ranking_id)
            .map(|s| s.id)
            .collect();
        for stage_item_id in stage_item_ids {
            update_inputs_in_complete_elimination_stage_item(t, stage_item_id)?;
            recalculate_ranking_for_stage_item(t, stage_item_id)?;
        }
        // New standings can change which team a tentative input resolves to.
        handle_conflicts(t);
        Ok(())
    })
}

pub fn delete_ranking(
    tournament: &mut Tournament,
    ranking_id: RankingId,
) -> Result<(), TournamentError> {
    tournament.ranking(ranking_id)?;
    if let Some(user) = tournament
        .stage_items
        .values()
        .find(|s| s.ranking_id == ranking_id)
    {
        return Err(TournamentError::InvalidState(format!(
            "ranking {} is still used by stage item {}",
            ranking_id, user.id
        )));
    }
    tournament.rankings.remove(&ranking_id);
    Ok(())
}
