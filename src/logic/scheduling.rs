//! Court assignment and time placement of matches.
//!
//! Every court is a lane: matches on it are totally ordered by `position_in_schedule` and each
//! one starts when the previous one ends (`end = start + duration + margin`).

use crate::models::{
    CourtId, GameMatch, MatchId, RoundId, StageItemId, Tournament, TournamentError,
    MAX_TIMING_MINUTES,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Manual move/edit of a single match.
///
/// `custom_duration_minutes` / `custom_margin_minutes` replace the current overrides when set;
/// absent fields keep them (clear them with a match update). `start_time` only decides the
/// position in the target lane; actual times always come from the lane cascade.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescheduleRequest {
    pub court_id: Option<CourtId>,
    pub position_in_schedule: Option<u32>,
    pub start_time: Option<DateTime<Utc>>,
    pub custom_duration_minutes: Option<i64>,
    pub custom_margin_minutes: Option<i64>,
}

/// Check per-match overrides of duration and margin.
pub fn validate_custom_timing(
    custom_duration_minutes: Option<i64>,
    custom_margin_minutes: Option<i64>,
) -> Result<(), TournamentError> {
    if let Some(duration) = custom_duration_minutes {
        if duration < 1 {
            return Err(TournamentError::InvalidConfiguration(format!(
                "custom duration must be at least 1 minute, got {duration}"
            )));
        }
    }
    if let Some(margin) = custom_margin_minutes {
        if margin < 0 {
            return Err(TournamentError::InvalidConfiguration(format!(
                "custom margin cannot be negative, got {margin}"
            )));
        }
    }
    let too_long = |minutes: Option<i64>| minutes.is_some_and(|m| m > MAX_TIMING_MINUTES);
    if too_long(custom_duration_minutes) || too_long(custom_margin_minutes) {
        return Err(TournamentError::InvalidConfiguration(format!(
            "custom duration and margin must not exceed {MAX_TIMING_MINUTES} minutes"
        )));
    }
    Ok(())
}

/// Scheduled matches grouped by court, each lane in schedule order.
pub fn matches_per_court(tournament: &Tournament) -> BTreeMap<CourtId, Vec<MatchId>> {
    let mut lanes: BTreeMap<CourtId, Vec<&GameMatch>> = BTreeMap::new();
    for game_match in tournament.matches.values().filter(|m| m.is_scheduled()) {
        if let Some(court_id) = game_match.court_id {
            lanes.entry(court_id).or_default().push(game_match);
        }
    }
    lanes
        .into_iter()
        .map(|(court_id, mut lane)| {
            lane.sort_by_key(|m| (m.position_in_schedule, m.start_time, m.id));
            (court_id, lane.into_iter().map(|m| m.id).collect())
        })
        .collect()
}

fn lane_of(tournament: &Tournament, court_id: CourtId) -> Vec<MatchId> {
    matches_per_court(tournament)
        .remove(&court_id)
        .unwrap_or_default()
}

/// Put a match on a court at a fixed time and position, fixing its duration and margin from
/// the tournament defaults.
fn place_match(
    tournament: &mut Tournament,
    match_id: MatchId,
    court_id: CourtId,
    start_time: DateTime<Utc>,
    position: u32,
) -> Result<(), TournamentError> {
    let (duration, margin) = (tournament.duration_minutes, tournament.margin_minutes);
    let game_match = tournament.game_match_mut(match_id)?;
    game_match.court_id = Some(court_id);
    game_match.start_time = Some(start_time);
    game_match.position_in_schedule = Some(position);
    game_match.duration_minutes = duration;
    game_match.margin_minutes = margin;
    log::debug!(
        "Placed match {} on court {} at {} (position {})",
        match_id,
        court_id,
        start_time,
        position
    );
    Ok(())
}

/// Renumber a lane 1..n and chain start times from the tournament start.
fn cascade_lane(
    tournament: &mut Tournament,
    court_id: CourtId,
    lane: &[MatchId],
) -> Result<(), TournamentError> {
    let mut start = tournament.start_time;
    for (index, &match_id) in lane.iter().enumerate() {
        let game_match = tournament.game_match_mut(match_id)?;
        game_match.court_id = Some(court_id);
        game_match.position_in_schedule = Some(index as u32 + 1);
        game_match.start_time = Some(start);
        start = game_match.end_time().unwrap_or(start);
    }
    Ok(())
}

/// Recompute start times of every match on a court, keeping their relative order.
pub fn reorder_matches_for_court(
    tournament: &mut Tournament,
    court_id: CourtId,
) -> Result<(), TournamentError> {
    let lane = lane_of(tournament, court_id);
    cascade_lane(tournament, court_id, &lane)
}

/// Re-derive every scheduled match's duration and margin from the current tournament
/// defaults and re-cascade every lane.
pub fn update_start_times_of_matches(tournament: &mut Tournament) -> Result<(), TournamentError> {
    let (duration, margin) = (tournament.duration_minutes, tournament.margin_minutes);
    for game_match in tournament.matches.values_mut().filter(|m| m.is_scheduled()) {
        game_match.duration_minutes = duration;
        game_match.margin_minutes = margin;
    }
    for (court_id, lane) in matches_per_court(tournament) {
        cascade_lane(tournament, court_id, &lane)?;
    }
    Ok(())
}

/// Assign the matches of an activating round to courts (match i on court i) and place each
/// one right after the last match already on that court.
///
/// With `adjust_to_time`, the previous match on every used court gets a custom margin so that
/// the new match starts exactly at that time. Fails without touching anything if the round
/// has more matches than there are courts, or if a lane would have to end before its last
/// match could finish.
pub fn schedule_round(
    tournament: &mut Tournament,
    round_id: RoundId,
    adjust_to_time: Option<DateTime<Utc>>,
) -> Result<(), TournamentError> {
    tournament.round(round_id)?;
    let round_matches: Vec<MatchId> = tournament
        .matches_of_round(round_id)
        .iter()
        .map(|m| m.id)
        .collect();
    if round_matches.len() > tournament.courts.len() {
        return Err(TournamentError::CapacityExceeded {
            round_id,
            matches: round_matches.len(),
            courts: tournament.courts.len(),
        });
    }

    let in_round: BTreeSet<MatchId> = round_matches.iter().copied().collect();
    let lanes = matches_per_court(tournament);
    let mut margin_adjustments: Vec<(MatchId, i64)> = Vec::new();
    let mut placements: Vec<(MatchId, CourtId, DateTime<Utc>, u32)> = Vec::new();

    for (match_id, court) in round_matches.iter().zip(&tournament.courts) {
        let last_match = lanes
            .get(&court.id)
            .and_then(|lane| lane.iter().rev().find(|id| !in_round.contains(*id)))
            .and_then(|id| tournament.matches.get(id));

        let Some(last_match) = last_match else {
            placements.push((*match_id, court.id, tournament.start_time, 1));
            continue;
        };
        let (Some(last_start), Some(last_end)) = (last_match.start_time, last_match.end_time())
        else {
            placements.push((*match_id, court.id, tournament.start_time, 1));
            continue;
        };

        let mut difference_minutes = 0;
        if let Some(adjust_to_time) = adjust_to_time {
            difference_minutes = (adjust_to_time - last_end).num_seconds().div_euclid(60);
            let margin = last_match.effective_margin();
            if difference_minutes < 0 && -difference_minutes > margin {
                return Err(TournamentError::SchedulingInfeasible {
                    match_id: last_match.id,
                    court_id: court.id,
                    overshoot_minutes: -difference_minutes,
                    margin_minutes: margin,
                });
            }
            if margin + difference_minutes > MAX_TIMING_MINUTES {
                return Err(TournamentError::InvalidConfiguration(format!(
                    "adjusting to {} leaves a margin above {} minutes on court {}",
                    adjust_to_time, MAX_TIMING_MINUTES, court.id
                )));
            }
            if difference_minutes != 0 {
                margin_adjustments.push((last_match.id, margin + difference_minutes));
            }
        }

        let start_time = last_start
            + Duration::minutes(
                last_match.effective_duration() + last_match.effective_margin() + difference_minutes,
            );
        let position = last_match.position_in_schedule.unwrap_or(0) + 1;
        placements.push((*match_id, court.id, start_time, position));
    }

    for (match_id, custom_margin) in margin_adjustments {
        tournament.game_match_mut(match_id)?.custom_margin_minutes = Some(custom_margin);
    }
    for (match_id, court_id, start_time, position) in placements {
        place_match(tournament, match_id, court_id, start_time, position)?;
    }
    log::info!(
        "Scheduled {} matches of round {}",
        in_round.len(),
        round_id
    );
    Ok(())
}

/// Spread the unscheduled matches of every finalized round of a stage item over the courts
/// (match i of a round on court i modulo the court count), appending them to the lanes.
///
/// Returns the number of matches placed.
pub fn schedule_all_unscheduled_matches(
    tournament: &mut Tournament,
    stage_item_id: StageItemId,
) -> Result<usize, TournamentError> {
    if tournament.courts.is_empty() {
        log::warn!(
            "No courts in tournament {}, leaving stage item {} unscheduled",
            tournament.id,
            stage_item_id
        );
        return Ok(0);
    }

    let round_ids: Vec<RoundId> = tournament
        .rounds_of(stage_item_id)
        .iter()
        .filter(|r| !r.is_draft)
        .map(|r| r.id)
        .collect();
    let court_ids: Vec<CourtId> = tournament.courts.iter().map(|c| c.id).collect();

    let mut placed = 0;
    for round_id in round_ids {
        let unscheduled: Vec<MatchId> = tournament
            .matches_of_round(round_id)
            .iter()
            .filter(|m| !m.is_scheduled())
            .map(|m| m.id)
            .collect();
        for (index, match_id) in unscheduled.into_iter().enumerate() {
            let court_id = court_ids[index % court_ids.len()];
            let (start_time, position) = match lane_of(tournament, court_id).last() {
                Some(last_id) => {
                    let last = tournament.game_match(*last_id)?;
                    (
                        last.end_time().unwrap_or(tournament.start_time),
                        last.position_in_schedule.unwrap_or(0) + 1,
                    )
                }
                None => (tournament.start_time, 1),
            };
            place_match(tournament, match_id, court_id, start_time, position)?;
            placed += 1;
        }
    }
    log::info!("Scheduled {} matches of stage item {}", placed, stage_item_id);
    Ok(placed)
}

/// Move a match to another court and/or position, or change its custom timing, then
/// re-cascade every affected lane.
pub fn handle_match_reschedule(
    tournament: &mut Tournament,
    match_id: MatchId,
    request: &RescheduleRequest,
) -> Result<(), TournamentError> {
    validate_custom_timing(request.custom_duration_minutes, request.custom_margin_minutes)?;
    let game_match = tournament.game_match(match_id)?;
    if tournament.round(game_match.round_id)?.is_draft {
        return Err(TournamentError::InvalidState(format!(
            "match {match_id} belongs to draft round {}, activate the round first",
            game_match.round_id
        )));
    }
    let old_court = game_match.court_id.filter(|_| game_match.is_scheduled());
    let old_position = game_match.position_in_schedule;

    let target_court = request.court_id.or(old_court).ok_or_else(|| {
        TournamentError::InvalidState(format!(
            "match {match_id} is not scheduled yet, a court is required"
        ))
    })?;
    if tournament.court_index(target_court).is_none() {
        return Err(TournamentError::not_found("court", target_court));
    }

    let mut target_lane: Vec<MatchId> = lane_of(tournament, target_court)
        .into_iter()
        .filter(|&id| id != match_id)
        .collect();
    let index = if let Some(position) = request.position_in_schedule {
        (position.max(1) as usize - 1).min(target_lane.len())
    } else if let Some(start_time) = request.start_time {
        target_lane
            .iter()
            .position(|id| {
                tournament
                    .matches
                    .get(id)
                    .and_then(|m| m.start_time)
                    .is_some_and(|s| s > start_time)
            })
            .unwrap_or(target_lane.len())
    } else if old_court == Some(target_court) {
        (old_position.unwrap_or(1).max(1) as usize - 1).min(target_lane.len())
    } else {
        target_lane.len()
    };
    target_lane.insert(index, match_id);

    let (duration, margin) = (tournament.duration_minutes, tournament.margin_minutes);
    let game_match = tournament.game_match_mut(match_id)?;
    if request.custom_duration_minutes.is_some() {
        game_match.custom_duration_minutes = request.custom_duration_minutes;
    }
    if request.custom_margin_minutes.is_some() {
        game_match.custom_margin_minutes = request.custom_margin_minutes;
    }
    if old_court.is_none() {
        game_match.duration_minutes = duration;
        game_match.margin_minutes = margin;
    }
    // Drop it from its old lane before the old lane is rebuilt.
    game_match.court_id = Some(target_court);
    game_match.position_in_schedule = Some(index as u32 + 1);

    cascade_lane(tournament, target_court, &target_lane)?;
    if let Some(old_court) = old_court.filter(|&c| c != target_court) {
        reorder_matches_for_court(tournament, old_court)?;
    }
    log::info!(
        "Rescheduled match {} to court {} position {}",
        match_id,
        target_court,
        index + 1
    );
    Ok(())
}
