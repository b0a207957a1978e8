//! Standings and skill scores of a stage item, recomputed from its decisive matches.

use crate::models::{
    InputId, InputSource, InputStats, StageItemId, StandingsEntry, TeamId, Tournament,
    TournamentError,
};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Skill score adjustment factor.
pub const K_FACTOR: f64 = 32.0;

/// Tentative inputs may chain through at most this many stage items.
const MAX_RESOLVE_DEPTH: usize = 16;

/// Skill score change for side A after a decisive match (side B changes by the negation).
///
/// Logistic expectation scaled by the margin of victory, so a bigger win moves the
/// scores further and a draw moves them toward each other.
pub fn elo_delta(elo_a: f64, elo_b: f64, score_a: u32, score_b: u32) -> f64 {
    let expected_a = 1.0 / (1.0 + 10f64.powf((elo_b - elo_a) / 400.0));
    let actual_a = match score_a.cmp(&score_b) {
        Ordering::Greater => 1.0,
        Ordering::Equal => 0.5,
        Ordering::Less => 0.0,
    };
    let margin = f64::from(score_a.abs_diff(score_b));
    let margin_factor = 1.0 + (1.0 + margin).ln();
    K_FACTOR * margin_factor * (actual_a - expected_a)
}

/// Recompute wins/draws/losses, points and skill score for every input of a stage item.
///
/// Matches are replayed in round order so skill scores evolve as they were played.
pub fn recalculate_ranking_for_stage_item(
    tournament: &mut Tournament,
    stage_item_id: StageItemId,
) -> Result<(), TournamentError> {
    let stage_item = tournament.stage_item(stage_item_id)?;
    let policy = tournament.ranking(stage_item.ranking_id)?.clone();

    let mut stats: BTreeMap<InputId, InputStats> = tournament
        .inputs_of(stage_item_id)
        .iter()
        .map(|i| (i.id, InputStats::default()))
        .collect();
    let mut score_differential: BTreeMap<InputId, i64> = BTreeMap::new();

    for match_id in tournament.match_ids_of_stage_item(stage_item_id) {
        let game_match = tournament.game_match(match_id)?;
        if !tournament.is_decisive(game_match) {
            continue;
        }
        let (Some(input_1), Some(input_2)) = (game_match.side_1.input_id, game_match.side_2.input_id)
        else {
            continue;
        };
        let (Some(score_1), Some(score_2)) = (game_match.side_1.score, game_match.side_2.score)
        else {
            continue;
        };
        if !stats.contains_key(&input_1) || !stats.contains_key(&input_2) {
            log::warn!(
                "Match {} references inputs outside stage item {}",
                match_id,
                stage_item_id
            );
            continue;
        }

        let delta = elo_delta(stats[&input_1].elo_score, stats[&input_2].elo_score, score_1, score_2);
        for (input_id, own, other, change) in [
            (input_1, score_1, score_2, delta),
            (input_2, score_2, score_1, -delta),
        ] {
            if let Some(entry) = stats.get_mut(&input_id) {
                match own.cmp(&other) {
                    Ordering::Greater => entry.add_win(),
                    Ordering::Equal => entry.add_draw(),
                    Ordering::Less => entry.add_loss(),
                }
                entry.elo_score += change;
            }
            *score_differential.entry(input_id).or_default() += i64::from(own) - i64::from(other);
        }
    }

    for (input_id, mut entry) in stats {
        entry.points = f64::from(entry.wins) * policy.win_points
            + f64::from(entry.draws) * policy.draw_points
            + f64::from(entry.losses) * policy.loss_points;
        if policy.add_score_points {
            entry.points += score_differential.get(&input_id).copied().unwrap_or(0) as f64;
        }
        tournament.input_mut(input_id)?.stats = entry;
    }
    log::debug!("Recalculated ranking for stage item {}", stage_item_id);
    Ok(())
}

/// Inputs of a stage item ordered best-first: points, wins, skill score, then slot.
pub fn ranked_input_ids(
    tournament: &Tournament,
    stage_item_id: StageItemId,
) -> Result<Vec<InputId>, TournamentError> {
    tournament.stage_item(stage_item_id)?;
    let mut inputs = tournament.inputs_of(stage_item_id);
    inputs.sort_by(|a, b| {
        b.stats
            .points
            .total_cmp(&a.stats.points)
            .then_with(|| b.stats.wins.cmp(&a.stats.wins))
            .then_with(|| b.stats.elo_score.total_cmp(&a.stats.elo_score))
            .then_with(|| a.slot.cmp(&b.slot))
    });
    Ok(inputs.into_iter().map(|i| i.id).collect())
}

/// Ordered standings rows of a stage item.
pub fn standings(
    tournament: &Tournament,
    stage_item_id: StageItemId,
) -> Result<Vec<StandingsEntry>, TournamentError> {
    ranked_input_ids(tournament, stage_item_id)?
        .into_iter()
        .enumerate()
        .map(|(index, input_id)| {
            let input = tournament.input(input_id)?;
            Ok(StandingsEntry {
                position: index as u32 + 1,
                input_id,
                team_id: resolve_input_team(tournament, input_id),
                wins: input.stats.wins,
                draws: input.stats.draws,
                losses: input.stats.losses,
                points: input.stats.points,
                elo_score: input.stats.elo_score,
            })
        })
        .collect()
}

/// Whether every match of the stage item has been decided (and there is at least one).
fn is_stage_item_finished(tournament: &Tournament, stage_item_id: StageItemId) -> bool {
    let match_ids = tournament.match_ids_of_stage_item(stage_item_id);
    !match_ids.is_empty()
        && match_ids.iter().all(|id| {
            tournament
                .matches
                .get(id)
                .is_some_and(|m| tournament.is_decisive(m))
        })
}

/// Team behind an input, following tentative inputs through finished upstream stage items.
pub fn resolve_input_team(tournament: &Tournament, input_id: InputId) -> Option<TeamId> {
    let mut current = input_id;
    for _ in 0..MAX_RESOLVE_DEPTH {
        match tournament.inputs.get(&current)?.source {
            InputSource::Team { team_id } => return Some(team_id),
            InputSource::Tentative {
                winner_from_stage_item_id,
                winner_position,
            } => {
                if winner_position == 0 || !is_stage_item_finished(tournament, winner_from_stage_item_id)
                {
                    return None;
                }
                let ranked = ranked_input_ids(tournament, winner_from_stage_item_id).ok()?;
                current = *ranked.get(winner_position as usize - 1)?;
            }
        }
    }
    log::warn!("Input {} resolves through too many stage items", input_id);
    None
}
