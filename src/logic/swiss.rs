//! Swiss pairing suggestions for the next round of a stage item.

use crate::models::{
    Input, InputId, RoundId, StageItemId, StageType, Tournament, TournamentError,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Tunables of the pairing search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchFilter {
    /// Largest skill-score gap for a pairing to count as recommended.
    pub elo_diff_threshold: i64,
    /// Number of randomized full-round pairings tried.
    pub iterations: u32,
    /// Drop pairings that are not recommended.
    pub only_recommended: bool,
    /// Maximum number of suggestions returned.
    pub limit: usize,
    /// Suggest rematches once every fresh pairing is used up.
    pub allow_rematches: bool,
    /// Seed of the randomized search; same seed and standings give the same suggestions.
    pub seed: u64,
}

impl Default for MatchFilter {
    fn default() -> Self {
        Self {
            elo_diff_threshold: 200,
            iterations: 2_000,
            only_recommended: false,
            limit: 50,
            allow_rematches: false,
            seed: 0,
        }
    }
}

/// A candidate pairing, best-first in the suggester's output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuggestedMatch {
    pub input_1: InputId,
    pub input_2: InputId,
    pub elo_diff: f64,
    pub swiss_diff: f64,
    /// How often these two inputs already met in this stage item.
    pub times_played: u32,
    pub is_recommended: bool,
    /// Part of the cheapest complete round found by the search.
    pub in_best_round: bool,
    /// How many of the two inputs played fewer matches than the busiest input.
    pub behind_schedule_count: u32,
}

type PairKey = (InputId, InputId);

fn pair_key(a: InputId, b: InputId) -> PairKey {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Cost of pairing two inputs inside a full round: rematches dominate, then skill gap.
fn pairing_cost(a: &Input, b: &Input, history: &BTreeMap<PairKey, u32>) -> f64 {
    let times_played = history.get(&pair_key(a.id, b.id)).copied().unwrap_or(0);
    f64::from(times_played) * 100_000.0 + (a.stats.elo_score - b.stats.elo_score).abs()
}

/// Greedily pair `order` front to back, each input taking its cheapest free partner.
fn greedy_round(order: &[&Input], history: &BTreeMap<PairKey, u32>) -> (f64, Vec<PairKey>) {
    let mut taken = vec![false; order.len()];
    let mut total = 0.0;
    let mut pairs = Vec::new();
    for i in 0..order.len() {
        if taken[i] {
            continue;
        }
        let best = (i + 1..order.len())
            .filter(|&j| !taken[j])
            .min_by(|&x, &y| {
                pairing_cost(order[i], order[x], history)
                    .total_cmp(&pairing_cost(order[i], order[y], history))
            });
        if let Some(j) = best {
            taken[i] = true;
            taken[j] = true;
            total += pairing_cost(order[i], order[j], history);
            pairs.push(pair_key(order[i].id, order[j].id));
        }
    }
    (total, pairs)
}

/// Cheapest complete round found in `iterations` attempts. The first attempt walks the
/// inputs by skill score, later ones in seeded random order.
fn best_round(
    eligible: &[&Input],
    history: &BTreeMap<PairKey, u32>,
    iterations: u32,
    seed: u64,
) -> BTreeSet<PairKey> {
    if eligible.len() < 2 || iterations == 0 {
        return BTreeSet::new();
    }
    let mut order: Vec<&Input> = eligible.to_vec();
    order.sort_by(|a, b| {
        b.stats
            .elo_score
            .total_cmp(&a.stats.elo_score)
            .then_with(|| a.slot.cmp(&b.slot))
    });
    let mut rng = StdRng::seed_from_u64(seed);
    let (mut best_cost, mut best_pairs) = greedy_round(&order, history);
    for _ in 1..iterations {
        order.shuffle(&mut rng);
        let (cost, pairs) = greedy_round(&order, history);
        if cost < best_cost {
            best_cost = cost;
            best_pairs = pairs;
        }
    }
    best_pairs.into_iter().collect()
}

fn compare_suggestions(a: &SuggestedMatch, b: &SuggestedMatch) -> Ordering {
    b.is_recommended
        .cmp(&a.is_recommended)
        .then_with(|| b.in_best_round.cmp(&a.in_best_round))
        .then_with(|| b.behind_schedule_count.cmp(&a.behind_schedule_count))
        .then_with(|| a.elo_diff.total_cmp(&b.elo_diff))
        .then_with(|| a.swiss_diff.total_cmp(&b.swiss_diff))
        .then_with(|| (a.input_1, a.input_2).cmp(&(b.input_1, b.input_2)))
}

/// Suggest pairings for the next round of a Swiss stage item, best-first.
///
/// Inputs already playing in `draft_round_id` are left out. Pairs that already met in a
/// finalized round of the stage item are never suggested while a fresh pair exists; with
/// `allow_rematches` they are offered afterwards, fewest meetings first.
pub fn get_upcoming_matches_for_swiss(
    tournament: &Tournament,
    filter: &MatchFilter,
    stage_item_id: StageItemId,
    draft_round_id: Option<RoundId>,
) -> Result<Vec<SuggestedMatch>, TournamentError> {
    let stage_item = tournament.stage_item(stage_item_id)?;
    if stage_item.stage_type != StageType::Swiss {
        return Err(TournamentError::InvalidState(format!(
            "stage item {stage_item_id} is not a Swiss stage item"
        )));
    }

    let mut busy: BTreeSet<InputId> = BTreeSet::new();
    if let Some(draft_round_id) = draft_round_id {
        for game_match in tournament.matches_of_round(draft_round_id) {
            busy.extend(game_match.input_ids());
        }
    }

    let mut history: BTreeMap<PairKey, u32> = BTreeMap::new();
    let mut games_played: BTreeMap<InputId, u32> = BTreeMap::new();
    for round in tournament.rounds_of(stage_item_id).iter().filter(|r| !r.is_draft) {
        for game_match in tournament.matches_of_round(round.id) {
            for input_id in game_match.input_ids() {
                *games_played.entry(input_id).or_default() += 1;
            }
            if let (Some(a), Some(b)) = (game_match.side_1.input_id, game_match.side_2.input_id) {
                *history.entry(pair_key(a, b)).or_default() += 1;
            }
        }
    }

    let eligible: Vec<&Input> = tournament
        .inputs_of(stage_item_id)
        .into_iter()
        .filter(|i| !busy.contains(&i.id))
        .collect();
    let most_played = eligible
        .iter()
        .map(|i| games_played.get(&i.id).copied().unwrap_or(0))
        .max()
        .unwrap_or(0);
    let best_pairs = best_round(&eligible, &history, filter.iterations, filter.seed);

    let mut fresh = Vec::new();
    let mut rematches = Vec::new();
    for (index, a) in eligible.iter().enumerate() {
        for b in &eligible[index + 1..] {
            let key = pair_key(a.id, b.id);
            let times_played = history.get(&key).copied().unwrap_or(0);
            let elo_diff = (a.stats.elo_score - b.stats.elo_score).abs();
            let behind_schedule_count = [a.id, b.id]
                .iter()
                .filter(|id| games_played.get(*id).copied().unwrap_or(0) < most_played)
                .count() as u32;
            let suggestion = SuggestedMatch {
                input_1: a.id,
                input_2: b.id,
                elo_diff,
                swiss_diff: (a.stats.points - b.stats.points).abs(),
                times_played,
                is_recommended: times_played == 0 && elo_diff <= filter.elo_diff_threshold as f64,
                in_best_round: best_pairs.contains(&key),
                behind_schedule_count,
            };
            if times_played == 0 {
                fresh.push(suggestion);
            } else {
                rematches.push(suggestion);
            }
        }
    }

    let mut suggestions = if !fresh.is_empty() {
        fresh.sort_by(compare_suggestions);
        fresh
    } else if filter.allow_rematches {
        log::warn!(
            "Every fresh pairing in stage item {} is used up, suggesting rematches",
            stage_item_id
        );
        rematches.sort_by(|a, b| {
            a.times_played
                .cmp(&b.times_played)
                .then_with(|| compare_suggestions(a, b))
        });
        rematches
    } else {
        Vec::new()
    };

    if filter.only_recommended {
        suggestions.retain(|s| s.is_recommended);
    }
    suggestions.truncate(filter.limit);
    Ok(suggestions)
}
