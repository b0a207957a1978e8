//! Stages, stage items, their inputs and rounds.

use crate::models::ids::{InputId, RankingId, RoundId, StageId, StageItemId, TeamId};
use serde::{Deserialize, Serialize};

/// Starting skill score for every input.
pub const START_ELO: f64 = 1200.0;

/// Ordered phase of a tournament. Exactly one stage is active at a time.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub name: String,
    pub position: u32,
    pub is_active: bool,
}

/// Format of a stage item.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageType {
    RoundRobin,
    Swiss,
    SingleElimination,
}

impl StageType {
    /// Rounds are added one at a time after creation (Swiss) instead of all up front.
    pub fn supports_dynamic_number_of_rounds(self) -> bool {
        matches!(self, StageType::Swiss)
    }
}

/// A competition unit inside a stage (a group, a bracket).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StageItem {
    pub id: StageItemId,
    pub stage_id: StageId,
    pub name: String,
    pub team_count: u32,
    pub stage_type: StageType,
    pub ranking_id: RankingId,
}

/// Where an input's participant comes from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputSource {
    /// Bound directly to a team.
    Team { team_id: TeamId },
    /// Whoever finishes at `position` (1-based) in another stage item.
    Tentative {
        winner_from_stage_item_id: StageItemId,
        winner_position: u32,
    },
}

/// Standing of an input, recomputed from decisive matches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputStats {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub points: f64,
    pub elo_score: f64,
}

impl Default for InputStats {
    fn default() -> Self {
        Self {
            wins: 0,
            draws: 0,
            losses: 0,
            points: 0.0,
            elo_score: START_ELO,
        }
    }
}

impl InputStats {
    pub fn games_played(&self) -> u32 {
        self.wins + self.draws + self.losses
    }

    pub fn add_win(&mut self) {
        self.wins += 1;
    }

    pub fn add_draw(&mut self) {
        self.draws += 1;
    }

    pub fn add_loss(&mut self) {
        self.losses += 1;
    }
}

/// A participant slot inside a stage item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Input {
    pub id: InputId,
    pub stage_item_id: StageItemId,
    /// 1-based slot order.
    pub slot: u32,
    pub source: InputSource,
    pub stats: InputStats,
}

/// Ordered container of matches within a stage item.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub stage_item_id: StageItemId,
    pub name: String,
    pub is_draft: bool,
}
