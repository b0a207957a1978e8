//! Ranking policies and standings rows.

use crate::models::ids::{InputId, RankingId, TeamId};
use serde::{Deserialize, Serialize};

/// Points awarded per result, shared by every stage item that references it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankingPolicy {
    pub id: RankingId,
    pub position: u32,
    pub win_points: f64,
    pub draw_points: f64,
    pub loss_points: f64,
    /// Add the raw score differential of every decisive match to the points.
    pub add_score_points: bool,
}

impl RankingPolicy {
    /// 1 point per win, 0.5 per draw, nothing for a loss.
    pub fn standard(id: RankingId, position: u32) -> Self {
        Self {
            id,
            position,
            win_points: 1.0,
            draw_points: 0.5,
            loss_points: 0.0,
            add_score_points: false,
        }
    }
}

/// One row of a stage item's standings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandingsEntry {
    pub position: u32,
    pub input_id: InputId,
    pub team_id: Option<TeamId>,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub points: f64,
    pub elo_score: f64,
}
