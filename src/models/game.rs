//! Match (game) and its two sides, including scheduling fields.

use crate::models::ids::{CourtId, InputId, MatchId, RoundId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Which side of a match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    One,
    Two,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::One, Side::Two];
}

/// One participant slot of a match.
///
/// `input_id` is the participant actually playing. For elimination matches past the first
/// round it is filled in from `winner_from_match_id` as results arrive; for a Swiss pairing
/// not chosen yet both are `None`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchSide {
    pub input_id: Option<InputId>,
    pub winner_from_match_id: Option<MatchId>,
    pub score: Option<u32>,
    pub conflict: bool,
}

impl MatchSide {
    pub fn input(input_id: InputId) -> Self {
        Self {
            input_id: Some(input_id),
            ..Self::default()
        }
    }

    pub fn winner_of(match_id: MatchId) -> Self {
        Self {
            winner_from_match_id: Some(match_id),
            ..Self::default()
        }
    }
}

/// A single match between two sides.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub round_id: RoundId,
    pub side_1: MatchSide,
    pub side_2: MatchSide,
    pub court_id: Option<CourtId>,
    pub start_time: Option<DateTime<Utc>>,
    /// Total order within the court's queue (1-based).
    pub position_in_schedule: Option<u32>,
    /// Duration in minutes, fixed when the match was last scheduled.
    pub duration_minutes: i64,
    /// Margin in minutes, fixed when the match was last scheduled.
    pub margin_minutes: i64,
    pub custom_duration_minutes: Option<i64>,
    pub custom_margin_minutes: Option<i64>,
}

impl GameMatch {
    pub fn new(
        id: MatchId,
        round_id: RoundId,
        side_1: MatchSide,
        side_2: MatchSide,
        duration_minutes: i64,
        margin_minutes: i64,
    ) -> Self {
        Self {
            id,
            round_id,
            side_1,
            side_2,
            court_id: None,
            start_time: None,
            position_in_schedule: None,
            duration_minutes,
            margin_minutes,
            custom_duration_minutes: None,
            custom_margin_minutes: None,
        }
    }

    pub fn side(&self, side: Side) -> &MatchSide {
        match side {
            Side::One => &self.side_1,
            Side::Two => &self.side_2,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut MatchSide {
        match side {
            Side::One => &mut self.side_1,
            Side::Two => &mut self.side_2,
        }
    }

    /// Both scores present.
    pub fn has_scores(&self) -> bool {
        self.side_1.score.is_some() && self.side_2.score.is_some()
    }

    /// Side with the higher score; `None` while scores are missing or equal.
    pub fn winning_side(&self) -> Option<Side> {
        let (s1, s2) = (self.side_1.score?, self.side_2.score?);
        match s1.cmp(&s2) {
            std::cmp::Ordering::Greater => Some(Side::One),
            std::cmp::Ordering::Less => Some(Side::Two),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Input on the winning side, if any.
    pub fn winner_input(&self) -> Option<InputId> {
        self.winning_side().and_then(|s| self.side(s).input_id)
    }

    pub fn input_ids(&self) -> impl Iterator<Item = InputId> + '_ {
        [self.side_1.input_id, self.side_2.input_id].into_iter().flatten()
    }

    pub fn is_scheduled(&self) -> bool {
        self.court_id.is_some() && self.start_time.is_some()
    }

    /// Custom duration if set, else the duration fixed at scheduling time.
    pub fn effective_duration(&self) -> i64 {
        self.custom_duration_minutes.unwrap_or(self.duration_minutes)
    }

    /// Custom margin if set, else the margin fixed at scheduling time.
    pub fn effective_margin(&self) -> i64 {
        self.custom_margin_minutes.unwrap_or(self.margin_minutes)
    }

    /// `start + duration + margin`; `None` while unscheduled or past the representable range.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        let minutes = self
            .effective_duration()
            .checked_add(self.effective_margin())?;
        self.start_time?
            .checked_add_signed(Duration::try_minutes(minutes)?)
    }
}
