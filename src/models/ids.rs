//! Stable integer ids for every entity stored in a tournament arena.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a tournament (registry key).
pub type TournamentId = Uuid;

macro_rules! arena_id {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(pub u32);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<u32> for $name {
                fn from(raw: u32) -> Self {
                    Self(raw)
                }
            }

            impl From<$name> for u32 {
                fn from(id: $name) -> Self {
                    id.0
                }
            }
        )*
    };
}

arena_id! {
    /// A court (lane of the schedule).
    CourtId,
    /// A competitor.
    TeamId,
    /// An ordered phase of the tournament.
    StageId,
    /// A group or bracket inside a stage.
    StageItemId,
    /// A participant slot inside a stage item.
    InputId,
    RoundId,
    MatchId,
    /// A win/draw/loss points policy.
    RankingId,
}
