//! Data structures for the tournament: arena ids, teams, stage items, matches, rankings.

mod error;
mod game;
mod ids;
mod ranking;
mod stage_item;
mod team;
mod tournament;

pub use error::TournamentError;
pub use game::{GameMatch, MatchSide, Side};
pub use ids::{
    CourtId, InputId, MatchId, RankingId, RoundId, StageId, StageItemId, TeamId, TournamentId,
};
pub use ranking::{RankingPolicy, StandingsEntry};
pub use stage_item::{Input, InputSource, InputStats, Round, Stage, StageItem, StageType, START_ELO};
pub use team::Team;
pub use tournament::{validate_defaults, Court, Tournament, MAX_TIMING_MINUTES};
