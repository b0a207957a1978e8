//! Tournament organizer: library with models, scheduling/bracket/ranking logic and the
//! in-memory tournament registry used by the web server.

pub mod config;
pub mod logic;
pub mod models;
pub mod registry;

pub use config::{ConfigError, ServerConfig};
pub use logic::{
    activate_next_stage, activate_round, advance_swiss_round, create_match, create_ranking,
    create_round, create_stage_item, delete_match, delete_ranking, delete_round,
    delete_stage_item, generate_matches, import_teams_csv, record_score, recalculate_ranking,
    reschedule_match, schedule_matches, standings, upcoming_matches, update_match,
    update_ranking, update_tournament_defaults, MatchFilter, MatchUpdate, RankingBody,
    RescheduleRequest, StageDirection, StageItemCreate, SuggestedMatch,
};
pub use models::{
    Court, CourtId, GameMatch, Input, InputId, InputSource, InputStats, MatchId, MatchSide,
    RankingId, RankingPolicy, Round, RoundId, Side, Stage, StageId, StageItem, StageItemId,
    StageType, StandingsEntry, Team, TeamId, Tournament, TournamentError, TournamentId,
};
pub use registry::{TournamentEntry, TournamentRegistry};
