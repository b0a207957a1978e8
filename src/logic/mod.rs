//! Tournament business logic: generation, brackets, Swiss pairing, scheduling, rankings.

mod conflicts;
mod elimination;
mod generation;
mod import;
mod ranking;
mod results;
mod rounds;
mod scheduling;
mod setup;
mod stage_items;
mod swiss;

pub use conflicts::handle_conflicts;
pub use elimination::{
    update_inputs_in_complete_elimination_stage_item,
    update_inputs_in_subsequent_elimination_rounds, PropagationOutcome,
};
pub use generation::{build_matches_for_stage_item, rounds_for_team_count, validate_team_count};
pub use import::import_teams_csv;
pub use ranking::{
    elo_delta, ranked_input_ids, recalculate_ranking_for_stage_item, resolve_input_team,
    standings, K_FACTOR,
};
pub use results::{record_score, recalculate_ranking, reschedule_match, update_match, MatchUpdate};
pub use rounds::{
    activate_round, advance_swiss_round, create_match, create_round, delete_match, delete_round,
    upcoming_matches,
};
pub use scheduling::{
    handle_match_reschedule, matches_per_court, reorder_matches_for_court,
    schedule_all_unscheduled_matches, schedule_round, update_start_times_of_matches,
    validate_custom_timing, RescheduleRequest,
};
pub use setup::{
    activate_next_stage, create_ranking, delete_ranking, in_transaction, update_ranking,
    update_tournament_defaults, RankingBody, StageDirection,
};
pub use stage_items::{
    create_stage_item, delete_stage_item, generate_matches, schedule_matches, StageItemCreate,
};
pub use swiss::{get_upcoming_matches_for_swiss, MatchFilter, SuggestedMatch};
