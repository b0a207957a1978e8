//! Initial match generation for a newly created stage item, per format.

use crate::models::{
    GameMatch, InputId, MatchId, MatchSide, Round, RoundId, StageItemId, StageType, Tournament,
    TournamentError,
};

/// Number of elimination rounds needed for `team_count` teams.
///
/// 0 teams need 0 rounds; otherwise only 2, 4, 8 and 16 teams are supported.
pub fn rounds_for_team_count(team_count: u32) -> Result<u32, TournamentError> {
    if team_count == 0 {
        return Ok(0);
    }
    match team_count {
        2 => Ok(1),
        4 => Ok(2),
        8 => Ok(3),
        16 => Ok(4),
        n => Err(TournamentError::InvalidConfiguration(format!(
            "single elimination supports 2, 4, 8 or 16 teams, got {n}"
        ))),
    }
}

/// Check the team count against the stage item's format.
pub fn validate_team_count(stage_type: StageType, team_count: u32) -> Result<(), TournamentError> {
    if team_count < 2 || team_count % 2 != 0 {
        return Err(TournamentError::InvalidConfiguration(format!(
            "team count must be even and at least 2, got {team_count}"
        )));
    }
    if stage_type == StageType::SingleElimination {
        rounds_for_team_count(team_count)?;
    }
    Ok(())
}

/// Append a round to a stage item, named after its position.
pub(crate) fn insert_round(
    tournament: &mut Tournament,
    stage_item_id: StageItemId,
    is_draft: bool,
) -> RoundId {
    let number = tournament.rounds_of(stage_item_id).len() + 1;
    let id = RoundId(tournament.next_id());
    tournament.rounds.insert(
        id,
        Round {
            id,
            stage_item_id,
            name: format!("Round {number:02}"),
            is_draft,
        },
    );
    id
}

/// Insert an unscheduled match using the tournament's current default duration and margin.
pub(crate) fn insert_match(
    tournament: &mut Tournament,
    round_id: RoundId,
    side_1: MatchSide,
    side_2: MatchSide,
) -> MatchId {
    let id = MatchId(tournament.next_id());
    let game_match = GameMatch::new(
        id,
        round_id,
        side_1,
        side_2,
        tournament.duration_minutes,
        tournament.margin_minutes,
    );
    tournament.matches.insert(id, game_match);
    id
}

/// Create the rounds and matches of a stage item according to its format.
///
/// - Round robin: one round with a match for every unordered pair of inputs.
/// - Single elimination: log2(team_count) rounds; round 1 pairs consecutive inputs, later
///   rounds reference the winners of consecutive matches of the previous round.
/// - Swiss: nothing; rounds are added through the pairing suggester.
///
/// Returns the ids of the created matches.
pub fn build_matches_for_stage_item(
    tournament: &mut Tournament,
    stage_item_id: StageItemId,
) -> Result<Vec<MatchId>, TournamentError> {
    let stage_item = tournament.stage_item(stage_item_id)?.clone();
    validate_team_count(stage_item.stage_type, stage_item.team_count)?;

    let input_ids: Vec<InputId> = tournament
        .inputs_of(stage_item_id)
        .iter()
        .map(|i| i.id)
        .collect();
    if input_ids.len() != stage_item.team_count as usize {
        return Err(TournamentError::InvalidConfiguration(format!(
            "stage item {} declares {} teams but has {} inputs",
            stage_item_id,
            stage_item.team_count,
            input_ids.len()
        )));
    }
    if !tournament.rounds_of(stage_item_id).is_empty() {
        return Err(TournamentError::InvalidState(format!(
            "stage item {stage_item_id} already has rounds"
        )));
    }

    let created = match stage_item.stage_type {
        StageType::RoundRobin => build_round_robin(tournament, stage_item_id, &input_ids),
        StageType::SingleElimination => {
            build_single_elimination(tournament, stage_item_id, &input_ids)?
        }
        StageType::Swiss => Vec::new(),
    };
    log::info!(
        "Generated {} matches for stage item {} ({:?})",
        created.len(),
        stage_item_id,
        stage_item.stage_type
    );
    Ok(created)
}

fn build_round_robin(
    tournament: &mut Tournament,
    stage_item_id: StageItemId,
    input_ids: &[InputId],
) -> Vec<MatchId> {
    let round_id = insert_round(tournament, stage_item_id, false);
    let mut created = Vec::new();
    for (i, &first) in input_ids.iter().enumerate() {
        for &second in &input_ids[i + 1..] {
            created.push(insert_match(
                tournament,
                round_id,
                MatchSide::input(first),
                MatchSide::input(second),
            ));
        }
    }
    created
}

fn build_single_elimination(
    tournament: &mut Tournament,
    stage_item_id: StageItemId,
    input_ids: &[InputId],
) -> Result<Vec<MatchId>, TournamentError> {
    let round_count = rounds_for_team_count(input_ids.len() as u32)?;
    let mut created = Vec::new();
    let mut prev_matches: Vec<MatchId> = Vec::new();

    for round_index in 0..round_count {
        let round_id = insert_round(tournament, stage_item_id, false);
        let sides: Vec<(MatchSide, MatchSide)> = if round_index == 0 {
            input_ids
                .chunks_exact(2)
                .map(|pair| (MatchSide::input(pair[0]), MatchSide::input(pair[1])))
                .collect()
        } else {
            prev_matches
                .chunks_exact(2)
                .map(|pair| (MatchSide::winner_of(pair[0]), MatchSide::winner_of(pair[1])))
                .collect()
        };
        prev_matches = sides
            .into_iter()
            .map(|(side_1, side_2)| insert_match(tournament, round_id, side_1, side_2))
            .collect();
        created.extend(prev_matches.iter().copied());
    }
    Ok(created)
}
