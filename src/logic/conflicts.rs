//! Conflict detection: flag match sides whose participant plays two overlapping matches.

use crate::logic::ranking::resolve_input_team;
use crate::models::{InputId, MatchId, Side, TeamId, Tournament};
use chrono::{DateTime, Utc};

/// Identity used to decide whether two match sides are the same participant.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Participant {
    Team(TeamId),
    Input(InputId),
}

fn participant(tournament: &Tournament, input_id: Option<InputId>) -> Option<Participant> {
    let input_id = input_id?;
    Some(match resolve_input_team(tournament, input_id) {
        Some(team_id) => Participant::Team(team_id),
        None => Participant::Input(input_id),
    })
}

struct Window {
    match_id: MatchId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    sides: [Option<Participant>; 2],
}

/// Recompute every conflict flag in the tournament from scratch.
///
/// Two scheduled matches conflict when their `[start, end)` windows overlap and they share a
/// participant; the sharing side of both matches is flagged. Returns the number of flagged sides.
pub fn handle_conflicts(tournament: &mut Tournament) -> usize {
    let windows: Vec<Window> = tournament
        .matches
        .values()
        .filter(|m| m.court_id.is_some())
        .filter_map(|m| {
            Some(Window {
                match_id: m.id,
                start: m.start_time?,
                end: m.end_time()?,
                sides: [
                    participant(tournament, m.side_1.input_id),
                    participant(tournament, m.side_2.input_id),
                ],
            })
        })
        .collect();

    let mut flagged: Vec<(MatchId, Side)> = Vec::new();
    for (i, a) in windows.iter().enumerate() {
        for b in &windows[i + 1..] {
            if !(a.start < b.end && b.start < a.end) {
                continue;
            }
            for (a_side, a_participant) in Side::BOTH.into_iter().zip(a.sides) {
                for (b_side, b_participant) in Side::BOTH.into_iter().zip(b.sides) {
                    if a_participant.is_some() && a_participant == b_participant {
                        flagged.push((a.match_id, a_side));
                        flagged.push((b.match_id, b_side));
                    }
                }
            }
        }
    }

    for game_match in tournament.matches.values_mut() {
        game_match.side_1.conflict = false;
        game_match.side_2.conflict = false;
    }
    for &(match_id, side) in &flagged {
        if let Some(game_match) = tournament.matches.get_mut(&match_id) {
            game_match.side_mut(side).conflict = true;
        }
    }

    let count = tournament
        .matches
        .values()
        .map(|m| usize::from(m.side_1.conflict) + usize::from(m.side_2.conflict))
        .sum();
    if count > 0 {
        log::info!("Detected {} conflicting match sides", count);
    }
    count
}
