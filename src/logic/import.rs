//! Team import from CSV (`name` column, optional `active` column).

use crate::logic::setup::in_transaction;
use crate::models::{TeamId, Tournament, TournamentError};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct TeamRow {
    name: String,
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

/// Create one team per CSV row. Either every row is imported or none is.
pub fn import_teams_csv<R: Read>(
    tournament: &mut Tournament,
    reader: R,
) -> Result<Vec<TeamId>, TournamentError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for (index, record) in csv_reader.deserialize::<TeamRow>().enumerate() {
        // Header is line 1.
        let row = index + 2;
        let team = record.map_err(|e| TournamentError::InvalidImport {
            row,
            reason: e.to_string(),
        })?;
        if team.name.is_empty() {
            return Err(TournamentError::InvalidImport {
                row,
                reason: "team name is empty".to_string(),
            });
        }
        rows.push(team);
    }

    let ids = in_transaction(tournament, |t| {
        Ok(rows
            .iter()
            .map(|row| {
                let id = t.add_team(row.name.as_str());
                if let Some(team) = t.teams.get_mut(&id) {
                    team.active = row.active;
                }
                id
            })
            .collect::<Vec<_>>())
    })?;
    log::info!("Imported {} teams into tournament {}", ids.len(), tournament.id);
    Ok(ids)
}
