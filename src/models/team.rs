//! Team (competitor) data structure.

use crate::models::ids::TeamId;
use serde::{Deserialize, Serialize};

/// A competitor in the tournament. Stage items reference teams through their inputs.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Inactive teams stay in the tournament but are not expected to be seeded into new stage items.
    pub active: bool,
}

impl Team {
    /// Create an active team with the given name.
    pub fn new(id: TeamId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            active: true,
        }
    }
}
