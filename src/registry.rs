//! In-memory tournament store with one lock per tournament.

use crate::models::{Tournament, TournamentError, TournamentId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
#[derive(Debug)]
pub struct TournamentEntry {
    pub tournament: Tournament,
    pub last_activity: Instant,
}

/// Tournaments by id. Requests against the same tournament are serialized by its entry lock;
/// different tournaments proceed independently.
#[derive(Clone, Default)]
pub struct TournamentRegistry {
    entries: Arc<RwLock<HashMap<TournamentId, Arc<Mutex<TournamentEntry>>>>>,
}

impl TournamentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, tournament: Tournament) -> TournamentId {
        let id = tournament.id;
        let entry = TournamentEntry {
            tournament,
            last_activity: Instant::now(),
        };
        self.entries
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(entry)));
        id
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Run `op` with exclusive access to one tournament, refreshing its last activity.
    pub async fn with_tournament<T>(
        &self,
        id: TournamentId,
        op: impl FnOnce(&mut Tournament) -> Result<T, TournamentError>,
    ) -> Result<T, TournamentError> {
        let entry = self
            .entries
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(TournamentError::TournamentNotFound(id))?;
        let mut entry = entry.lock().await;
        entry.last_activity = Instant::now();
        op(&mut entry.tournament)
    }

    /// Snapshot of a tournament.
    pub async fn get(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        self.with_tournament(id, |t| Ok(t.clone())).await
    }

    /// Drop tournaments not touched for `timeout`. Returns how many were removed.
    pub async fn remove_inactive(&self, timeout: Duration) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let mut stale = Vec::new();
        for (id, entry) in entries.iter() {
            // Busy entries are in use, so not stale.
            if let Ok(entry) = entry.try_lock() {
                if entry.last_activity.elapsed() >= timeout {
                    stale.push(*id);
                }
            }
        }
        for id in stale {
            entries.remove(&id);
        }
        let removed = before - entries.len();
        if removed > 0 {
            log::info!("Cleaned up {} inactive tournament(s)", removed);
        }
        removed
    }
}
