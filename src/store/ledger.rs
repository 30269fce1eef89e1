use chrono::Utc;

use crate::game::question::{Difficulty, Operation};
use crate::store::json_store::JsonStore;
use crate::store::schema::{GameStats, StatsData, stats_key};

/// Persisted table of best-score records keyed by "<difficulty>-<operation>".
///
/// The table is loaded once at construction, before any caller can read it,
/// and the in-memory copy is the source of truth for the rest of the process
/// lifetime. Writes are best-effort: a failed persist keeps the in-memory
/// update, and because the whole table is written each time, the next
/// successful save is still complete.
pub struct StatsLedger {
    store: Option<JsonStore>,
    data: StatsData,
}

impl StatsLedger {
    pub fn open() -> Self {
        let store = match JsonStore::new() {
            Ok(store) => Some(store),
            Err(e) => {
                log::warn!("stats storage unavailable, running ephemeral: {e}");
                None
            }
        };
        Self::with_store(store)
    }

    pub fn with_store(store: Option<JsonStore>) -> Self {
        let data = store
            .as_ref()
            .map(JsonStore::load_stats)
            .unwrap_or_default();
        Self { store, data }
    }

    /// Whether updates reach durable storage or only live in memory.
    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    /// Stored record, or zero defaults when this pairing was never played.
    pub fn get(&self, difficulty: Difficulty, operation: Operation) -> GameStats {
        self.data
            .games
            .get(&stats_key(difficulty, operation))
            .copied()
            .unwrap_or_default()
    }

    /// Merge a finished session into the record and persist the full table.
    /// Call once per completed session; a second call for the same session
    /// double-counts games_played.
    pub fn update(
        &mut self,
        difficulty: Difficulty,
        operation: Operation,
        score: u32,
        max_streak: u32,
    ) {
        let entry = self
            .data
            .games
            .entry(stats_key(difficulty, operation))
            .or_default();
        entry.highest_score = entry.highest_score.max(score);
        entry.highest_streak = entry.highest_streak.max(max_streak);
        entry.games_played += 1;
        self.data.updated_at = Some(Utc::now());

        if let Some(ref store) = self.store {
            if let Err(e) = store.save_stats(&self.data) {
                log::warn!("failed to persist stats, keeping in-memory update: {e}");
            }
        }
    }
}
