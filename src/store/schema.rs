use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::question::{Difficulty, Operation};

const SCHEMA_VERSION: u32 = 1;

/// Best-score record for one (difficulty, operation) pairing. Field names are
/// camelCase on disk to keep the app's original stats layout readable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub highest_score: u32,
    pub highest_streak: u32,
    pub games_played: u32,
}

/// Ledger key, e.g. "hard-division".
pub fn stats_key(difficulty: Difficulty, operation: Operation) -> String {
    format!("{}-{}", difficulty.as_str(), operation.as_str())
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatsData {
    pub schema_version: u32,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub games: HashMap<String, GameStats>,
}

impl Default for StatsData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            updated_at: None,
            games: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_stats_serialize_camel_case() {
        let stats = GameStats {
            highest_score: 42,
            highest_streak: 7,
            games_played: 1,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(
            json,
            r#"{"highestScore":42,"highestStreak":7,"gamesPlayed":1}"#
        );
    }

    #[test]
    fn stats_data_tolerates_missing_fields() {
        let data: StatsData = serde_json::from_str(r#"{"schema_version":1}"#).unwrap();
        assert!(data.games.is_empty());
        assert!(data.updated_at.is_none());
    }

    #[test]
    fn stats_key_format() {
        assert_eq!(
            stats_key(Difficulty::Hard, Operation::Division),
            "hard-division"
        );
        assert_eq!(
            stats_key(Difficulty::Easy, Operation::Addition),
            "easy-addition"
        );
    }
}
