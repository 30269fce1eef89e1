use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::game::GameSettings;
use crate::game::question::{Difficulty, Operation};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default = "default_operation")]
    pub operation: String,
}

fn default_difficulty() -> String {
    "easy".to_string()
}
fn default_operation() -> String {
    "addition".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
            operation: default_operation(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mathdr")
            .join("config.toml")
    }

    /// Reset values a hand-edited or stale config file may carry.
    /// Call after deserialization.
    pub fn normalize(&mut self) {
        if Difficulty::parse(&self.difficulty).is_none() {
            self.difficulty = default_difficulty();
        }
        if Operation::parse(&self.operation).is_none() {
            self.operation = default_operation();
        }
    }

    /// Session configuration for a normalized config.
    pub fn settings(&self) -> GameSettings {
        GameSettings {
            difficulty: Difficulty::parse(&self.difficulty).unwrap_or(Difficulty::Easy),
            operation: Operation::parse(&self.operation).unwrap_or(Operation::Addition),
        }
    }
}
