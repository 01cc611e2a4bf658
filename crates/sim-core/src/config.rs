//! Configuration loading for the simulation engine.
//!
//! All game tuning is loaded from a TOML file. Missing sections and keys
//! fall back to defaults.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Complete engine configuration.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConfig {
    /// Roster and win-condition settings
    #[serde(default)]
    pub game: GameConfig,
    /// Mission reward and difficulty
    #[serde(default)]
    pub mission: MissionConfig,
    /// Run settings
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl SimConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Returns a copy with every value forced into its legal range.
    pub fn validated(mut self) -> Self {
        self.game.num_players = self.game.num_players.max(2);
        self.game.num_traitors = self.game.num_traitors.clamp(1, self.game.num_players - 1);
        self.game.max_days = self.game.max_days.max(1);
        self.mission = self.mission.validated();
        self
    }
}

/// Roster size and win conditions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub num_players: usize,
    pub num_traitors: usize,
    /// Traitors win if they survive this many days
    pub max_days: u32,
    /// Game ends once this many players remain
    pub final_players: usize,
    /// Lets a lone surviving Traitor recruit once
    pub recruitment_enabled: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_players: 10,
            num_traitors: 3,
            max_days: 12,
            final_players: 4,
            recruitment_enabled: true,
        }
    }
}

/// Mission parameters shared by all five mission types.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    /// Maximum prize pot contribution of one mission
    #[serde(alias = "mission_base_reward")]
    pub base_reward: f32,
    /// 0.0 (trivial) to 1.0 (hardest)
    #[serde(alias = "mission_difficulty")]
    pub difficulty: f32,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            base_reward: 1000.0,
            difficulty: 0.5,
        }
    }
}

impl MissionConfig {
    pub fn new(base_reward: f32, difficulty: f32) -> Self {
        Self {
            base_reward,
            difficulty,
        }
        .validated()
    }

    pub fn validated(self) -> Self {
        let base_reward = if self.base_reward.is_finite() {
            self.base_reward.max(0.0)
        } else {
            0.0
        };
        let difficulty = if self.difficulty.is_finite() {
            self.difficulty.clamp(0.0, 1.0)
        } else {
            0.5
        };
        Self {
            base_reward,
            difficulty,
        }
    }
}

/// Run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Traitors Simulation Configuration

[game]
num_players = 10
num_traitors = 3
max_days = 12
final_players = 4
recruitment_enabled = true

[mission]
base_reward = 1000.0
difficulty = 0.5

[simulation]
seed = 42
"#
    .to_string()
}
