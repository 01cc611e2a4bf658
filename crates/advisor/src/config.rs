//! Configuration loading for the advisory layer.
//!
//! Strategy ranking, behavior modulation and dialogue settings, loaded
//! from TOML with defaults for anything left out.

use serde::{Deserialize, Serialize};
use sim_model::GameContext;
use std::path::Path;

use crate::error::ConfigError;

/// Complete advisor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvisorConfig {
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub behavior: BehaviorConfig,
    #[serde(default)]
    pub dialogue: DialogueConfig,
}

impl AdvisorConfig {
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
}

/// Strategy ranking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Recommendations returned when the caller does not say
    pub top_k: usize,
    /// Endgame boost applies from this day...
    pub endgame_day: u32,
    /// ...once no more than this many players are alive
    pub endgame_alive: usize,
    /// Suspicion on self at which defensive strategies get a boost
    pub self_suspicion_threshold: f32,
}

impl StrategyConfig {
    /// Late enough and few enough players left to count as the endgame.
    pub fn is_endgame(&self, context: &GameContext) -> bool {
        context.is_endgame(self.endgame_day, self.endgame_alive)
    }

    pub fn under_suspicion(&self, context: &GameContext) -> bool {
        context.suspicion_on_self >= self.self_suspicion_threshold
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            endgame_day: 8,
            endgame_alive: 6,
            self_suspicion_threshold: 0.6,
        }
    }
}

/// Behavior modulation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Hesitation chance is `neuroticism * stress * hesitation_factor`
    pub hesitation_factor: f32,
    pub contrarian_probability: f32,
    /// Only players at or below this agreeableness turn contrarian
    pub contrarian_agreeableness_max: f32,
    /// Neuroticism at which a stress tip is added to guidance
    pub stress_tip_neuroticism: f32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            hesitation_factor: 0.3,
            contrarian_probability: 0.2,
            contrarian_agreeableness_max: 0.3,
            stress_tip_neuroticism: 0.7,
        }
    }
}

/// Dialogue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Intensity of the strongest emotion relative to the weight leader
    pub intensity_scale: f32,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self { intensity_scale: 0.8 }
    }
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Advisor Configuration

[strategy]
top_k = 3
endgame_day = 8
endgame_alive = 6
self_suspicion_threshold = 0.6

[behavior]
hesitation_factor = 0.3
contrarian_probability = 0.2
contrarian_agreeableness_max = 0.3
stress_tip_neuroticism = 0.7

[dialogue]
intensity_scale = 0.8
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_toml_matches_defaults() {
        let parsed = AdvisorConfig::from_str(&default_config_toml()).unwrap();
        let defaults = AdvisorConfig::default();

        assert_eq!(parsed.strategy.top_k, defaults.strategy.top_k);
        assert_eq!(parsed.strategy.endgame_day, defaults.strategy.endgame_day);
        assert_eq!(parsed.behavior.hesitation_factor, defaults.behavior.hesitation_factor);
        assert_eq!(parsed.dialogue.intensity_scale, defaults.dialogue.intensity_scale);
    }

    #[test]
    fn test_partial_config() {
        let config = AdvisorConfig::from_str("[strategy]\ntop_k = 5\n").unwrap();
        assert_eq!(config.strategy.top_k, 5);
        assert_eq!(config.strategy.endgame_alive, 6);
        assert_eq!(config.behavior.contrarian_probability, 0.2);
    }

    #[test]
    fn test_roundtrip() {
        let config = AdvisorConfig::default();
        let text = config.to_toml().unwrap();
        let parsed = AdvisorConfig::from_str(&text).unwrap();
        assert_eq!(parsed.strategy.self_suspicion_threshold, 0.6);
    }

    #[test]
    fn test_missing_file() {
        let err = AdvisorConfig::from_file(Path::new("/nonexistent/advisor.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
