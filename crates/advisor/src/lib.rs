//! Advisor - Advisory layer for the Traitors simulation
//!
//! Reads the reference corpus once and turns it into guidance for the
//! agents playing the game:
//!
//! - [`TrainingData`]: the loaded corpus and its role and phase indices
//! - [`BehaviorModulator`]: phase conduct, trust suggestions, decision noise
//! - [`StrategyAdvisor`]: ranked strategies and voting/murder guidance
//! - [`DialogueGenerator`]: emotion inference and phrase selection
//!
//! None of these mutate game state. They share the corpus through an
//! `Arc`, so one load serves every concurrent game.

pub mod behavior;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod keywords;
pub mod strategy;
pub mod training;

use std::path::Path;
use std::sync::Arc;

pub use behavior::{BehaviorGuidance, BehaviorModulator, ObservedEvent, TrustUpdate};
pub use config::{default_config_toml, AdvisorConfig, BehaviorConfig, DialogueConfig, StrategyConfig};
pub use dialogue::{DialogueGenerator, DialogueLine, EmotionalState};
pub use error::{ConfigError, TrainingDataError};
pub use strategy::{StrategyAdvisor, StrategyRecommendation};
pub use training::TrainingData;

/// All advisory components over one shared corpus.
#[derive(Debug, Clone)]
pub struct Advisor {
    pub training: Arc<TrainingData>,
    pub behavior: BehaviorModulator,
    pub strategy: StrategyAdvisor,
    pub dialogue: DialogueGenerator,
}

impl Advisor {
    pub fn new(training: Arc<TrainingData>, config: AdvisorConfig) -> Self {
        Self {
            behavior: BehaviorModulator::new(Arc::clone(&training), config.behavior, config.strategy.clone()),
            strategy: StrategyAdvisor::new(Arc::clone(&training), config.strategy),
            dialogue: DialogueGenerator::new(Arc::clone(&training), config.dialogue),
            training,
        }
    }

    /// Loads the corpus from `dir`, degrading missing files to defaults.
    pub fn load(dir: &Path, config: AdvisorConfig) -> Self {
        Self::new(Arc::new(TrainingData::load(dir)), config)
    }
}
