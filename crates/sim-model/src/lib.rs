//! Shared data types for the traitors simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod corpus;
pub mod mission;
pub mod phase;
pub mod player;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

pub use corpus::{
    normalize_rating, CorpusSummary, DialogueTemplate, PhaseNorms, PlayerProfile,
    RelationshipPattern, Strategy, StrategyPlaybook,
};
pub use mission::{MissionKind, MissionResult, SuspicionChange};
pub use phase::{GameContext, Phase};
pub use player::{Death, DeathCause, Personality, Player, Role, Stats};
