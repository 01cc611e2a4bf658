//! Batch runner for the Traitors simulation
//!
//! Drives whole games with heuristic agents that act through the game
//! tools and take their reasoning from the advisor.

pub mod agent;
pub mod game;

pub use game::{play_game, DaySummary, GameSummary};
