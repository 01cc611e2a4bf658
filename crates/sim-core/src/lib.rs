//! Traitors Simulation Engine
//!
//! Trust matrix, game state, the five missions, the game action tools and
//! the per-day ECS schedules that tie them together.

pub mod config;
pub mod error;
pub mod missions;
pub mod random;
pub mod session;
pub mod setup;
pub mod state;
pub mod systems;
pub mod tools;
pub mod trust;

pub use config::{default_config_toml, GameConfig, MissionConfig, SimConfig, SimulationConfig};
pub use error::{ConfigError, StateError, ToolError};
pub use missions::Mission;
pub use random::SimRng;
pub use session::GameSession;
pub use setup::{generate_roster, roster_from_profiles};
pub use state::{GameEvent, GameState, Winner};
pub use systems::{Banishment, DayReport};
pub use tools::{dispatch, MurderChoice, ToolContext, ToolOutcome, VoteRecord};
pub use trust::{TrustMatrix, NEUTRAL_SUSPICION};
