//! Day Phases
//!
//! The fixed daily cycle and the per-player view of game progress handed to
//! the advisory layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of a game day, in play order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Murder reveal as players arrive
    #[default]
    Breakfast,
    Mission,
    /// Free time between mission and vote
    Social,
    /// Banishment vote
    RoundTable,
    /// Traitors meet to choose a victim
    Turret,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Breakfast,
        Phase::Mission,
        Phase::Social,
        Phase::RoundTable,
        Phase::Turret,
    ];

    /// Returns the following phase and whether a new day begins.
    pub fn next(self) -> (Self, bool) {
        match self {
            Phase::Breakfast => (Phase::Mission, false),
            Phase::Mission => (Phase::Social, false),
            Phase::Social => (Phase::RoundTable, false),
            Phase::RoundTable => (Phase::Turret, false),
            Phase::Turret => (Phase::Breakfast, true),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Breakfast => "breakfast",
            Phase::Mission => "mission",
            Phase::Social => "social",
            Phase::RoundTable => "round_table",
            Phase::Turret => "turret",
        }
    }

    /// Parses corpus phase labels such as "Round Table", "round_table" or "turret".
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();
        match normalized.as_str() {
            "breakfast" => Some(Phase::Breakfast),
            "mission" | "missions" => Some(Phase::Mission),
            "social" | "socialphase" => Some(Phase::Social),
            "roundtable" | "banishment" | "voting" => Some(Phase::RoundTable),
            "turret" | "murder" => Some(Phase::Turret),
            _ => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of game progress from one player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameContext {
    pub day: u32,
    pub phase: Phase,
    pub alive_count: usize,
    /// Average suspicion other alive players hold about this player
    pub suspicion_on_self: f32,
}

impl Default for GameContext {
    fn default() -> Self {
        Self {
            day: 1,
            phase: Phase::Breakfast,
            alive_count: 0,
            suspicion_on_self: 0.5,
        }
    }
}

impl GameContext {
    /// Late game: few players left after many days.
    pub fn is_endgame(&self, min_day: u32, max_alive: usize) -> bool {
        self.day >= min_day && self.alive_count <= max_alive
    }
}
