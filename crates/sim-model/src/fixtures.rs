//! Sample data fixtures for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! ```ignore
//! // [dev-dependencies]
//! // sim-model = { workspace = true, features = ["test-fixtures"] }
//!
//! let players = sim_model::fixtures::sample_roster();
//! ```

use crate::{Personality, Player, Role, Stats};

/// Six players, two of them Traitors (Bea `p1` and Dee `p3`).
pub fn sample_roster() -> Vec<Player> {
    let json = include_str!("../tests/fixtures/sample_roster.json");
    serde_json::from_str(json).expect("Failed to parse sample_roster.json")
}

/// `count` identical players with ids `p0..`; the first `traitors` are Traitors.
pub fn uniform_roster(count: usize, traitors: usize, stats: Stats, personality: Personality) -> Vec<Player> {
    (0..count)
        .map(|i| {
            let role = if i < traitors { Role::Traitor } else { Role::Faithful };
            Player::new(format!("p{}", i), format!("Player {}", i), role)
                .with_stats(stats)
                .with_personality(personality)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_roster_load() {
        let players = sample_roster();
        assert_eq!(players.len(), 6);
        assert_eq!(players.iter().filter(|p| p.is_traitor()).count(), 2);
        assert!(players.iter().all(|p| p.alive));
    }

    #[test]
    fn test_uniform_roster() {
        let players = uniform_roster(5, 2, Stats::uniform(1.0), Personality::default());
        assert_eq!(players.len(), 5);
        assert!(players[0].is_traitor() && players[1].is_traitor());
        assert!(!players[2].is_traitor());
        assert_eq!(players[4].id, "p4");
    }
}
