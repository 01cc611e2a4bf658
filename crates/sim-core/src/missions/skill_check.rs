//! Skill Check Mission
//!
//! Every contestant attempts a puzzle on their own. Each attempt succeeds
//! with probability `intellect * (1 - difficulty)`; the pot receives the
//! success rate times the base reward.

use rand::Rng;
use sim_model::{MissionKind, MissionResult, Player};
use std::collections::BTreeMap;

use crate::config::MissionConfig;
use crate::random::roll;

use super::{payout, SUCCESS_THRESHOLD};

pub fn run<R: Rng + ?Sized>(players: &[&Player], config: &MissionConfig, rng: &mut R) -> MissionResult {
    let ease = 1.0 - config.difficulty;
    let mut scores = BTreeMap::new();
    let mut successes = 0usize;

    for player in players {
        let chance = player.stats.intellect * ease;
        let passed = roll(rng, chance);
        if passed {
            successes += 1;
        }
        scores.insert(player.id.clone(), if passed { 1.0 } else { 0.0 });
    }

    let rate = if players.is_empty() {
        0.0
    } else {
        successes as f32 / players.len() as f32
    };

    MissionResult {
        mission: MissionKind::SkillCheck,
        success: !players.is_empty() && rate >= SUCCESS_THRESHOLD,
        earnings: payout(config, rate),
        performance_scores: scores,
        narrative: format!(
            "{} of {} contestants cracked their puzzles.",
            successes,
            players.len()
        ),
        suspicion_changes: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use sim_model::fixtures::uniform_roster;
    use sim_model::{Personality, Stats};

    #[test]
    fn test_perfect_intellect_no_difficulty() {
        let players = uniform_roster(5, 2, Stats::uniform(1.0), Personality::default());
        let refs: Vec<&Player> = players.iter().collect();
        let mut rng = SmallRng::seed_from_u64(42);

        let result = run(&refs, &MissionConfig::new(1000.0, 0.0), &mut rng);

        assert!(result.success);
        assert_eq!(result.earnings, 1000.0);
        assert!(result.performance_scores.values().all(|&s| s == 1.0));
        assert!(result.narrative.starts_with("5 of 5"));
    }

    #[test]
    fn test_max_difficulty_always_fails() {
        let players = uniform_roster(4, 1, Stats::uniform(1.0), Personality::default());
        let refs: Vec<&Player> = players.iter().collect();
        let mut rng = SmallRng::seed_from_u64(9);

        let result = run(&refs, &MissionConfig::new(1000.0, 1.0), &mut rng);

        assert!(!result.success);
        assert_eq!(result.earnings, 0.0);
    }

    #[test]
    fn test_success_rate_tracks_intellect() {
        let players = uniform_roster(200, 0, Stats::uniform(0.5), Personality::default());
        let refs: Vec<&Player> = players.iter().collect();
        let mut rng = SmallRng::seed_from_u64(2024);

        let result = run(&refs, &MissionConfig::new(1000.0, 0.0), &mut rng);

        // Expect roughly half to pass
        assert!(result.earnings > 350.0 && result.earnings < 650.0);
    }
}
