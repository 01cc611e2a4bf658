//! Funeral Mission
//!
//! A memory and lie-detection test. Performance blends memory
//! (`intellect * openness`) with lie detection
//! (`social_influence * openness`). Nervous Traitors sometimes trip over
//! their own story.

use rand::Rng;
use sim_model::{MissionKind, MissionResult, Player};
use std::collections::BTreeMap;

use crate::config::MissionConfig;
use crate::random::roll;

use super::{averaged_result, difficulty_factor, jitter};

/// Funeral tuning constants
pub mod constants {
    /// Share of the score from memory
    pub const MEMORY_WEIGHT: f32 = 0.6;
    /// Share of the score from lie detection
    pub const LIE_DETECTION_WEIGHT: f32 = 0.4;
    /// Traitors above this neuroticism may slip up
    pub const SLIP_NEUROTICISM: f32 = 0.6;
    /// Slip chance per point of neuroticism
    pub const SLIP_CHANCE_SCALE: f32 = 0.5;
    /// Score multiplier after a slip
    pub const SLIP_PENALTY: f32 = 0.5;
}

use constants::*;

pub fn run<R: Rng + ?Sized>(players: &[&Player], config: &MissionConfig, rng: &mut R) -> MissionResult {
    let factor = difficulty_factor(config);
    let mut scores = BTreeMap::new();
    let mut slips = 0usize;

    for player in players {
        let openness = player.personality.openness;
        let memory = player.stats.intellect * openness;
        let lie_detection = player.stats.social_influence * openness;
        let mut base = (MEMORY_WEIGHT * memory + LIE_DETECTION_WEIGHT * lie_detection) * factor;

        let neuroticism = player.personality.neuroticism;
        if player.is_traitor()
            && neuroticism > SLIP_NEUROTICISM
            && roll(rng, neuroticism * SLIP_CHANCE_SCALE)
        {
            base *= SLIP_PENALTY;
            slips += 1;
            tracing::debug!(player = %player.id, "nervous slip at the funeral");
        }

        scores.insert(player.id.clone(), jitter(rng, base));
    }

    let narrative = if slips > 0 {
        format!(
            "The group pieced together the eulogies, though {} contestant{} fumbled under the pressure.",
            slips,
            if slips == 1 { "" } else { "s" }
        )
    } else {
        "The group pieced together the eulogies without a visible slip.".to_string()
    };

    averaged_result(MissionKind::Funeral, config, scores, 0.0, narrative, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use sim_model::fixtures::uniform_roster;
    use sim_model::{Personality, Role, Stats};

    #[test]
    fn test_scores_in_unit_range() {
        let players = uniform_roster(8, 2, Stats::uniform(1.0), Personality::uniform(1.0));
        let refs: Vec<&Player> = players.iter().collect();
        let mut rng = SmallRng::seed_from_u64(11);

        let result = run(&refs, &MissionConfig::new(1000.0, 0.0), &mut rng);

        assert!(result.performance_scores.values().all(|s| (0.0..=1.0).contains(s)));
        assert!(result.earnings <= 1000.0);
    }

    #[test]
    fn test_closed_minds_score_zero() {
        let players = uniform_roster(4, 1, Stats::uniform(1.0), Personality::uniform(0.0));
        let refs: Vec<&Player> = players.iter().collect();
        let mut rng = SmallRng::seed_from_u64(5);

        let result = run(&refs, &MissionConfig::default(), &mut rng);

        assert_eq!(result.earnings, 0.0);
        assert!(!result.success);
    }

    #[test]
    fn test_nervous_traitors_underperform_on_average() {
        let nervous = Personality::new(0.8, 0.5, 0.5, 0.5, 1.0);
        let mut players = uniform_roster(40, 0, Stats::uniform(0.8), nervous);
        for player in players.iter_mut().take(20) {
            player.role = Role::Traitor;
        }
        let refs: Vec<&Player> = players.iter().collect();
        let mut rng = SmallRng::seed_from_u64(77);

        let result = run(&refs, &MissionConfig::new(1000.0, 0.0), &mut rng);

        let mean = |traitor: bool| {
            let values: Vec<f32> = players
                .iter()
                .filter(|p| p.is_traitor() == traitor)
                .map(|p| result.performance_scores[&p.id])
                .collect();
            values.iter().sum::<f32>() / values.len() as f32
        };
        assert!(mean(true) < mean(false));
    }
}
