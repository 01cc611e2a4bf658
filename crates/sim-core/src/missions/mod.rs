//! Mission Engine
//!
//! Five mission formats sharing one shape: read the alive roster and the
//! trust matrix, score each player in [0, 1], pay out
//! `base_reward * average_performance` and write any suspicion the mission
//! stirred up back into the matrix.
//!
//! - Performance scores get a uniform +/-20% multiplicative jitter, then a clamp
//! - Earnings are never negative and never exceed `base_reward`
//! - An empty roster yields zero earnings and `success = false`

use rand::Rng;
use sim_model::{MissionKind, MissionResult, Player, SuspicionChange};
use std::collections::BTreeMap;

use crate::config::MissionConfig;
use crate::state::GameState;
use crate::trust::TrustMatrix;

pub mod cabin_creepies;
pub mod crossbow;
pub mod funeral;
pub mod laser_heist;
pub mod skill_check;

/// Relative spread of performance jitter (+/- 20%)
pub const JITTER: f32 = 0.2;

/// Average performance a mission needs to count as a success
pub const SUCCESS_THRESHOLD: f32 = 0.5;

/// A configured mission ready to run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mission {
    kind: MissionKind,
    config: MissionConfig,
}

impl Mission {
    pub fn new(kind: MissionKind, config: MissionConfig) -> Self {
        Self {
            kind,
            config: config.validated(),
        }
    }

    /// The mission scheduled for `day`.
    pub fn for_day(day: u32, config: MissionConfig) -> Self {
        Self::new(MissionKind::for_day(day), config)
    }

    pub fn kind(&self) -> MissionKind {
        self.kind
    }

    pub fn config(&self) -> &MissionConfig {
        &self.config
    }

    pub fn description(&self) -> String {
        let blurb = match self.kind {
            MissionKind::SkillCheck => {
                "Each contestant attempts a puzzle alone. Sharp minds bank money for the pot."
            }
            MissionKind::Funeral => {
                "A mock funeral tests memory of the fallen and the ability to spot a lie."
            }
            MissionKind::LaserHeist => {
                "The group threads a laser grid to reach the vault. A careless (or deliberate) slip costs everyone."
            }
            MissionKind::CabinCreepies => {
                "A night in a haunted cabin. Keep your nerve, but not so well that you look like you have nothing to fear."
            }
            MissionKind::Crossbow => {
                "Every contestant fires at a portrait of another player. Accuracy earns money; the choice of target reveals alliances."
            }
        };
        format!(
            "{} (reward up to {:.0}, difficulty {:.0}%)",
            blurb,
            self.config.base_reward,
            self.config.difficulty * 100.0
        )
    }

    /// Runs the mission against the alive players of `state`.
    pub fn execute<R: Rng + ?Sized>(
        &self,
        state: &GameState,
        trust: &mut TrustMatrix,
        rng: &mut R,
    ) -> MissionResult {
        let players = state.alive_players();
        if players.is_empty() {
            tracing::warn!(mission = %self.kind, "mission skipped: no players alive");
            return MissionResult::empty(self.kind, "Nobody was left to take part.");
        }

        let result = match self.kind {
            MissionKind::SkillCheck => skill_check::run(&players, &self.config, rng),
            MissionKind::Funeral => funeral::run(&players, &self.config, rng),
            MissionKind::LaserHeist => laser_heist::run(&players, trust, &self.config, rng),
            MissionKind::CabinCreepies => cabin_creepies::run(&players, trust, &self.config, rng),
            MissionKind::Crossbow => crossbow::run(&players, trust, &self.config, rng),
        };

        tracing::debug!(
            mission = %self.kind,
            earnings = result.earnings,
            success = result.success,
            suspicion_changes = result.suspicion_changes.len(),
            "mission resolved"
        );
        result
    }
}

/// Scales a base score down as difficulty rises (half strength at difficulty 1.0).
pub(crate) fn difficulty_factor(config: &MissionConfig) -> f32 {
    1.0 - config.difficulty * 0.5
}

/// Applies uniform multiplicative jitter and clamps to [0, 1].
pub(crate) fn jitter<R: Rng + ?Sized>(rng: &mut R, value: f32) -> f32 {
    let noise = 1.0 + rng.gen_range(-JITTER..=JITTER);
    clamp_unit(value * noise)
}

pub(crate) fn clamp_unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub(crate) fn average(scores: &BTreeMap<String, f32>) -> f32 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.values().sum::<f32>() / scores.len() as f32
}

/// `base_reward * fraction`, bounded to [0, base_reward].
pub(crate) fn payout(config: &MissionConfig, fraction: f32) -> f32 {
    config.base_reward * clamp_unit(fraction)
}

/// Raises `observer`'s suspicion of `subject` and records the change.
pub(crate) fn raise_suspicion(
    trust: &mut TrustMatrix,
    changes: &mut Vec<SuspicionChange>,
    observer: &Player,
    subject: &Player,
    delta: f32,
    reason: &str,
) {
    let new_score = trust.update(&observer.id, &subject.id, delta);
    changes.push(SuspicionChange {
        observer: observer.id.clone(),
        subject: subject.id.clone(),
        delta,
        new_score,
        reason: reason.to_string(),
    });
}

/// Builds the result value shared by the averaged missions.
pub(crate) fn averaged_result(
    kind: MissionKind,
    config: &MissionConfig,
    scores: BTreeMap<String, f32>,
    penalty: f32,
    narrative: String,
    suspicion_changes: Vec<SuspicionChange>,
) -> MissionResult {
    let avg = average(&scores);
    MissionResult {
        mission: kind,
        success: avg >= SUCCESS_THRESHOLD,
        earnings: payout(config, avg * (1.0 - penalty).max(0.0)),
        performance_scores: scores,
        narrative,
        suspicion_changes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use sim_model::fixtures::sample_roster;

    #[test]
    fn test_jitter_stays_in_unit_range() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..500 {
            let v = jitter(&mut rng, 0.95);
            assert!((0.0..=1.0).contains(&v));
        }
        assert_eq!(jitter(&mut rng, f32::NAN), 0.0);
    }

    #[test]
    fn test_empty_roster_returns_zero() {
        let mut state = GameState::new(sample_roster());
        for player in state.players.iter_mut() {
            player.alive = false;
        }
        let mut trust = TrustMatrix::new();
        let mut rng = SmallRng::seed_from_u64(1);

        for kind in MissionKind::ALL {
            let result = Mission::new(kind, MissionConfig::default()).execute(&state, &mut trust, &mut rng);
            assert!(!result.success);
            assert_eq!(result.earnings, 0.0);
            assert!(result.performance_scores.is_empty());
        }
    }

    #[test]
    fn test_description_mentions_reward() {
        let mission = Mission::new(MissionKind::Crossbow, MissionConfig::new(500.0, 0.25));
        let text = mission.description();
        assert!(text.contains("500"));
        assert!(text.contains("25%"));
    }

    #[test]
    fn test_payout_bounds() {
        let config = MissionConfig::new(1000.0, 0.0);
        assert_eq!(payout(&config, 1.4), 1000.0);
        assert_eq!(payout(&config, -0.3), 0.0);
        assert_eq!(payout(&config, 0.5), 500.0);
    }
}
