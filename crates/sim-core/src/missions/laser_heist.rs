//! Laser Heist Mission
//!
//! A dexterity mission Traitors can quietly sabotage. Saboteurs post a low
//! score, the pot loses 5% per sabotage attempt, and each saboteur may be
//! caught by at most one observant teammate.

use rand::Rng;
use sim_model::{MissionKind, MissionResult, Player};
use std::collections::BTreeMap;

use crate::config::MissionConfig;
use crate::random::roll;
use crate::trust::TrustMatrix;

use super::{averaged_result, difficulty_factor, jitter, raise_suspicion};

/// Laser heist tuning constants
pub mod constants {
    /// Weight of conscientiousness within the dexterity term
    pub const CARE_WEIGHT: f32 = 0.4;
    /// Bonus per point of intellect
    pub const INTELLECT_BONUS: f32 = 0.1;
    /// Base sabotage chance for a Traitor
    pub const SABOTAGE_BASE: f32 = 0.3;
    /// Added sabotage chance per point of neuroticism
    pub const SABOTAGE_NEUROTICISM: f32 = 0.3;
    /// Removed sabotage chance per point of agreeableness
    pub const SABOTAGE_AGREEABLENESS: f32 = 0.3;
    /// Upper bound (exclusive) of a sabotaged score
    pub const SABOTAGE_MAX_SCORE: f32 = 0.3;
    /// Earnings lost per sabotage attempt
    pub const SABOTAGE_PENALTY: f32 = 0.05;
    /// Detection chance cap
    pub const MAX_DETECTION: f32 = 0.5;
    /// Suspicion added when a saboteur is caught
    pub const DETECTION_SUSPICION: f32 = 0.15;
}

use constants::*;

pub fn sabotage_chance(player: &Player) -> f32 {
    let p = &player.personality;
    (SABOTAGE_BASE + p.neuroticism * SABOTAGE_NEUROTICISM - p.agreeableness * SABOTAGE_AGREEABLENESS)
        .clamp(0.0, 1.0)
}

pub fn detection_chance(observer: &Player, saboteur: &Player) -> f32 {
    let raw = observer.personality.conscientiousness * 0.5 + observer.stats.intellect * 0.3
        - saboteur.personality.extraversion * 0.2;
    raw.clamp(0.0, MAX_DETECTION)
}

pub fn run<R: Rng + ?Sized>(
    players: &[&Player],
    trust: &mut TrustMatrix,
    config: &MissionConfig,
    rng: &mut R,
) -> MissionResult {
    let factor = difficulty_factor(config);
    let mut scores = BTreeMap::new();
    let mut saboteurs: Vec<&Player> = Vec::new();

    for &player in players {
        let sabotaging = player.is_traitor() && roll(rng, sabotage_chance(player));
        let score = if sabotaging {
            saboteurs.push(player);
            rng.gen_range(0.0..SABOTAGE_MAX_SCORE)
        } else {
            let dexterity = player.stats.dexterity
                * ((1.0 - CARE_WEIGHT) + CARE_WEIGHT * player.personality.conscientiousness);
            let base = (dexterity + player.stats.intellect * INTELLECT_BONUS) * factor;
            jitter(rng, base)
        };
        scores.insert(player.id.clone(), score);
    }

    let mut changes = Vec::new();
    let mut caught = 0usize;
    for &saboteur in &saboteurs {
        let observers = players
            .iter()
            .copied()
            .filter(|p| !saboteurs.iter().any(|s| s.id == p.id));
        for observer in observers {
            if roll(rng, detection_chance(observer, saboteur)) {
                tracing::debug!(observer = %observer.id, saboteur = %saboteur.id, "sabotage spotted");
                raise_suspicion(
                    trust,
                    &mut changes,
                    observer,
                    saboteur,
                    DETECTION_SUSPICION,
                    "spotted sabotage during the laser heist",
                );
                caught += 1;
                break;
            }
        }
    }

    let narrative = match (saboteurs.len(), caught) {
        (0, _) => "The team slipped through the lasers and cracked the vault.".to_string(),
        (attempts, 0) => format!(
            "Alarms tripped {} time{} but nobody saw who was responsible.",
            attempts,
            if attempts == 1 { "" } else { "s" }
        ),
        (attempts, caught) => format!(
            "Alarms tripped {} time{}; {} culprit{} drew a watchful eye.",
            attempts,
            if attempts == 1 { "" } else { "s" },
            caught,
            if caught == 1 { "" } else { "s" }
        ),
    };

    let penalty = SABOTAGE_PENALTY * saboteurs.len() as f32;
    averaged_result(MissionKind::LaserHeist, config, scores, penalty, narrative, changes)
}
