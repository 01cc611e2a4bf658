//! Crossbow Mission
//!
//! Accuracy pays the pot, but the interesting part is who each shooter
//! aims at. Target choice is a weighted draw over the other alive players:
//! Traitors shy away from each other, suspicion pulls the aim, influential
//! players are spared, and agreeable shooters drift toward indifference.
//!
//! When two or more Traitors play and none of them shoots another Traitor,
//! observant Faithful may read the pattern as collusion.

use rand::Rng;
use sim_model::{MissionKind, MissionResult, Player};
use std::collections::BTreeMap;

use crate::config::MissionConfig;
use crate::random::{roll, weighted_index};
use crate::trust::TrustMatrix;

use super::{averaged_result, difficulty_factor, jitter, raise_suspicion};

/// Crossbow tuning constants
pub mod constants {
    pub const DEXTERITY_WEIGHT: f32 = 0.8;
    /// Accuracy bonus per point of disagreeableness
    pub const AGGRESSION_WEIGHT: f32 = 0.2;
    /// Starting weight for every potential target
    pub const BASE_TARGET_WEIGHT: f32 = 0.5;
    /// Multiplier when a Traitor considers a fellow Traitor
    pub const COLLUSION_AVOIDANCE: f32 = 0.7;
    pub const SUSPICION_PULL: f32 = 0.5;
    pub const INFLUENCE_SHIELD: f32 = 0.2;
    /// Shooters above this agreeableness drift toward neutral weights
    pub const AGREEABLE_SHOOTER: f32 = 0.7;
    pub const MIN_TARGET_WEIGHT: f32 = 0.01;
    /// Notice chance per point of (openness + conscientiousness)
    pub const COLLUSION_NOTICE_SCALE: f32 = 0.1;
    /// Suspicion added to every Traitor when collusion is noticed
    pub const COLLUSION_SUSPICION: f32 = 0.03;
}

use constants::*;

/// Weight of `target` in `shooter`'s aim.
pub fn target_weight(shooter: &Player, target: &Player, trust: &TrustMatrix) -> f32 {
    let mut weight = BASE_TARGET_WEIGHT;
    if shooter.is_traitor() && target.is_traitor() {
        weight *= COLLUSION_AVOIDANCE;
    }
    weight += trust.get(&shooter.id, &target.id) * SUSPICION_PULL;
    weight -= target.stats.social_influence * INFLUENCE_SHIELD;

    let agreeableness = shooter.personality.agreeableness;
    if agreeableness > AGREEABLE_SHOOTER {
        weight += (BASE_TARGET_WEIGHT - weight) * agreeableness * 0.5;
    }
    weight.max(MIN_TARGET_WEIGHT)
}

/// Picks the shooter's target among the other players.
pub fn choose_target<'a, R: Rng + ?Sized>(
    shooter: &Player,
    players: &[&'a Player],
    trust: &TrustMatrix,
    rng: &mut R,
) -> Option<&'a Player> {
    let candidates: Vec<&'a Player> = players
        .iter()
        .copied()
        .filter(|p| p.id != shooter.id)
        .collect();
    let weights: Vec<f32> = candidates
        .iter()
        .map(|target| target_weight(shooter, target, trust))
        .collect();
    weighted_index(rng, &weights).map(|i| candidates[i])
}

pub fn collusion_notice_chance(observer: &Player) -> f32 {
    (observer.personality.openness + observer.personality.conscientiousness) * COLLUSION_NOTICE_SCALE
}

pub fn run<R: Rng + ?Sized>(
    players: &[&Player],
    trust: &mut TrustMatrix,
    config: &MissionConfig,
    rng: &mut R,
) -> MissionResult {
    let factor = difficulty_factor(config);
    let mut scores = BTreeMap::new();
    let mut targets: Vec<(&Player, &Player)> = Vec::new();

    for &shooter in players {
        let aggression = 1.0 - shooter.personality.agreeableness;
        let base = (shooter.stats.dexterity * DEXTERITY_WEIGHT + aggression * AGGRESSION_WEIGHT) * factor;
        scores.insert(shooter.id.clone(), jitter(rng, base));

        if let Some(target) = choose_target(shooter, players, trust, rng) {
            targets.push((shooter, target));
        }
    }

    let traitors: Vec<&Player> = players.iter().copied().filter(|p| p.is_traitor()).collect();
    let traitor_hit_traitor = targets
        .iter()
        .any(|(shooter, target)| shooter.is_traitor() && target.is_traitor());

    let mut changes = Vec::new();
    let mut noticed = 0usize;
    if traitors.len() >= 2 && !traitor_hit_traitor {
        for &observer in players.iter().filter(|p| !p.is_traitor()) {
            if roll(rng, collusion_notice_chance(observer)) {
                noticed += 1;
                tracing::debug!(observer = %observer.id, "crossbow collusion pattern noticed");
                for &traitor in &traitors {
                    raise_suspicion(
                        trust,
                        &mut changes,
                        observer,
                        traitor,
                        COLLUSION_SUSPICION,
                        "noticed who never aimed at whom at the crossbow range",
                    );
                }
            }
        }
    }

    let shots = targets
        .iter()
        .map(|(shooter, target)| format!("{} aimed at {}", shooter.name, target.name))
        .collect::<Vec<_>>()
        .join("; ");
    let mut narrative = if shots.is_empty() {
        "Nobody had anyone to aim at.".to_string()
    } else {
        format!("Bolts flew: {}.", shots)
    };
    if noticed > 0 {
        narrative.push_str(" Some players began tracking who was never targeted.");
    }

    averaged_result(MissionKind::Crossbow, config, scores, 0.0, narrative, changes)
}
