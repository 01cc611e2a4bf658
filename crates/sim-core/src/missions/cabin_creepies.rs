//! Cabin Creepies Mission
//!
//! A fear test. Composure (low neuroticism) drives the score, helped by
//! conscientiousness and a little showmanship from extraverts. Agreeable
//! Traitors may fake a moderate fright; anyone who stays unnaturally calm
//! gets noticed.

use rand::Rng;
use sim_model::{MissionKind, MissionResult, Player};
use std::collections::BTreeMap;

use crate::config::MissionConfig;
use crate::random::roll;
use crate::trust::TrustMatrix;

use super::{averaged_result, clamp_unit, difficulty_factor, jitter, raise_suspicion};

/// Cabin tuning constants
pub mod constants {
    pub const COMPOSURE_WEIGHT: f32 = 0.6;
    pub const CONSCIENTIOUSNESS_WEIGHT: f32 = 0.3;
    /// "Performing" bonus for extraverts
    pub const EXTRAVERSION_WEIGHT: f32 = 0.1;
    /// Traitors above this agreeableness may fake fear
    pub const FAKE_FEAR_AGREEABLENESS: f32 = 0.6;
    /// Fake-fear chance per point of agreeableness
    pub const FAKE_FEAR_CHANCE_SCALE: f32 = 0.5;
    /// Band of a faked reaction
    pub const FAKE_FEAR_MIN: f32 = 0.4;
    pub const FAKE_FEAR_MAX: f32 = 0.6;
    /// Scores above this look suspiciously calm
    pub const CALM_THRESHOLD: f32 = 0.85;
    /// Suspicion added when calm is noticed
    pub const CALM_SUSPICION: f32 = 0.05;
}

use constants::*;

/// Composure from both the stat and inverse neuroticism.
fn composure(player: &Player) -> f32 {
    (player.stats.composure + player.personality.composure()) / 2.0
}

pub fn notice_chance(observer: &Player) -> f32 {
    (observer.personality.openness * 0.3 - observer.personality.agreeableness * 0.1).max(0.0)
}

pub fn run<R: Rng + ?Sized>(
    players: &[&Player],
    trust: &mut TrustMatrix,
    config: &MissionConfig,
    rng: &mut R,
) -> MissionResult {
    let factor = difficulty_factor(config);
    let mut scores = BTreeMap::new();
    let mut fakers = 0usize;

    for &player in players {
        let p = &player.personality;
        let faking = player.is_traitor()
            && p.agreeableness > FAKE_FEAR_AGREEABLENESS
            && roll(rng, p.agreeableness * FAKE_FEAR_CHANCE_SCALE);

        let score = if faking {
            fakers += 1;
            clamp_unit(rng.gen_range(FAKE_FEAR_MIN..=FAKE_FEAR_MAX))
        } else {
            let base = (composure(player) * COMPOSURE_WEIGHT
                + p.conscientiousness * CONSCIENTIOUSNESS_WEIGHT
                + p.extraversion * EXTRAVERSION_WEIGHT)
                * factor;
            jitter(rng, base)
        };
        scores.insert(player.id.clone(), score);
    }

    let mut changes = Vec::new();
    let calm: Vec<&Player> = players
        .iter()
        .copied()
        .filter(|p| scores.get(&p.id).is_some_and(|s| *s > CALM_THRESHOLD))
        .collect();

    for &subject in &calm {
        for &observer in players.iter().filter(|o| o.id != subject.id) {
            if roll(rng, notice_chance(observer)) {
                tracing::debug!(observer = %observer.id, subject = %subject.id, "unnatural calm noticed");
                raise_suspicion(
                    trust,
                    &mut changes,
                    observer,
                    subject,
                    CALM_SUSPICION,
                    "seemed suspiciously calm in the cabin",
                );
            }
        }
    }

    let narrative = format!(
        "Screams echoed through the cabin. {} contestant{} kept an eerie calm{}.",
        calm.len(),
        if calm.len() == 1 { "" } else { "s" },
        if fakers > 0 { ", while others hammed up their fright" } else { "" }
    );

    averaged_result(MissionKind::CabinCreepies, config, scores, 0.0, narrative, changes)
}
