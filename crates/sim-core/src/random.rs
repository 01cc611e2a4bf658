//! Seeded randomness
//!
//! The engine never touches a global random stream. Each game owns a
//! [`SimRng`] seeded from config, and every probabilistic helper takes the
//! generator as a parameter.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// Mixed into the seed so game ids do not track the game's own draws.
const GAME_ID_STREAM: u64 = 0x6a3e_1d00_9b1c_5a7f;

/// Seeded random number generator resource
#[derive(Resource, Debug, Clone)]
pub struct SimRng(pub SmallRng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }
}

/// Stable game id for a seed.
pub fn game_id_for_seed(seed: u64) -> Uuid {
    Uuid::from_u128(SmallRng::seed_from_u64(seed ^ GAME_ID_STREAM).gen())
}

/// Bernoulli draw. Non-positive chances never succeed, chances >= 1 always do.
pub fn roll<R: Rng + ?Sized>(rng: &mut R, chance: f32) -> bool {
    if !(chance > 0.0) {
        return false;
    }
    rng.gen::<f32>() < chance
}

/// Perform weighted random selection, returning the chosen index.
///
/// Returns `None` for an empty slice. Non-positive totals fall back to the
/// first entry.
pub fn weighted_index<R: Rng + ?Sized>(rng: &mut R, weights: &[f32]) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    let total: f32 = weights.iter().filter(|w| w.is_finite() && **w > 0.0).sum();
    if total <= 0.0 {
        return Some(0);
    }

    let mut remaining: f32 = rng.gen::<f32>() * total;
    for (i, &w) in weights.iter().enumerate() {
        if !(w.is_finite() && w > 0.0) {
            continue;
        }
        remaining -= w;
        if remaining <= 0.0 {
            return Some(i);
        }
    }

    // Float drift: fall back to the last selectable entry
    weights.iter().rposition(|w| w.is_finite() && *w > 0.0)
}
