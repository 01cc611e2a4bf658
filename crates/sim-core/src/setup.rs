//! Roster Setup
//!
//! Builds the cast for a new game, either from random traits or from
//! profiles in the training corpus. Traitors are drawn uniformly at random.

use rand::seq::{index, SliceRandom};
use rand::Rng;
use sim_model::{Personality, Player, PlayerProfile, Role, Stats};
use std::collections::BTreeSet;

const CONTESTANT_NAMES: &[&str] = &[
    "Alex", "Bea", "Cal", "Dee", "Eli", "Fay", "Gus", "Hana", "Ivo", "Jude",
    "Kit", "Lena", "Milo", "Nia", "Oren", "Pia", "Quin", "Rosa", "Sol", "Tess",
    "Uma", "Vic", "Wren", "Xan",
];

/// Spread of the stat jitter applied when deriving stats from traits
const STAT_JITTER: f32 = 0.1;

/// Average of two uniform draws, kept off the extremes.
fn rand_trait<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    let a: f32 = rng.gen();
    let b: f32 = rng.gen();
    ((a + b) / 2.0).clamp(0.05, 0.95)
}

fn random_personality<R: Rng + ?Sized>(rng: &mut R) -> Personality {
    Personality::new(
        rand_trait(rng),
        rand_trait(rng),
        rand_trait(rng),
        rand_trait(rng),
        rand_trait(rng),
    )
}

fn random_stats<R: Rng + ?Sized>(rng: &mut R) -> Stats {
    Stats::new(rand_trait(rng), rand_trait(rng), rand_trait(rng), rand_trait(rng))
}

/// Stats implied by a personality, with a little noise.
pub fn stats_from_personality<R: Rng + ?Sized>(p: &Personality, rng: &mut R) -> Stats {
    let mut noisy = |v: f32| (v + rng.gen_range(-STAT_JITTER..=STAT_JITTER)).clamp(0.0, 1.0);
    Stats::new(
        noisy(p.openness * 0.5 + p.conscientiousness * 0.5),
        noisy(p.conscientiousness * 0.6 + (1.0 - p.neuroticism) * 0.4),
        noisy(p.extraversion * 0.7 + p.agreeableness * 0.3),
        noisy(1.0 - p.neuroticism),
    )
}

fn contestant_name(index: usize) -> String {
    let base = CONTESTANT_NAMES[index % CONTESTANT_NAMES.len()];
    match index / CONTESTANT_NAMES.len() {
        0 => base.to_string(),
        round => format!("{} {}", base, round + 1),
    }
}

fn traitor_slots<R: Rng + ?Sized>(n: usize, traitors: usize, rng: &mut R) -> BTreeSet<usize> {
    index::sample(rng, n, traitors.min(n)).into_iter().collect()
}

fn role_for(i: usize, slots: &BTreeSet<usize>) -> Role {
    if slots.contains(&i) {
        Role::Traitor
    } else {
        Role::Faithful
    }
}

/// `n` players with random traits and stats, ids `p0..`.
pub fn generate_roster<R: Rng + ?Sized>(n: usize, traitors: usize, rng: &mut R) -> Vec<Player> {
    let slots = traitor_slots(n, traitors, rng);
    (0..n)
        .map(|i| {
            let personality = random_personality(rng);
            let stats = random_stats(rng);
            Player::new(format!("p{}", i), contestant_name(i), role_for(i, &slots))
                .with_personality(personality)
                .with_stats(stats)
        })
        .collect()
}

/// `n` players modeled on corpus profiles.
///
/// Profiles are sampled without replacement; if the corpus has fewer than
/// `n`, the rest of the cast is generated randomly. The profile's historical
/// role is ignored.
pub fn roster_from_profiles<R: Rng + ?Sized>(
    profiles: &[PlayerProfile],
    n: usize,
    traitors: usize,
    rng: &mut R,
) -> Vec<Player> {
    let slots = traitor_slots(n, traitors, rng);
    let picked: Vec<&PlayerProfile> = profiles.choose_multiple(rng, n).collect();

    (0..n)
        .map(|i| {
            let id = format!("p{}", i);
            let role = role_for(i, &slots);
            match picked.get(i) {
                Some(profile) => {
                    let personality = profile.ocean.clamped();
                    let stats = stats_from_personality(&personality, rng);
                    let name = if profile.name.is_empty() {
                        contestant_name(i)
                    } else {
                        profile.name.clone()
                    };
                    let player = Player::new(id, name, role)
                        .with_personality(personality)
                        .with_stats(stats);
                    if profile.archetype.is_empty() {
                        player
                    } else {
                        player.with_archetype(profile.archetype.clone())
                    }
                }
                None => {
                    let personality = random_personality(rng);
                    let stats = random_stats(rng);
                    Player::new(id, contestant_name(i), role)
                        .with_personality(personality)
                        .with_stats(stats)
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_roster_counts() {
        let mut rng = SmallRng::seed_from_u64(42);
        let players = generate_roster(10, 3, &mut rng);

        assert_eq!(players.len(), 10);
        assert_eq!(players.iter().filter(|p| p.is_traitor()).count(), 3);
        assert!(players.iter().all(|p| p.alive && p.death.is_none()));
        let traits = players[0].personality;
        assert!((0.05..=0.95).contains(&traits.openness));
    }

    #[test]
    fn test_traitor_placement_varies() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut first_is_traitor = 0;
        for _ in 0..100 {
            if generate_roster(5, 1, &mut rng)[0].is_traitor() {
                first_is_traitor += 1;
            }
        }
        assert!(first_is_traitor > 5 && first_is_traitor < 45);
    }

    #[test]
    fn test_names_unique_past_list() {
        let mut rng = SmallRng::seed_from_u64(3);
        let players = generate_roster(30, 5, &mut rng);
        let names: BTreeSet<&str> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.len(), 30);
    }

    #[test]
    fn test_roster_from_profiles_fills_gaps() {
        let profile = PlayerProfile {
            name: "Wilfred".into(),
            role: "traitor".into(),
            ocean: Personality::new(0.9, 0.8, 0.7, 0.2, 0.1),
            archetype: "Strategist".into(),
            observed_behaviors: vec![],
        };
        let mut rng = SmallRng::seed_from_u64(11);
        let players = roster_from_profiles(&[profile], 4, 1, &mut rng);

        assert_eq!(players.len(), 4);
        assert_eq!(players.iter().filter(|p| p.is_traitor()).count(), 1);
        let modeled = players.iter().find(|p| p.name == "Wilfred").unwrap();
        assert_eq!(modeled.archetype.as_deref(), Some("Strategist"));
        assert!((modeled.personality.openness - 0.9).abs() < 1e-6);
        assert!(modeled.stats.composure >= 0.8 && modeled.stats.composure <= 1.0);
    }
}
