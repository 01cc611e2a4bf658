//! Player Types
//!
//! Contestant identity, hidden role, personality and ability vectors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hidden allegiance of a contestant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Faithful,
    Traitor,
}

impl Role {
    pub fn is_traitor(self) -> bool {
        matches!(self, Role::Traitor)
    }

    /// Lowercase label used in tool output and the training corpus.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Faithful => "faithful",
            Role::Traitor => "traitor",
        }
    }

    /// Parses a corpus role label, accepting singular and plural forms.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "faithful" | "faithfuls" => Some(Role::Faithful),
            "traitor" | "traitors" => Some(Role::Traitor),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OCEAN personality traits - fixed at creation
/// All values are 0.0 to 1.0, including deserialized ones
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PersonalityRecord")]
pub struct Personality {
    /// Curiosity and willingness to entertain unusual theories
    pub openness: f32,
    /// Diligence, carefulness, attention to detail
    pub conscientiousness: f32,
    /// Sociability and assertiveness
    pub extraversion: f32,
    /// Cooperativeness and desire for harmony
    pub agreeableness: f32,
    /// Anxiety and emotional volatility
    pub neuroticism: f32,
}

impl Default for Personality {
    fn default() -> Self {
        Self::uniform(0.5)
    }
}

impl Personality {
    pub fn new(
        openness: f32,
        conscientiousness: f32,
        extraversion: f32,
        agreeableness: f32,
        neuroticism: f32,
    ) -> Self {
        Self {
            openness,
            conscientiousness,
            extraversion,
            agreeableness,
            neuroticism,
        }
        .clamped()
    }

    /// All five traits set to the same value.
    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value, value)
    }

    /// Returns a copy with every trait clamped to [0, 1].
    pub fn clamped(self) -> Self {
        Self {
            openness: unit(self.openness),
            conscientiousness: unit(self.conscientiousness),
            extraversion: unit(self.extraversion),
            agreeableness: unit(self.agreeableness),
            neuroticism: unit(self.neuroticism),
        }
    }

    /// Inverse neuroticism.
    pub fn composure(&self) -> f32 {
        1.0 - self.neuroticism
    }
}

/// Ability scores used by missions.
/// All values are 0.0 to 1.0, including deserialized ones
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "StatsRecord")]
pub struct Stats {
    pub intellect: f32,
    pub dexterity: f32,
    pub social_influence: f32,
    pub composure: f32,
}

impl Default for Stats {
    fn default() -> Self {
        Self::uniform(0.5)
    }
}

impl Stats {
    pub fn new(intellect: f32, dexterity: f32, social_influence: f32, composure: f32) -> Self {
        Self {
            intellect: unit(intellect),
            dexterity: unit(dexterity),
            social_influence: unit(social_influence),
            composure: unit(composure),
        }
    }

    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Returns a copy with every score clamped to [0, 1].
    pub fn clamped(self) -> Self {
        Self::new(self.intellect, self.dexterity, self.social_influence, self.composure)
    }
}

/// Wire shape of [`Personality`]: missing traits default to 0.5.
#[derive(Deserialize)]
#[serde(default)]
struct PersonalityRecord {
    openness: f32,
    conscientiousness: f32,
    extraversion: f32,
    agreeableness: f32,
    neuroticism: f32,
}

impl Default for PersonalityRecord {
    fn default() -> Self {
        Self {
            openness: 0.5,
            conscientiousness: 0.5,
            extraversion: 0.5,
            agreeableness: 0.5,
            neuroticism: 0.5,
        }
    }
}

impl From<PersonalityRecord> for Personality {
    fn from(r: PersonalityRecord) -> Self {
        Personality::new(r.openness, r.conscientiousness, r.extraversion, r.agreeableness, r.neuroticism)
    }
}

/// Wire shape of [`Stats`]: missing scores default to 0.5.
#[derive(Deserialize)]
#[serde(default)]
struct StatsRecord {
    intellect: f32,
    dexterity: f32,
    social_influence: f32,
    composure: f32,
}

impl Default for StatsRecord {
    fn default() -> Self {
        Self {
            intellect: 0.5,
            dexterity: 0.5,
            social_influence: 0.5,
            composure: 0.5,
        }
    }
}

impl From<StatsRecord> for Stats {
    fn from(r: StatsRecord) -> Self {
        Stats::new(r.intellect, r.dexterity, r.social_influence, r.composure)
    }
}

/// How a player left the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    /// Voted out at the Round Table
    Banished,
    /// Killed by the Traitors at the Turret
    Murdered,
}

/// Record of an elimination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Death {
    pub cause: DeathCause,
    pub day: u32,
}

/// A contestant.
///
/// Players are never removed from the roster; elimination only flips
/// `alive` and records the death.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub alive: bool,
    pub personality: Personality,
    pub stats: Stats,
    /// Optional personality template name
    #[serde(default)]
    pub archetype: Option<String>,
    #[serde(default)]
    pub death: Option<Death>,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            alive: true,
            personality: Personality::default(),
            stats: Stats::default(),
            archetype: None,
            death: None,
        }
    }

    pub fn with_personality(mut self, personality: Personality) -> Self {
        self.personality = personality.clamped();
        self
    }

    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = stats.clamped();
        self
    }

    pub fn with_archetype(mut self, archetype: impl Into<String>) -> Self {
        self.archetype = Some(archetype.into());
        self
    }

    pub fn is_traitor(&self) -> bool {
        self.role.is_traitor()
    }
}

fn unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personality_is_clamped() {
        let p = Personality::new(1.4, -0.2, 0.5, f32::NAN, 0.9);
        assert_eq!(p.openness, 1.0);
        assert_eq!(p.conscientiousness, 0.0);
        assert_eq!(p.agreeableness, 0.5);
        assert!((p.composure() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_deserialized_traits_are_clamped() {
        let p: Personality = serde_json::from_str(r#"{"openness": 1.7, "neuroticism": -0.4}"#).unwrap();
        assert_eq!(p.openness, 1.0);
        assert_eq!(p.neuroticism, 0.0);
        assert_eq!(p.extraversion, 0.5);

        let s: Stats = serde_json::from_str(r#"{"intellect": 3.0}"#).unwrap();
        assert_eq!(s.intellect, 1.0);
        assert_eq!(s.composure, 0.5);

        let json = r#"{"id": "p9", "name": "Zed", "role": "traitor", "alive": true,
            "personality": {"agreeableness": 2.5}, "stats": {"dexterity": -1.0}}"#;
        let player: Player = serde_json::from_str(json).unwrap();
        assert_eq!(player.personality.agreeableness, 1.0);
        assert_eq!(player.stats.dexterity, 0.0);
    }

    #[test]
    fn test_with_stats_clamps() {
        let stats = Stats {
            intellect: 1.5,
            dexterity: -0.5,
            social_influence: 0.4,
            composure: f32::NAN,
        };
        let player = Player::new("p1", "Alex", Role::Faithful).with_stats(stats);
        assert_eq!(player.stats.intellect, 1.0);
        assert_eq!(player.stats.dexterity, 0.0);
        assert_eq!(player.stats.social_influence, 0.4);
        assert_eq!(player.stats.composure, 0.5);
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(Role::from_label("Traitors"), Some(Role::Traitor));
        assert_eq!(Role::from_label(" faithful "), Some(Role::Faithful));
        assert_eq!(Role::from_label("host"), None);
        assert_eq!(serde_json::to_string(&Role::Traitor).unwrap(), r#""traitor""#);
    }

    #[test]
    fn test_player_builder() {
        let player = Player::new("p1", "Alex", Role::Faithful)
            .with_stats(Stats::uniform(0.8))
            .with_archetype("strategist");

        assert!(player.alive);
        assert!(!player.is_traitor());
        assert_eq!(player.stats.intellect, 0.8);
        assert_eq!(player.archetype.as_deref(), Some("strategist"));
    }
}
