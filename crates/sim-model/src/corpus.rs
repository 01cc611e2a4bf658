//! Training Corpus Schema
//!
//! Serde shapes of the reference documents distilled from past seasons:
//! player profiles, the strategy playbook, dialogue templates, phase norms,
//! relationship patterns and the cast summary. Every field is defaulted so
//! partially filled documents still load.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::player::Personality;

/// A real contestant profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerProfile {
    pub name: String,
    /// "traitor" or "faithful"
    pub role: String,
    #[serde(alias = "ocean_traits")]
    pub ocean: Personality,
    pub archetype: String,
    pub observed_behaviors: Vec<String>,
}

/// A named tactic with its track record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Strategy {
    pub strategy_name: String,
    pub description: String,
    /// In [0, 1] once loaded through a [`StrategyPlaybook`]
    pub effectiveness_rating: f32,
    pub risk_level: String,
    pub best_phase: String,
    pub counter_strategies: Vec<String>,
    pub examples_from_show: Vec<String>,
}

impl Default for Strategy {
    fn default() -> Self {
        Self {
            strategy_name: String::new(),
            description: String::new(),
            effectiveness_rating: 0.5,
            risk_level: "medium".to_string(),
            best_phase: String::new(),
            counter_strategies: Vec::new(),
            examples_from_show: Vec::new(),
        }
    }
}

impl Strategy {
    pub fn new(name: impl Into<String>, description: impl Into<String>, effectiveness: f32) -> Self {
        Self {
            strategy_name: name.into(),
            description: description.into(),
            effectiveness_rating: effectiveness.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.best_phase = phase.into();
        self
    }

    pub fn with_risk(mut self, risk: impl Into<String>) -> Self {
        self.risk_level = risk.into();
        self
    }

    /// Lowercased name and description, used for keyword matching.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.strategy_name, self.description).to_lowercase()
    }
}

/// The full strategy playbook.
///
/// Ratings are normalized to [0, 1] on load. A document may declare its
/// `rating_scale` (e.g. `10`), in which case every rating is divided by it.
/// Without one, each rating is judged on its own: above 1 means out of 10,
/// anything else is taken as already normalized, so a lone `1` reads as 100%.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "PlaybookRecord")]
pub struct StrategyPlaybook {
    pub traitor_strategies: Vec<Strategy>,
    pub faithful_strategies: Vec<Strategy>,
    pub universal_strategies: Vec<Strategy>,
    /// Phase label -> strategies suited to it
    pub phase_strategies: BTreeMap<String, Vec<Strategy>>,
    pub counter_strategies: Vec<Strategy>,
}

/// Wire shape of [`StrategyPlaybook`], with ratings as written.
#[derive(Default, Deserialize)]
#[serde(default)]
struct PlaybookRecord {
    rating_scale: Option<f32>,
    traitor_strategies: Vec<Strategy>,
    faithful_strategies: Vec<Strategy>,
    universal_strategies: Vec<Strategy>,
    phase_strategies: BTreeMap<String, Vec<Strategy>>,
    #[serde(deserialize_with = "deserialize_strategy_list_or_map")]
    counter_strategies: Vec<Strategy>,
}

impl From<PlaybookRecord> for StrategyPlaybook {
    fn from(record: PlaybookRecord) -> Self {
        let scale = record.rating_scale.filter(|s| s.is_finite() && *s > 0.0);
        let mut playbook = StrategyPlaybook {
            traitor_strategies: record.traitor_strategies,
            faithful_strategies: record.faithful_strategies,
            universal_strategies: record.universal_strategies,
            phase_strategies: record.phase_strategies,
            counter_strategies: record.counter_strategies,
        };
        let lists = [
            &mut playbook.traitor_strategies,
            &mut playbook.faithful_strategies,
            &mut playbook.universal_strategies,
            &mut playbook.counter_strategies,
        ];
        for strategy in lists
            .into_iter()
            .flatten()
            .chain(playbook.phase_strategies.values_mut().flatten())
        {
            strategy.effectiveness_rating = normalize_rating(strategy.effectiveness_rating, scale);
        }
        playbook
    }
}

impl StrategyPlaybook {
    pub fn is_empty(&self) -> bool {
        self.traitor_strategies.is_empty()
            && self.faithful_strategies.is_empty()
            && self.universal_strategies.is_empty()
            && self.phase_strategies.values().all(Vec::is_empty)
            && self.counter_strategies.is_empty()
    }

    /// Every strategy in document order.
    pub fn all(&self) -> impl Iterator<Item = &Strategy> {
        self.traitor_strategies
            .iter()
            .chain(self.faithful_strategies.iter())
            .chain(self.universal_strategies.iter())
            .chain(self.phase_strategies.values().flatten())
            .chain(self.counter_strategies.iter())
    }
}

/// Phrases and emotional markers observed in one conversational context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueTemplate {
    pub phrases: Vec<String>,
    /// Emotion label -> number of times observed
    pub emotional_markers: BTreeMap<String, u32>,
    pub phase: Option<String>,
}

/// Expected and discouraged conduct for a phase.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseNorms {
    pub expected_behaviors: Vec<String>,
    pub avoid_behaviors: Vec<String>,
}

/// An observed relationship between contestants.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipPattern {
    pub players: Vec<String>,
    pub strength: f32,
    pub evolution: String,
    pub key_moments: Vec<String>,
}

/// Cast summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusSummary {
    pub traitors: Vec<String>,
    pub faithfuls: Vec<String>,
    pub total_traitors: usize,
    pub total_faithfuls: usize,
}

/// Maps a raw rating into [0, 1]. With no declared `scale`, values above 1
/// are read as out of 10.
pub fn normalize_rating(raw: f32, scale: Option<f32>) -> f32 {
    if !raw.is_finite() {
        return 0.5;
    }
    let scaled = match scale {
        Some(scale) => raw / scale,
        None if raw > 1.0 => raw / 10.0,
        None => raw,
    };
    scaled.clamp(0.0, 1.0)
}

fn deserialize_strategy_list_or_map<'de, D>(deserializer: D) -> Result<Vec<Strategy>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrMap {
        List(Vec<Strategy>),
        Map(BTreeMap<String, Vec<Strategy>>),
    }

    Ok(match ListOrMap::deserialize(deserializer)? {
        ListOrMap::List(list) => list,
        ListOrMap::Map(map) => map.into_values().flatten().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_accepts_ocean_traits_alias() {
        let json = r#"{
            "name": "Wilf",
            "role": "traitor",
            "ocean_traits": {"openness": 0.7, "neuroticism": 0.2},
            "archetype": "charming schemer"
        }"#;
        let profile: PlayerProfile = serde_json::from_str(json).unwrap();

        assert_eq!(profile.ocean.openness, 0.7);
        assert_eq!(profile.ocean.extraversion, 0.5);
        assert!(profile.observed_behaviors.is_empty());
    }

    #[test]
    fn test_rating_out_of_ten_is_normalized() {
        let json = r#"{"traitor_strategies": [
            {"strategy_name": "Hide in plain sight", "effectiveness_rating": 8},
            {"strategy_name": "Shield", "effectiveness_rating": 0.6}
        ]}"#;
        let playbook: StrategyPlaybook = serde_json::from_str(json).unwrap();
        let ratings: Vec<f32> = playbook.all().map(|s| s.effectiveness_rating).collect();

        assert!((ratings[0] - 0.8).abs() < 1e-6);
        assert!((ratings[1] - 0.6).abs() < 1e-6);
        assert_eq!(playbook.traitor_strategies[0].risk_level, "medium");
    }

    #[test]
    fn test_declared_rating_scale() {
        let json = r#"{
            "rating_scale": 10,
            "faithful_strategies": [{"strategy_name": "Vote Tracking", "effectiveness_rating": 1}],
            "phase_strategies": {"turret": [{"strategy_name": "Lie Low", "effectiveness_rating": 7}]},
            "counter_strategies": [{"strategy_name": "Expose", "effectiveness_rating": 15}]
        }"#;
        let playbook: StrategyPlaybook = serde_json::from_str(json).unwrap();

        assert!((playbook.faithful_strategies[0].effectiveness_rating - 0.1).abs() < 1e-6);
        assert!((playbook.phase_strategies["turret"][0].effectiveness_rating - 0.7).abs() < 1e-6);
        assert_eq!(playbook.counter_strategies[0].effectiveness_rating, 1.0);

        // Without a declared scale a lone 1 is already normalized
        assert_eq!(normalize_rating(1.0, None), 1.0);
        assert!((normalize_rating(1.0, Some(10.0)) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_counter_strategies_as_map() {
        let json = r#"{
            "counter_strategies": {
                "vs_shield": [{"strategy_name": "Expose the shield"}],
                "vs_bus": [{"strategy_name": "Refuse the bus"}]
            }
        }"#;
        let playbook: StrategyPlaybook = serde_json::from_str(json).unwrap();

        assert_eq!(playbook.counter_strategies.len(), 2);
        assert!(!playbook.is_empty());
        assert_eq!(playbook.all().count(), 2);
    }
}
