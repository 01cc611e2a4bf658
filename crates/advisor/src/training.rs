//! Training Data Loader
//!
//! Reads the reference corpus once and keeps it immutable. Components hold
//! it behind an `Arc`, so any number of concurrent games can read it without
//! locking.
//!
//! Corpus directory layout:
//!
//! | File | Shape |
//! |---|---|
//! | `player_profiles.json` | list of profiles |
//! | `strategy_playbook.json` | playbook object |
//! | `dialogue_templates.json` | context -> template |
//! | `relationship_patterns.json` | pattern type -> list of patterns |
//! | `summary.json` | cast summary |
//! | `phase_norms.json` (optional) | phase -> norms |

use serde::de::DeserializeOwned;
use sim_model::{
    CorpusSummary, DialogueTemplate, Phase, PhaseNorms, PlayerProfile, RelationshipPattern, Role,
    Strategy, StrategyPlaybook,
};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::TrainingDataError;

pub const PROFILES_FILE: &str = "player_profiles.json";
pub const PLAYBOOK_FILE: &str = "strategy_playbook.json";
pub const DIALOGUE_FILE: &str = "dialogue_templates.json";
pub const RELATIONSHIPS_FILE: &str = "relationship_patterns.json";
pub const SUMMARY_FILE: &str = "summary.json";
pub const PHASE_NORMS_FILE: &str = "phase_norms.json";

/// The loaded reference corpus.
#[derive(Debug, Clone, Default)]
pub struct TrainingData {
    pub profiles: Vec<PlayerProfile>,
    pub dialogue_templates: BTreeMap<String, DialogueTemplate>,
    pub relationship_patterns: BTreeMap<String, Vec<RelationshipPattern>>,
    pub summary: CorpusSummary,
    /// Keyed by [`Phase::as_str`]
    pub phase_norms: BTreeMap<String, PhaseNorms>,
    playbook: StrategyPlaybook,
    by_phase: BTreeMap<Phase, Vec<Strategy>>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, TrainingDataError> {
    let content = std::fs::read_to_string(path).map_err(|source| TrainingDataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| TrainingDataError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn read_or_default<T: DeserializeOwned + Default>(dir: &Path, file: &str) -> T {
    match read_json(&dir.join(file)) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(file, error = %err, "training file unavailable, using empty default");
            T::default()
        }
    }
}

/// Re-keys phase norms by canonical phase label, dropping unknown phases.
fn canonical_norms(raw: BTreeMap<String, PhaseNorms>) -> BTreeMap<String, PhaseNorms> {
    raw.into_iter()
        .filter_map(|(label, norms)| match Phase::from_label(&label) {
            Some(phase) => Some((phase.as_str().to_string(), norms)),
            None => {
                tracing::debug!(label = %label, "phase norms for unknown phase ignored");
                None
            }
        })
        .collect()
}

impl TrainingData {
    /// Loads the corpus from `dir`. Missing or malformed files degrade to
    /// empty defaults with a warning.
    pub fn load(dir: &Path) -> Self {
        let phase_norms = if dir.join(PHASE_NORMS_FILE).exists() {
            read_or_default(dir, PHASE_NORMS_FILE)
        } else {
            BTreeMap::new()
        };
        let data = Self {
            profiles: read_or_default(dir, PROFILES_FILE),
            dialogue_templates: read_or_default(dir, DIALOGUE_FILE),
            relationship_patterns: read_or_default(dir, RELATIONSHIPS_FILE),
            summary: read_or_default(dir, SUMMARY_FILE),
            phase_norms: canonical_norms(phase_norms),
            ..Self::default()
        }
        .with_playbook(read_or_default(dir, PLAYBOOK_FILE));
        data.log_loaded(dir);
        data
    }

    /// Loads the corpus from `dir`, failing on the first missing or
    /// malformed file. `phase_norms.json` stays optional.
    pub fn load_strict(dir: &Path) -> Result<Self, TrainingDataError> {
        let norms_path = dir.join(PHASE_NORMS_FILE);
        let phase_norms = if norms_path.exists() {
            read_json(&norms_path)?
        } else {
            BTreeMap::new()
        };
        let data = Self {
            profiles: read_json(&dir.join(PROFILES_FILE))?,
            dialogue_templates: read_json(&dir.join(DIALOGUE_FILE))?,
            relationship_patterns: read_json(&dir.join(RELATIONSHIPS_FILE))?,
            summary: read_json(&dir.join(SUMMARY_FILE))?,
            phase_norms: canonical_norms(phase_norms),
            ..Self::default()
        }
        .with_playbook(read_json(&dir.join(PLAYBOOK_FILE))?);
        data.log_loaded(dir);
        Ok(data)
    }

    fn log_loaded(&self, dir: &Path) {
        tracing::info!(
            dir = %dir.display(),
            profiles = self.profiles.len(),
            strategies = self.playbook.all().count(),
            dialogue_contexts = self.dialogue_templates.len(),
            "training data loaded"
        );
    }

    /// Replaces the playbook and rebuilds the phase index.
    pub fn with_playbook(mut self, playbook: StrategyPlaybook) -> Self {
        let mut by_phase: BTreeMap<Phase, Vec<Strategy>> = BTreeMap::new();
        for (label, strategies) in &playbook.phase_strategies {
            if let Some(phase) = Phase::from_label(label) {
                by_phase.entry(phase).or_default().extend(strategies.iter().cloned());
            }
        }
        for strategy in playbook
            .traitor_strategies
            .iter()
            .chain(&playbook.faithful_strategies)
            .chain(&playbook.universal_strategies)
        {
            if let Some(phase) = Phase::from_label(&strategy.best_phase) {
                let bucket = by_phase.entry(phase).or_default();
                if !bucket.iter().any(|s| s.strategy_name == strategy.strategy_name) {
                    bucket.push(strategy.clone());
                }
            }
        }
        self.playbook = playbook;
        self.by_phase = by_phase;
        self
    }

    pub fn playbook(&self) -> &StrategyPlaybook {
        &self.playbook
    }

    /// Strategies for a role: the role's own list followed by the universal ones.
    pub fn strategies_for_role(&self, role: Role) -> Vec<&Strategy> {
        let own = match role {
            Role::Traitor => &self.playbook.traitor_strategies,
            Role::Faithful => &self.playbook.faithful_strategies,
        };
        own.iter().chain(&self.playbook.universal_strategies).collect()
    }

    /// Strategies tagged for a phase, either by the playbook's phase map or
    /// by their `best_phase`.
    pub fn strategies_for_phase(&self, phase: Phase) -> &[Strategy] {
        self.by_phase.get(&phase).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Finds a strategy anywhere in the playbook by name (case-insensitive).
    pub fn find_strategy(&self, name: &str) -> Option<&Strategy> {
        self.playbook
            .all()
            .find(|s| s.strategy_name.eq_ignore_ascii_case(name))
    }

    pub fn dialogue_for(&self, context: &str) -> Option<&DialogueTemplate> {
        self.dialogue_templates.get(context)
    }

    pub fn norms_for(&self, phase: Phase) -> Option<&PhaseNorms> {
        self.phase_norms.get(phase.as_str())
    }

    /// Profiles whose historical role matches.
    pub fn profiles_for_role(&self, role: Role) -> Vec<&PlayerProfile> {
        self.profiles
            .iter()
            .filter(|p| Role::from_label(&p.role) == Some(role))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty() && self.playbook.is_empty() && self.dialogue_templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playbook() -> StrategyPlaybook {
        let mut book = StrategyPlaybook {
            traitor_strategies: vec![Strategy::new("Blend In", "Keep a low profile", 0.7).with_phase("Round Table")],
            faithful_strategies: vec![Strategy::new("Evidence Gathering", "Track the votes", 0.6)],
            universal_strategies: vec![Strategy::new("Alliance Building", "Make friends early", 0.5)],
            ..StrategyPlaybook::default()
        };
        book.phase_strategies.insert(
            "turret".into(),
            vec![Strategy::new("Shield Murder", "Kill the protected", 0.8)],
        );
        book
    }

    #[test]
    fn test_role_index_includes_universal() {
        let data = TrainingData::default().with_playbook(playbook());

        let traitor: Vec<&str> = data
            .strategies_for_role(Role::Traitor)
            .iter()
            .map(|s| s.strategy_name.as_str())
            .collect();
        assert_eq!(traitor, vec!["Blend In", "Alliance Building"]);
        assert_eq!(data.strategies_for_role(Role::Faithful).len(), 2);
    }

    #[test]
    fn test_phase_index() {
        let data = TrainingData::default().with_playbook(playbook());

        assert_eq!(data.strategies_for_phase(Phase::Turret)[0].strategy_name, "Shield Murder");
        assert_eq!(data.strategies_for_phase(Phase::RoundTable)[0].strategy_name, "Blend In");
        assert!(data.strategies_for_phase(Phase::Breakfast).is_empty());
    }

    #[test]
    fn test_find_strategy_case_insensitive() {
        let data = TrainingData::default().with_playbook(playbook());
        assert!(data.find_strategy("shield murder").is_some());
        assert!(data.find_strategy("nope").is_none());
    }

    #[test]
    fn test_canonical_norms() {
        let mut raw = BTreeMap::new();
        raw.insert("Round Table".to_string(), PhaseNorms::default());
        raw.insert("karaoke".to_string(), PhaseNorms::default());

        let norms = canonical_norms(raw);
        assert_eq!(norms.len(), 1);
        assert!(norms.contains_key(Phase::RoundTable.as_str()));
    }

    #[test]
    fn test_load_missing_dir_degrades() {
        let data = TrainingData::load(Path::new("/nonexistent/corpus"));
        assert!(data.is_empty());
        assert!(TrainingData::load_strict(Path::new("/nonexistent/corpus")).is_err());
    }
}
