//! Mission Types
//!
//! Mission identifiers and the per-run result value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The five mission formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionKind {
    /// Individual puzzle attempts
    SkillCheck,
    /// Memory and lie-detection at a mock funeral
    Funeral,
    /// Team heist through a laser grid, open to sabotage
    LaserHeist,
    /// Composure test in a haunted cabin
    CabinCreepies,
    /// Target shooting where every shooter picks a victim
    Crossbow,
}

impl MissionKind {
    pub const ALL: [MissionKind; 5] = [
        MissionKind::SkillCheck,
        MissionKind::Funeral,
        MissionKind::LaserHeist,
        MissionKind::CabinCreepies,
        MissionKind::Crossbow,
    ];

    /// Mission played on a given day. Days are 1-based and rotate through [`Self::ALL`].
    pub fn for_day(day: u32) -> Self {
        let index = (day.max(1) - 1) as usize % Self::ALL.len();
        Self::ALL[index]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MissionKind::SkillCheck => "skill_check",
            MissionKind::Funeral => "funeral",
            MissionKind::LaserHeist => "laser_heist",
            MissionKind::CabinCreepies => "cabin_creepies",
            MissionKind::Crossbow => "crossbow",
        }
    }
}

impl fmt::Display for MissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A suspicion change produced during a mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspicionChange {
    pub observer: String,
    pub subject: String,
    /// Signed delta requested
    pub delta: f32,
    /// Score after the clamped update
    pub new_score: f32,
    pub reason: String,
}

/// Outcome of one mission execution.
///
/// Produced once and consumed immediately: earnings go to the prize pot and
/// suspicion changes have already been written to the trust matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionResult {
    pub mission: MissionKind,
    pub success: bool,
    /// Always within [0, base_reward]
    pub earnings: f32,
    /// Player id -> performance in [0, 1]
    pub performance_scores: BTreeMap<String, f32>,
    pub narrative: String,
    #[serde(default)]
    pub suspicion_changes: Vec<SuspicionChange>,
}

impl MissionResult {
    /// Result for a mission that could not run (no one alive).
    pub fn empty(mission: MissionKind, narrative: impl Into<String>) -> Self {
        Self {
            mission,
            success: false,
            earnings: 0.0,
            performance_scores: BTreeMap::new(),
            narrative: narrative.into(),
            suspicion_changes: Vec::new(),
        }
    }

    pub fn average_performance(&self) -> f32 {
        if self.performance_scores.is_empty() {
            return 0.0;
        }
        self.performance_scores.values().sum::<f32>() / self.performance_scores.len() as f32
    }

    /// Player with the lowest score, first by id on ties.
    pub fn worst_performer(&self) -> Option<(&str, f32)> {
        self.performance_scores
            .iter()
            .fold(None, |worst: Option<(&str, f32)>, (id, &score)| match worst {
                Some((_, best_low)) if best_low <= score => worst,
                _ => Some((id.as_str(), score)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mission_rotation() {
        assert_eq!(MissionKind::for_day(1), MissionKind::SkillCheck);
        assert_eq!(MissionKind::for_day(5), MissionKind::Crossbow);
        assert_eq!(MissionKind::for_day(6), MissionKind::SkillCheck);
        assert_eq!(MissionKind::for_day(0), MissionKind::SkillCheck);
    }

    #[test]
    fn test_empty_result() {
        let result = MissionResult::empty(MissionKind::Funeral, "nobody left");
        assert!(!result.success);
        assert_eq!(result.earnings, 0.0);
        assert_eq!(result.average_performance(), 0.0);
        assert!(result.worst_performer().is_none());
    }

    #[test]
    fn test_worst_performer() {
        let mut result = MissionResult::empty(MissionKind::LaserHeist, "");
        result.performance_scores.insert("a".into(), 0.7);
        result.performance_scores.insert("b".into(), 0.2);
        result.performance_scores.insert("c".into(), 0.2);

        assert_eq!(result.worst_performer(), Some(("b", 0.2)));
        assert!((result.average_performance() - 0.366_666_7).abs() < 1e-5);
    }
}
