//! Trust Matrix
//!
//! Pairwise, asymmetric suspicion scores between players. A cell
//! `(observer, subject)` holds the observer's belief that the subject is a
//! Traitor: 0.0 is full trust, 1.0 is certainty.
//!
//! Every stored score is clamped to [0, 1]. Updates are either signed deltas
//! ([`TrustMatrix::update`]) or absolute assignments ([`TrustMatrix::set`]).
//! Rows and columns for dead players are kept for historical queries.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Score for any pair without an explicit entry.
pub const NEUTRAL_SUSPICION: f32 = 0.5;

/// Resource: suspicion scores for one game
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrustMatrix {
    /// observer -> subject -> score
    scores: BTreeMap<String, BTreeMap<String, f32>>,
    tracked: BTreeSet<String>,
}

impl TrustMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a matrix with every ordered pair of `player_ids` at the neutral baseline.
    pub fn with_players<I, S>(player_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut matrix = Self::new();
        for id in player_ids {
            matrix.track(id);
        }
        let ids: Vec<String> = matrix.tracked.iter().cloned().collect();
        for observer in &ids {
            let row = matrix.scores.entry(observer.clone()).or_default();
            for subject in ids.iter().filter(|s| *s != observer) {
                row.insert(subject.clone(), NEUTRAL_SUSPICION);
            }
        }
        matrix
    }

    /// Starts tracking a player. Existing scores are untouched.
    pub fn track(&mut self, player_id: impl Into<String>) {
        self.tracked.insert(player_id.into());
    }

    pub fn is_tracked(&self, player_id: &str) -> bool {
        self.tracked.contains(player_id)
    }

    pub fn tracked_players(&self) -> impl Iterator<Item = &str> {
        self.tracked.iter().map(String::as_str)
    }

    /// Observer's suspicion of subject, neutral if never recorded.
    pub fn get(&self, observer: &str, subject: &str) -> f32 {
        self.scores
            .get(observer)
            .and_then(|row| row.get(subject))
            .copied()
            .unwrap_or(NEUTRAL_SUSPICION)
    }

    /// Applies a signed delta and returns the new clamped score.
    ///
    /// Unknown players are tracked on the fly with a neutral baseline.
    /// Self-pairs and non-finite deltas leave the matrix unchanged.
    pub fn update(&mut self, observer: &str, subject: &str, delta: f32) -> f32 {
        let current = self.get(observer, subject);
        if observer == subject || !delta.is_finite() {
            return current;
        }
        self.store(observer, subject, current + delta)
    }

    /// Assigns an absolute score (clamped) and returns it.
    pub fn set(&mut self, observer: &str, subject: &str, score: f32) -> f32 {
        if observer == subject || !score.is_finite() {
            return self.get(observer, subject);
        }
        self.store(observer, subject, score)
    }

    fn store(&mut self, observer: &str, subject: &str, raw: f32) -> f32 {
        let score = raw.clamp(0.0, 1.0);
        self.track(observer);
        self.track(subject);
        self.scores
            .entry(observer.to_string())
            .or_default()
            .insert(subject.to_string(), score);
        score
    }

    /// Observer's scores for every other tracked player, in id order.
    pub fn suspicions_of(&self, observer: &str) -> Vec<(String, f32)> {
        self.tracked
            .iter()
            .filter(|subject| subject.as_str() != observer)
            .map(|subject| (subject.clone(), self.get(observer, subject)))
            .collect()
    }

    /// The candidate the observer suspects most. Ties go to the earliest candidate.
    pub fn most_suspicious<'a>(&self, observer: &str, candidates: &[&'a str]) -> Option<(&'a str, f32)> {
        self.extreme(observer, candidates, |score, best| score > best)
    }

    /// The candidate the observer trusts most. Ties go to the earliest candidate.
    pub fn least_suspicious<'a>(&self, observer: &str, candidates: &[&'a str]) -> Option<(&'a str, f32)> {
        self.extreme(observer, candidates, |score, best| score < best)
    }

    fn extreme<'a>(
        &self,
        observer: &str,
        candidates: &[&'a str],
        better: impl Fn(f32, f32) -> bool,
    ) -> Option<(&'a str, f32)> {
        let mut best: Option<(&'a str, f32)> = None;
        for &candidate in candidates.iter().filter(|c| **c != observer) {
            let score = self.get(observer, candidate);
            match best {
                Some((_, best_score)) if !better(score, best_score) => {}
                _ => best = Some((candidate, score)),
            }
        }
        best
    }

    /// Mean suspicion held about `subject` by `observers` (excluding the subject).
    pub fn average_suspicion_of(&self, subject: &str, observers: &[&str]) -> f32 {
        let scores: Vec<f32> = observers
            .iter()
            .filter(|o| **o != subject)
            .map(|o| self.get(o, subject))
            .collect();
        if scores.is_empty() {
            return NEUTRAL_SUSPICION;
        }
        scores.iter().sum::<f32>() / scores.len() as f32
    }
}
