//! Dialogue Generator
//!
//! Picks speech for a conversational context from corpus phrases, scored
//! against personality the same way strategies are, and infers the
//! emotional state the line is delivered in.

use rand::Rng;
use serde::{Deserialize, Serialize};
use sim_core::random::weighted_index;
use sim_model::{Personality, Role};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::DialogueConfig;
use crate::keywords::{alignment, PHRASE_TRAITS};
use crate::training::TrainingData;

/// Floor for a phrase's selection weight so every candidate stays possible.
const MIN_PHRASE_WEIGHT: f32 = 0.05;

pub const NEUTRAL_EMOTION: &str = "neutral";

/// Trait bias of an emotion; the adjustment is `1 + bias`.
fn trait_bias(emotion: &str, p: &Personality) -> Option<f32> {
    let bias = match emotion {
        "crying" => 0.6 * p.neuroticism + 0.2 * p.agreeableness,
        "laughing" => 0.4 * p.extraversion - 0.2 * p.neuroticism,
        "shouting" => 0.4 * p.extraversion - 0.5 * p.agreeableness,
        "whispering" => 0.2 * p.conscientiousness - 0.5 * p.extraversion,
        "nervous" => 0.7 * p.neuroticism - 0.2 * p.extraversion,
        "confident" => 0.3 * p.extraversion - 0.5 * p.neuroticism,
        "shocked" => 0.3 * p.openness + 0.2 * p.neuroticism,
        _ => return None,
    };
    Some(bias)
}

/// Personality multiplier for an emotion, floored at zero. Unknown
/// emotions are unweighted.
pub fn emotion_adjustment(emotion: &str, personality: &Personality) -> f32 {
    trait_bias(&emotion.to_lowercase(), personality)
        .map(|bias| 1.0 + bias)
        .unwrap_or(1.0)
        .max(0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalState {
    pub emotion: String,
    /// In [0, 1]
    pub intensity: f32,
}

impl EmotionalState {
    pub fn neutral() -> Self {
        Self {
            emotion: NEUTRAL_EMOTION.to_string(),
            intensity: 0.0,
        }
    }
}

/// A generated line of speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub text: String,
    pub emotion: String,
    pub intensity: f32,
    pub context: String,
}

fn fallback_lines(context: &str, role: Role) -> &'static [&'static str] {
    match (context, role) {
        ("breakfast", _) => &["I'm just relieved to see who walked through that door.", "Another one gone. I can't believe it."],
        ("round_table", Role::Traitor) => &[
            "I've been watching the votes, and something doesn't add up.",
            "I'm going with my gut on this one.",
        ],
        ("round_table", Role::Faithful) => &[
            "Look at how people voted last night. That tells you everything.",
            "I'm voting on what I've seen, nothing else.",
        ],
        ("accusation", _) => &["I think you're a Traitor, and I'm not afraid to say it."],
        ("defense", _) => &["I am Faithful. I have been from day one."],
        ("mission", _) => &["Let's get this money in the pot."],
        (_, Role::Traitor) => &["We all want the same thing here, don't we?"],
        (_, Role::Faithful) => &["I just want to find the Traitors."],
    }
}

#[derive(Debug, Clone)]
pub struct DialogueGenerator {
    data: Arc<TrainingData>,
    config: DialogueConfig,
}

impl DialogueGenerator {
    pub fn new(data: Arc<TrainingData>, config: DialogueConfig) -> Self {
        Self { data, config }
    }

    /// Emotion markers for a context, or every context's markers merged
    /// when it has none.
    fn markers_for(&self, context: &str) -> BTreeMap<String, u32> {
        if let Some(template) = self.data.dialogue_for(context) {
            if !template.emotional_markers.is_empty() {
                return template.emotional_markers.clone();
            }
        }
        let mut merged: BTreeMap<String, u32> = BTreeMap::new();
        for template in self.data.dialogue_templates.values() {
            for (emotion, count) in &template.emotional_markers {
                *merged.entry(emotion.clone()).or_default() += count;
            }
        }
        merged
    }

    /// Samples an emotion with probability proportional to
    /// `count * emotion_adjustment`.
    pub fn infer_emotion<R: Rng + ?Sized>(
        &self,
        context: &str,
        personality: &Personality,
        rng: &mut R,
    ) -> EmotionalState {
        let markers = self.markers_for(context);
        let weighted: Vec<(&String, f32)> = markers
            .iter()
            .map(|(emotion, count)| (emotion, *count as f32 * emotion_adjustment(emotion, personality)))
            .collect();
        let max = weighted.iter().map(|(_, w)| *w).fold(0.0_f32, f32::max);
        if max <= 0.0 {
            return EmotionalState::neutral();
        }

        let weights: Vec<f32> = weighted.iter().map(|(_, w)| *w).collect();
        match weighted_index(rng, &weights) {
            Some(i) => {
                let (emotion, weight) = weighted[i];
                EmotionalState {
                    emotion: emotion.clone(),
                    intensity: (weight / max * self.config.intensity_scale).min(1.0),
                }
            }
            None => EmotionalState::neutral(),
        }
    }

    /// Selection weight of one phrase for a personality.
    pub fn phrase_weight(phrase: &str, personality: &Personality) -> f32 {
        let (fit, _) = alignment(&phrase.to_lowercase(), personality, PHRASE_TRAITS);
        (1.0 + fit).max(MIN_PHRASE_WEIGHT)
    }

    /// A line for `context`, chosen from corpus phrases weighted by
    /// personality fit. Falls back to built-in lines for empty contexts.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        context: &str,
        role: Role,
        personality: &Personality,
        rng: &mut R,
    ) -> DialogueLine {
        let emotion = self.infer_emotion(context, personality, rng);

        let corpus: Vec<&str> = self
            .data
            .dialogue_for(context)
            .map(|t| t.phrases.iter().map(String::as_str).filter(|p| !p.trim().is_empty()).collect())
            .unwrap_or_default();
        let candidates: Vec<&str> = if corpus.is_empty() {
            fallback_lines(context, role).to_vec()
        } else {
            corpus
        };

        let weights: Vec<f32> = candidates
            .iter()
            .map(|phrase| Self::phrase_weight(phrase, personality))
            .collect();
        let text = weighted_index(rng, &weights)
            .and_then(|i| candidates.get(i))
            .map(|s| s.to_string())
            .unwrap_or_default();

        tracing::trace!(context, emotion = %emotion.emotion, "dialogue generated");
        DialogueLine {
            text,
            emotion: emotion.emotion,
            intensity: emotion.intensity,
            context: context.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use sim_model::DialogueTemplate;

    fn generator(templates: Vec<(&str, DialogueTemplate)>) -> DialogueGenerator {
        let mut data = TrainingData::default();
        for (context, template) in templates {
            data.dialogue_templates.insert(context.to_string(), template);
        }
        DialogueGenerator::new(Arc::new(data), DialogueConfig::default())
    }

    fn template(phrases: &[&str], markers: &[(&str, u32)]) -> DialogueTemplate {
        DialogueTemplate {
            phrases: phrases.iter().map(|s| s.to_string()).collect(),
            emotional_markers: markers.iter().map(|(e, c)| (e.to_string(), *c)).collect(),
            phase: None,
        }
    }

    #[test]
    fn test_emotion_adjustment() {
        let anxious = Personality::new(0.5, 0.5, 0.5, 0.5, 1.0);
        let calm = Personality::new(0.5, 0.5, 0.5, 0.5, 0.0);
        assert!(emotion_adjustment("crying", &anxious) > emotion_adjustment("crying", &calm));
        assert_eq!(emotion_adjustment("yawning", &anxious), 1.0);

        // Strongly agreeable introverts shout half as often
        let meek = Personality::new(0.5, 0.5, 0.0, 1.0, 0.5);
        assert!((emotion_adjustment("shouting", &meek) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_no_markers_is_neutral() {
        let mut rng = SmallRng::seed_from_u64(1);
        let state = generator(vec![]).infer_emotion("breakfast", &Personality::default(), &mut rng);
        assert_eq!(state, EmotionalState::neutral());
    }

    #[test]
    fn test_single_marker_intensity() {
        let mut rng = SmallRng::seed_from_u64(1);
        let gen = generator(vec![("breakfast", template(&[], &[("shocked", 4)]))]);
        let state = gen.infer_emotion("breakfast", &Personality::default(), &mut rng);
        assert_eq!(state.emotion, "shocked");
        assert!((state.intensity - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_markers_fall_back_to_all_contexts() {
        let mut rng = SmallRng::seed_from_u64(1);
        let gen = generator(vec![("round_table", template(&[], &[("shouting", 3)]))]);
        let state = gen.infer_emotion("turret", &Personality::default(), &mut rng);
        assert_eq!(state.emotion, "shouting");
    }

    #[test]
    fn test_emotion_intensity_bounded() {
        let mut rng = SmallRng::seed_from_u64(9);
        let gen = generator(vec![(
            "round_table",
            template(&[], &[("crying", 2), ("shouting", 5), ("confident", 1)]),
        )]);
        for _ in 0..100 {
            let state = gen.infer_emotion("round_table", &Personality::uniform(0.8), &mut rng);
            assert!((0.0..=1.0).contains(&state.intensity));
        }
    }

    #[test]
    fn test_generate_uses_corpus() {
        let mut rng = SmallRng::seed_from_u64(2);
        let gen = generator(vec![("accusation", template(&["You're a liar!", "Maybe it was you?"], &[]))]);
        let line = gen.generate("accusation", Role::Faithful, &Personality::default(), &mut rng);
        assert!(line.text == "You're a liar!" || line.text == "Maybe it was you?");
        assert_eq!(line.context, "accusation");
        assert_eq!(line.emotion, NEUTRAL_EMOTION);
    }

    #[test]
    fn test_generate_fallback() {
        let mut rng = SmallRng::seed_from_u64(2);
        let line = generator(vec![]).generate("round_table", Role::Traitor, &Personality::default(), &mut rng);
        assert!(fallback_lines("round_table", Role::Traitor).contains(&line.text.as_str()));
    }

    #[test]
    fn test_phrase_weight_follows_personality() {
        let loud = Personality::new(0.5, 0.5, 1.0, 0.5, 0.5);
        let quiet = Personality::new(0.5, 0.5, 0.0, 0.5, 0.5);
        let phrase = "Liar! Look me in the eye";
        assert!(DialogueGenerator::phrase_weight(phrase, &loud) > DialogueGenerator::phrase_weight(phrase, &quiet));
        assert!(DialogueGenerator::phrase_weight(phrase, &quiet) >= MIN_PHRASE_WEIGHT);
    }
}
