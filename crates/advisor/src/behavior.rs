//! Behavior Modulator
//!
//! Turns phase, role and personality into conduct guidance, suggests trust
//! adjustments from observed events, and perturbs decisions with
//! personality-driven hesitation or contrarianism.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sim_core::random::roll;
use sim_model::{GameContext, Personality, Phase, Role};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{BehaviorConfig, StrategyConfig};
use crate::training::TrainingData;

/// Trait level counted as "high" for personality tips.
const HIGH_TRAIT: f32 = 0.7;
/// Trait level counted as "low" for personality tips.
const LOW_TRAIT: f32 = 0.3;
const SAMPLED_EXPECTED: usize = 2;
const SAMPLED_AVOID: usize = 1;

pub const HESITATION_SUFFIX: &str = " (with hesitation)";
pub const CONTRARIAN_SUFFIX: &str = " (contrarian)";

/// Conduct guidance for one phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorGuidance {
    pub expected: Vec<String>,
    pub avoid: Vec<String>,
    pub tips: Vec<String>,
}

/// Something a player saw happen, as input to trust suggestions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObservedEvent {
    /// `target_role` is known once the target has been banished
    VoteCast {
        voter: String,
        target: String,
        #[serde(default)]
        target_role: Option<Role>,
    },
    Accusation {
        accuser: String,
        target: String,
    },
    MissionFailure {
        suspects: Vec<String>,
    },
    Defense {
        defender: String,
        convincing: bool,
    },
}

/// A suggested suspicion change. Positive deltas mean more suspicion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustUpdate {
    pub player_id: String,
    pub delta: f32,
    pub confidence: f32,
    pub reason: String,
}

impl TrustUpdate {
    fn new(player_id: &str, delta: f32, confidence: f32, reason: impl Into<String>) -> Self {
        Self {
            player_id: player_id.to_string(),
            delta,
            confidence,
            reason: reason.into(),
        }
    }
}

/// Fixed expectations per phase and role.
fn decision_table(phase: Phase, role: Role) -> (&'static [&'static str], &'static [&'static str]) {
    match (phase, role) {
        (Phase::Breakfast, Role::Traitor) => (
            &["React to the murder with convincing surprise", "Notice who looks relieved"],
            &["Knowing details of the murder before they are revealed"],
        ),
        (Phase::Breakfast, Role::Faithful) => (
            &["Watch who arrives and how they react", "Share your grief openly"],
            &["Accusing anyone before you have watched the room"],
        ),
        (Phase::Mission, Role::Traitor) => (
            &["Look committed to the team", "Sabotage only when it cannot be traced"],
            &["Obvious underperformance"],
        ),
        (Phase::Mission, Role::Faithful) => (
            &["Contribute to the prize pot", "Note who holds back"],
            &["Blaming teammates for honest mistakes"],
        ),
        (Phase::Social, Role::Traitor) => (
            &["Build trust with influential Faithful", "Plant doubt about a convenient target"],
            &["Being seen alone with your fellow Traitors"],
        ),
        (Phase::Social, Role::Faithful) => (
            &["Compare notes with people you trust", "Test stories for consistency"],
            &["Revealing your suspicions to everyone"],
        ),
        (Phase::RoundTable, Role::Traitor) => (
            &["Vote with the emerging consensus", "Give a plausible reason for your vote"],
            &["Defending a fellow Traitor too hard", "Starting a vote against a fellow Traitor"],
        ),
        (Phase::RoundTable, Role::Faithful) => (
            &["Vote on evidence", "Explain your reasoning"],
            &["Splitting the vote without a reason"],
        ),
        (Phase::Turret, Role::Traitor) => (
            &["Pick a victim who threatens the Traitors", "Agree quickly with your fellow Traitors"],
            &["Killing your closest ally, which draws attention"],
        ),
        (Phase::Turret, Role::Faithful) => (
            &["Rest and reflect on the day's votes"],
            &["Dwelling on fear of being murdered"],
        ),
    }
}

#[derive(Debug, Clone)]
pub struct BehaviorModulator {
    data: Arc<TrainingData>,
    config: BehaviorConfig,
    /// Endgame and self-suspicion thresholds, shared with strategy ranking
    situation: StrategyConfig,
}

impl BehaviorModulator {
    pub fn new(data: Arc<TrainingData>, config: BehaviorConfig, situation: StrategyConfig) -> Self {
        Self { data, config, situation }
    }

    fn personality_tips(&self, personality: &Personality) -> Vec<String> {
        let mut tips = Vec::new();
        if personality.neuroticism >= self.config.stress_tip_neuroticism {
            tips.push("Take a breath before speaking; stress shows and reads as guilt".to_string());
        }
        if personality.extraversion >= HIGH_TRAIT {
            tips.push("Let others talk first; dominating the table draws eyes".to_string());
        } else if personality.extraversion <= LOW_TRAIT {
            tips.push("Speak up at least once so your silence is not read as hiding".to_string());
        }
        if personality.agreeableness >= HIGH_TRAIT {
            tips.push("Do not follow the crowd just to keep the peace".to_string());
        }
        if personality.conscientiousness >= HIGH_TRAIT {
            tips.push("Use the details you have tracked; specifics persuade".to_string());
        }
        if personality.openness >= HIGH_TRAIT {
            tips.push("Keep your theories grounded in what people actually did".to_string());
        }
        tips
    }

    /// Guidance for `phase`: the fixed table for the role, personality and
    /// situation tips, then a sample of corpus norms for the phase.
    pub fn get_phase_guidance<R: Rng + ?Sized>(
        &self,
        phase: Phase,
        role: Role,
        personality: &Personality,
        context: &GameContext,
        rng: &mut R,
    ) -> BehaviorGuidance {
        let (expected, avoid) = decision_table(phase, role);
        let mut guidance = BehaviorGuidance {
            expected: expected.iter().map(|s| s.to_string()).collect(),
            avoid: avoid.iter().map(|s| s.to_string()).collect(),
            tips: self.personality_tips(personality),
        };

        if self.situation.under_suspicion(context) {
            guidance
                .tips
                .push("Suspicion is on you: address it directly rather than waiting".to_string());
        }
        if self.situation.is_endgame(context) {
            guidance
                .tips
                .push("Endgame: every vote counts, so count allies before acting".to_string());
        }

        if let Some(norms) = self.data.norms_for(phase) {
            for line in norms.expected_behaviors.choose_multiple(rng, SAMPLED_EXPECTED) {
                if !guidance.expected.contains(line) {
                    guidance.expected.push(line.clone());
                }
            }
            for line in norms.avoid_behaviors.choose_multiple(rng, SAMPLED_AVOID) {
                if !guidance.avoid.contains(line) {
                    guidance.avoid.push(line.clone());
                }
            }
        }
        guidance
    }

    /// Suspicion adjustments `observer_id` would make after seeing `events`.
    /// `current_suspicions` is the observer's own row. The observer's own
    /// votes are skipped and no update ever targets the observer.
    pub fn suggest_trust_updates(
        &self,
        observer_id: &str,
        observer_role: Role,
        personality: &Personality,
        events: &[ObservedEvent],
        current_suspicions: &BTreeMap<String, f32>,
    ) -> Vec<TrustUpdate> {
        let mut updates = Vec::new();
        for event in events {
            match event {
                ObservedEvent::VoteCast { voter, .. } if voter == observer_id => {}
                ObservedEvent::VoteCast { voter, target, target_role } => {
                    match (observer_role, target_role) {
                        (Role::Faithful, Some(Role::Faithful)) => updates.push(TrustUpdate::new(
                            voter,
                            0.1 + personality.neuroticism * 0.1,
                            0.7,
                            format!("voted against {}, who was Faithful", target),
                        )),
                        (Role::Faithful, Some(Role::Traitor)) => updates.push(TrustUpdate::new(
                            voter,
                            -0.1,
                            0.7,
                            format!("voted against {}, who was a Traitor", target),
                        )),
                        (Role::Traitor, Some(Role::Traitor)) => updates.push(TrustUpdate::new(
                            voter,
                            0.15,
                            0.7,
                            format!("voted out fellow Traitor {}; a threat", target),
                        )),
                        (Role::Traitor, Some(Role::Faithful)) => {}
                        (_, None) => {
                            // Unknown role: agreeing with my read is reassuring
                            let mine = current_suspicions.get(target).copied().unwrap_or(0.5);
                            let (delta, why) = if mine >= 0.5 {
                                (-0.05, "shares my suspicion of")
                            } else {
                                (0.05, "voted against")
                            };
                            updates.push(TrustUpdate::new(voter, delta, 0.4, format!("{} {}", why, target)));
                        }
                    }
                }
                ObservedEvent::Accusation { accuser, target } => {
                    updates.push(TrustUpdate::new(
                        target,
                        0.05 * (1.0 - personality.conscientiousness * 0.5),
                        0.3,
                        format!("accused by {}", accuser),
                    ));
                    updates.push(TrustUpdate::new(
                        accuser,
                        0.02 + personality.agreeableness * 0.04,
                        0.3,
                        format!("made an accusation against {}", target),
                    ));
                }
                ObservedEvent::MissionFailure { suspects } => {
                    for suspect in suspects {
                        updates.push(TrustUpdate::new(
                            suspect,
                            0.04 + personality.openness * 0.04,
                            0.4,
                            "involved in a failed mission",
                        ));
                    }
                }
                ObservedEvent::Defense { defender, convincing } => {
                    let update = if *convincing {
                        TrustUpdate::new(
                            defender,
                            -0.05 - personality.agreeableness * 0.05,
                            0.35,
                            "gave a convincing defense",
                        )
                    } else {
                        TrustUpdate::new(defender, 0.05, 0.35, "gave a weak defense")
                    };
                    updates.push(update);
                }
            }
        }
        updates.retain(|u| u.player_id != observer_id);
        updates
    }

    /// Decorates `base` with personality-driven hesitation or contrarianism.
    /// `stress` is in [0, 1].
    pub fn modulate_decision<R: Rng + ?Sized>(
        &self,
        base: &str,
        personality: &Personality,
        stress: f32,
        rng: &mut R,
    ) -> String {
        let mut decision = base.to_string();
        let hesitation = personality.neuroticism * stress.clamp(0.0, 1.0) * self.config.hesitation_factor;
        if roll(rng, hesitation) {
            decision.push_str(HESITATION_SUFFIX);
        }
        if personality.agreeableness <= self.config.contrarian_agreeableness_max
            && roll(rng, self.config.contrarian_probability)
        {
            decision.push_str(CONTRARIAN_SUFFIX);
        }
        decision
    }
}
