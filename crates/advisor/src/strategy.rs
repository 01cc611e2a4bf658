//! Strategy Advisor
//!
//! Ranks named strategies for a player. A strategy's score starts from its
//! recorded effectiveness and is adjusted by:
//!
//! - personality alignment with keywords in its name and description
//! - a phase-priority multiplier
//! - late-game and under-suspicion boosts
//!
//! Scores are clamped to [0, 1] and sorted descending with a stable sort,
//! so equal scores keep playbook order.

use serde::{Deserialize, Serialize};
use sim_model::{GameContext, Personality, Phase, Role, Strategy};
use std::sync::Arc;

use crate::config::StrategyConfig;
use crate::keywords::{alignment, contains_any, STRATEGY_TRAITS};
use crate::training::TrainingData;

/// Multiplier when a strategy mentions what the phase is about
pub const PHASE_KEYWORD_MULTIPLIER: f32 = 1.2;
/// Multiplier when a strategy's `best_phase` is the current phase
pub const BEST_PHASE_MULTIPLIER: f32 = 1.15;
pub const ENDGAME_BOOST: f32 = 0.15;
pub const DEFENSE_BOOST: f32 = 0.2;
/// Longest description excerpt quoted in guidance text
const EXCERPT_CHARS: usize = 120;

const ENDGAME_KEYWORDS: &[&str] = &["endgame", "end game", "final", "late game"];
const DEFENSE_KEYWORDS: &[&str] = &["defen", "deflect", "redirect"];

/// Keywords that mark a strategy as relevant to a phase.
fn phase_keywords(phase: Phase) -> &'static [&'static str] {
    match phase {
        Phase::Breakfast => &["breakfast", "reaction", "observe", "read the room"],
        Phase::Mission => &["mission", "sabotage", "perform", "team"],
        Phase::Social => &["alliance", "conversation", "bond", "information", "social"],
        Phase::RoundTable => &["vote", "accus", "banish", "round table", "defen"],
        Phase::Turret => &["murder", "target", "eliminat", "shield", "turret"],
    }
}

/// A ranked strategy with the reasons behind its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyRecommendation {
    pub strategy_name: String,
    pub description: String,
    pub score: f32,
    pub risk_level: String,
    pub reasoning: String,
}

/// Built-in strategies used when the playbook has nothing for a role.
pub fn default_strategies(role: Role) -> Vec<Strategy> {
    match role {
        Role::Traitor => vec![
            Strategy::new(
                "Blend In",
                "Stay close to the consensus, vote with the majority and avoid standing out.",
                0.6,
            )
            .with_phase("Round Table")
            .with_risk("low"),
            Strategy::new(
                "Strategic Accusation",
                "Accuse a Faithful who already draws suspicion so the room's attention moves away from you.",
                0.55,
            )
            .with_phase("Round Table")
            .with_risk("medium"),
            Strategy::new(
                "Murder the Detectives",
                "Target the Faithful who are tracking votes and getting close to the truth.",
                0.6,
            )
            .with_phase("Turret")
            .with_risk("medium"),
        ],
        Role::Faithful => vec![
            Strategy::new(
                "Evidence Gathering",
                "Track who votes for whom and who underperforms at missions before accusing anyone.",
                0.6,
            )
            .with_phase("Round Table")
            .with_risk("low"),
            Strategy::new(
                "Alliance Building",
                "Form a small trusted bond with players whose votes have been consistent.",
                0.55,
            )
            .with_phase("Social")
            .with_risk("low"),
            Strategy::new(
                "Vocal Leadership",
                "Confront suspects openly and rally the table behind a vote.",
                0.5,
            )
            .with_phase("Round Table")
            .with_risk("high"),
        ],
    }
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", cut.trim_end())
}

#[derive(Debug, Clone)]
pub struct StrategyAdvisor {
    data: Arc<TrainingData>,
    config: StrategyConfig,
}

impl StrategyAdvisor {
    pub fn new(data: Arc<TrainingData>, config: StrategyConfig) -> Self {
        Self { data, config }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Role strategies, then phase strategies, de-duplicated by name.
    fn candidates(&self, role: Role, phase: Phase) -> Vec<Strategy> {
        let mut out: Vec<Strategy> = Vec::new();
        let phase_pool = self.data.strategies_for_phase(phase).iter().filter(|s| {
            // Phase lists mix both sides; keep the other side's named strategies out
            let theirs = match role {
                Role::Traitor => &self.data.playbook().faithful_strategies,
                Role::Faithful => &self.data.playbook().traitor_strategies,
            };
            !theirs.iter().any(|t| t.strategy_name == s.strategy_name)
        });
        for strategy in self.data.strategies_for_role(role).into_iter().chain(phase_pool) {
            if !out.iter().any(|s| s.strategy_name == strategy.strategy_name) {
                out.push(strategy.clone());
            }
        }
        if out.is_empty() {
            tracing::debug!(role = %role, "no playbook strategies, using defaults");
            out = default_strategies(role);
        }
        out
    }

    /// Scores one strategy and explains the adjustments.
    pub fn score(
        &self,
        strategy: &Strategy,
        phase: Phase,
        personality: &Personality,
        context: &GameContext,
    ) -> (f32, String) {
        let text = strategy.search_text();
        let mut score = strategy.effectiveness_rating;
        let mut reasons = vec![format!("base effectiveness {:.2}", strategy.effectiveness_rating)];

        let (fit, traits) = alignment(&text, personality, STRATEGY_TRAITS);
        if !traits.is_empty() {
            score += fit;
            reasons.push(format!("{} fit {:+.2}", traits.join("/"), fit));
        }

        if contains_any(&text, phase_keywords(phase)) {
            score *= PHASE_KEYWORD_MULTIPLIER;
            reasons.push(format!("suits the {} phase", phase));
        }
        if Phase::from_label(&strategy.best_phase) == Some(phase) {
            score *= BEST_PHASE_MULTIPLIER;
            reasons.push("best played now".to_string());
        }

        if self.config.is_endgame(context)
            && contains_any(&text, ENDGAME_KEYWORDS)
        {
            score += ENDGAME_BOOST;
            reasons.push("endgame".to_string());
        }
        if self.config.under_suspicion(context)
            && contains_any(&text, DEFENSE_KEYWORDS)
        {
            score += DEFENSE_BOOST;
            reasons.push("you are under suspicion".to_string());
        }

        (score.clamp(0.0, 1.0), reasons.join("; "))
    }

    /// The `top_k` best strategies for this player right now.
    pub fn get_recommendations(
        &self,
        role: Role,
        phase: Phase,
        personality: &Personality,
        context: &GameContext,
        top_k: usize,
    ) -> Vec<StrategyRecommendation> {
        let mut ranked: Vec<StrategyRecommendation> = self
            .candidates(role, phase)
            .into_iter()
            .map(|strategy| {
                let (score, reasoning) = self.score(&strategy, phase, personality, context);
                StrategyRecommendation {
                    strategy_name: strategy.strategy_name,
                    description: strategy.description,
                    score,
                    risk_level: strategy.risk_level,
                    reasoning,
                }
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(top_k);
        ranked
    }

    fn top_line(&self, role: Role, phase: Phase, personality: &Personality, context: &GameContext) -> String {
        match self
            .get_recommendations(role, phase, personality, context, 1)
            .into_iter()
            .next()
        {
            Some(top) => format!("Recommended approach: {}: {}", top.strategy_name, excerpt(&top.description)),
            None => "Recommended approach: trust your read of the room.".to_string(),
        }
    }

    /// Guidance text for the Round Table vote.
    pub fn get_voting_guidance(&self, role: Role, personality: &Personality, context: &GameContext) -> String {
        let mut lines = vec![format!("Voting guidance ({}, day {}):", role, context.day)];
        match role {
            Role::Traitor => {
                lines.push("- Never lead a vote against a fellow Traitor; follow one only if refusing would expose you".into());
                lines.push("- Join a building consensus against a Faithful rather than starting one".into());
                lines.push("- Keep your stated reasons consistent with what you said earlier".into());
            }
            Role::Faithful => {
                lines.push("- Vote on evidence: mission performance, vote history, changed stories".into());
                lines.push("- Be wary of anyone steering the table toward a convenient target".into());
                lines.push("- A split vote helps the Traitors; consolidate when the case is strong".into());
            }
        }
        if personality.agreeableness >= 0.7 {
            lines.push("- You tend to go with the room: check the room is right first".into());
        }
        if personality.extraversion <= 0.3 {
            lines.push("- Say why you voted; silent votes look calculated".into());
        }
        if self.config.under_suspicion(context) {
            lines.push("- Eyes are on you: explain your vote calmly and early".into());
        }
        lines.push(self.top_line(role, Phase::RoundTable, personality, context));
        lines.join("\n")
    }

    /// Guidance text for choosing a murder victim.
    pub fn get_murder_guidance(&self, personality: &Personality, context: &GameContext) -> String {
        let mut lines = vec![format!("Murder guidance (day {}, {} alive):", context.day, context.alive_count)];
        lines.push("- Remove Faithful who are tracking votes and getting close to the truth".into());
        lines.push("- Avoid killing anyone you were seen clashing with today".into());
        lines.push("- A suspected Faithful is worth more alive as a future scapegoat".into());
        if self.config.is_endgame(context) {
            lines.push("- Endgame: count the votes; every Faithful removed now shifts the majority".into());
        }
        if personality.conscientiousness >= 0.7 {
            lines.push("- Pick the victim whose death leaves the fewest questions".into());
        }
        lines.push(self.top_line(Role::Traitor, Phase::Turret, personality, context));
        lines.join("\n")
    }

    /// Description, risk, counters and show examples of a named strategy.
    pub fn explain(&self, name: &str) -> Option<String> {
        let strategy = self.data.find_strategy(name).cloned().or_else(|| {
            default_strategies(Role::Traitor)
                .into_iter()
                .chain(default_strategies(Role::Faithful))
                .find(|s| s.strategy_name.eq_ignore_ascii_case(name))
        })?;

        let mut text = format!(
            "{} (effectiveness {:.0}%, {} risk)\n{}",
            strategy.strategy_name,
            strategy.effectiveness_rating * 100.0,
            strategy.risk_level,
            strategy.description
        );
        if !strategy.best_phase.is_empty() {
            text.push_str(&format!("\nBest phase: {}", strategy.best_phase));
        }
        if !strategy.counter_strategies.is_empty() {
            text.push_str(&format!("\nCountered by: {}", strategy.counter_strategies.join(", ")));
        }
        if !strategy.examples_from_show.is_empty() {
            text.push_str("\nSeen on the show:");
            for example in &strategy.examples_from_show {
                text.push_str(&format!("\n- {}", example));
            }
        }
        Some(text)
    }
}
