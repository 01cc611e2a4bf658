//! Heuristic agents
//!
//! Plays every contestant with simple rules. All actions go through the
//! game tools, so the same validation applies as for any other decision
//! layer. The advisor supplies reasoning text and trust feedback.

use advisor::{Advisor, ObservedEvent};
use serde_json::json;
use sim_core::{dispatch, GameEvent, GameSession, GameState, TrustMatrix};
use sim_model::{GameContext, MissionResult, Player, Role};
use std::collections::BTreeMap;

/// Performance below this after a failed mission makes a player a suspect.
const SUSPECT_PERFORMANCE: f32 = 0.3;

/// Who `voter` should vote for: the alive player they suspect most.
/// Traitors leave their teammates out while any Faithful remain.
pub fn vote_target(state: &GameState, trust: &TrustMatrix, voter: &Player) -> Option<String> {
    let mut candidates: Vec<&str> = state
        .alive_players()
        .into_iter()
        .filter(|p| p.id != voter.id)
        .filter(|p| !(voter.is_traitor() && p.is_traitor()))
        .map(|p| p.id.as_str())
        .collect();
    if candidates.is_empty() {
        candidates = state.alive_ids().into_iter().filter(|id| *id != voter.id).collect();
    }
    trust
        .most_suspicious(&voter.id, &candidates)
        .map(|(id, _)| id.to_string())
}

/// The Faithful who suspects the alive Traitors most, on average.
pub fn murder_target(state: &GameState, trust: &TrustMatrix) -> Option<String> {
    let traitors: Vec<&str> = state
        .alive_with_role(Role::Traitor)
        .into_iter()
        .map(|p| p.id.as_str())
        .collect();
    if traitors.is_empty() {
        return None;
    }

    let mut best: Option<(&str, f32)> = None;
    for faithful in state.alive_with_role(Role::Faithful) {
        let threat = traitors.iter().map(|t| trust.get(&faithful.id, t)).sum::<f32>() / traitors.len() as f32;
        if best.map_or(true, |(_, top)| threat > top) {
            best = Some((faithful.id.as_str(), threat));
        }
    }
    best.map(|(id, _)| id.to_string())
}

fn game_context(session: &mut GameSession, player_id: &str) -> GameContext {
    session
        .with_tools(player_id, |ctx| ctx.game_context())
        .unwrap_or_default()
}

/// Every alive player casts a vote through `cast_vote`.
pub fn play_round_table(session: &mut GameSession, advisor: &Advisor) {
    let voters: Vec<Player> = session.state().alive_players().into_iter().cloned().collect();
    for voter in &voters {
        let Some(target) = vote_target(session.state(), session.trust(), voter) else {
            continue;
        };
        let context = game_context(session, &voter.id);
        let top = advisor
            .strategy
            .get_recommendations(voter.role, context.phase, &voter.personality, &context, 1)
            .into_iter()
            .next()
            .map(|r| r.strategy_name)
            .unwrap_or_else(|| "gut feeling".to_string());
        let base = format!("voting {} ({})", target, top);
        let reasoning = advisor.behavior.modulate_decision(
            &base,
            &voter.personality,
            context.suspicion_on_self,
            session.rng(),
        );

        let outcome = session.with_tools(&voter.id, |ctx| {
            dispatch(
                "cast_vote",
                &json!({ "target_player_id": target, "reasoning": reasoning }),
                ctx,
            )
        });
        if !outcome.is_success() {
            tracing::warn!(voter = %voter.id, ?outcome, "vote rejected");
        }
    }
}

/// The first alive Traitor picks tonight's victim through `choose_murder_victim`.
pub fn play_turret(session: &mut GameSession, advisor: &Advisor) {
    let Some(leader) = session.state().alive_with_role(Role::Traitor).first().map(|p| (*p).clone()) else {
        return;
    };
    let Some(victim) = murder_target(session.state(), session.trust()) else {
        return;
    };
    let context = game_context(session, &leader.id);
    let guidance = advisor.strategy.get_murder_guidance(&leader.personality, &context);
    let reasoning = guidance.lines().last().unwrap_or_default().to_string();

    let outcome = session.with_tools(&leader.id, |ctx| {
        dispatch(
            "choose_murder_victim",
            &json!({ "victim_id": victim, "reasoning": reasoning }),
            ctx,
        )
    });
    if !outcome.is_success() {
        tracing::warn!(murderer = %leader.id, ?outcome, "murder choice rejected");
    }
}

/// Today's votes as observed events, with the banished player's role revealed.
pub fn round_table_events(state: &GameState, banished: Option<(&str, Role)>) -> Vec<ObservedEvent> {
    state
        .history
        .iter()
        .filter_map(|event| match event {
            GameEvent::VoteCast { day, voter, target } if *day == state.day => Some(ObservedEvent::VoteCast {
                voter: voter.clone(),
                target: target.clone(),
                target_role: banished.filter(|(id, _)| *id == target.as_str()).map(|(_, role)| role),
            }),
            _ => None,
        })
        .collect()
}

/// A failed mission makes its weakest performers suspects.
pub fn mission_events(result: &MissionResult) -> Vec<ObservedEvent> {
    if result.success {
        return Vec::new();
    }
    let suspects: Vec<String> = result
        .performance_scores
        .iter()
        .filter(|(_, score)| **score < SUSPECT_PERFORMANCE)
        .map(|(id, _)| id.clone())
        .collect();
    if suspects.is_empty() {
        Vec::new()
    } else {
        vec![ObservedEvent::MissionFailure { suspects }]
    }
}

/// Feeds `events` to every alive player and applies the suggested changes
/// through `update_suspicion`. Deltas are scaled by their confidence.
pub fn absorb_events(session: &mut GameSession, advisor: &Advisor, events: &[ObservedEvent]) {
    if events.is_empty() {
        return;
    }
    let observers: Vec<Player> = session.state().alive_players().into_iter().cloned().collect();
    for observer in &observers {
        let mine: BTreeMap<String, f32> = session.trust().suspicions_of(&observer.id).into_iter().collect();
        let updates = advisor
            .behavior
            .suggest_trust_updates(&observer.id, observer.role, &observer.personality, events, &mine);

        for update in &updates {
            let current = session.trust().get(&observer.id, &update.player_id);
            let new_score = (current + update.delta * update.confidence).clamp(0.0, 1.0);
            let outcome = session.with_tools(&observer.id, |ctx| {
                dispatch(
                    "update_suspicion",
                    &json!({
                        "player_id": update.player_id,
                        "new_score": new_score,
                        "reason": update.reason,
                    }),
                    ctx,
                )
            });
            if !outcome.is_success() {
                tracing::debug!(observer = %observer.id, ?outcome, "suspicion update rejected");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::SimConfig;
    use sim_model::fixtures::sample_roster;

    #[test]
    fn test_vote_target_picks_most_suspected() {
        let state = GameState::new(sample_roster());
        let mut trust = TrustMatrix::with_players(state.players.iter().map(|p| p.id.clone()));
        trust.set("p0", "p4", 0.9);

        let voter = state.player("p0").unwrap();
        assert_eq!(vote_target(&state, &trust, voter).as_deref(), Some("p4"));
    }

    #[test]
    fn test_traitor_avoids_teammate() {
        let state = GameState::new(sample_roster());
        let mut trust = TrustMatrix::with_players(state.players.iter().map(|p| p.id.clone()));
        trust.set("p1", "p3", 1.0);
        trust.set("p1", "p2", 0.7);

        let traitor = state.player("p1").unwrap();
        assert_eq!(vote_target(&state, &trust, traitor).as_deref(), Some("p2"));
    }

    #[test]
    fn test_murder_target_is_biggest_threat() {
        let state = GameState::new(sample_roster());
        let mut trust = TrustMatrix::with_players(state.players.iter().map(|p| p.id.clone()));
        trust.set("p5", "p1", 0.9);
        trust.set("p5", "p3", 0.8);

        assert_eq!(murder_target(&state, &trust).as_deref(), Some("p5"));
    }

    #[test]
    fn test_mission_events() {
        let mut result = MissionResult::empty(sim_model::MissionKind::LaserHeist, "");
        result.performance_scores.insert("p0".into(), 0.1);
        result.performance_scores.insert("p1".into(), 0.9);
        assert_eq!(
            mission_events(&result),
            vec![ObservedEvent::MissionFailure {
                suspects: vec!["p0".into()]
            }]
        );

        result.success = true;
        assert!(mission_events(&result).is_empty());
    }

    #[test]
    fn test_round_table_reveals_banished_role() {
        let mut config = SimConfig::default();
        config.game.recruitment_enabled = false;
        let mut session = GameSession::new(sample_roster(), config);
        let advisor = Advisor::new(Default::default(), Default::default());

        session.run_mission();
        session.begin_round_table();
        play_round_table(&mut session, &advisor);
        let banished = session.resolve_round_table().expect("votes were cast");

        let events = round_table_events(session.state(), Some((banished.player_id.as_str(), banished.role)));
        assert_eq!(events.len(), 6);
        assert!(events.iter().any(|e| matches!(
            e,
            ObservedEvent::VoteCast { target, target_role: Some(_), .. } if *target == banished.player_id
        )));
    }
}
