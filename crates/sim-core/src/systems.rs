//! Round Systems
//!
//! ECS systems for one day of play, grouped into three schedules that the
//! session runs in strict turn order:
//!
//! 1. Mission: open the day, run the rotating mission, check for a winner
//! 2. Round Table: tally votes, banish, check for a winner, maybe recruit
//! 3. Turret: carry out the Traitors' murder, check for a winner, end the day

use bevy_ecs::prelude::*;
use rand::Rng;
use serde::Serialize;
use sim_model::{MissionResult, Phase, Role};
use std::collections::BTreeMap;

use crate::config::SimConfig;
use crate::missions::Mission;
use crate::random::SimRng;
use crate::state::{GameEvent, GameState};
use crate::tools::{MurderChoice, VoteRecord};
use crate::trust::TrustMatrix;

/// Resource: votes collected before the Round Table resolves
#[derive(Resource, Debug, Default)]
pub struct VoteBox {
    pub votes: Vec<VoteRecord>,
}

impl VoteBox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vote, replacing any earlier vote by the same voter.
    pub fn cast(&mut self, record: VoteRecord) {
        self.votes.retain(|v| v.voter != record.voter);
        self.votes.push(record);
    }

    pub fn clear(&mut self) {
        self.votes.clear();
    }
}

/// Resource: the murder the Traitors settled on
#[derive(Resource, Debug, Default)]
pub struct MurderOrder {
    pub choice: Option<MurderChoice>,
}

/// Outcome of a Round Table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Banishment {
    pub player_id: String,
    pub role: Role,
    pub votes: usize,
    /// Whether a random draw settled a tie
    pub tie_break: bool,
}

/// Resource: what happened today
#[derive(Resource, Debug, Clone, Default, Serialize)]
pub struct DayReport {
    pub day: u32,
    pub mission: Option<MissionResult>,
    pub banished: Option<Banishment>,
    pub murdered: Option<String>,
    pub recruited: Option<String>,
}

/// Plurality count over valid votes.
///
/// Votes from dead voters or for dead targets are dropped. Ties are broken
/// by a uniform draw among the tied targets.
pub fn tally_votes<R: Rng + ?Sized>(
    votes: &[VoteRecord],
    state: &GameState,
    rng: &mut R,
) -> Option<(String, usize, bool)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for vote in votes {
        if state.is_alive(&vote.voter) && state.is_alive(&vote.target) && vote.voter != vote.target {
            *counts.entry(vote.target.as_str()).or_insert(0) += 1;
        }
    }

    let top = counts.values().copied().max()?;
    let tied: Vec<&str> = counts
        .iter()
        .filter(|(_, &n)| n == top)
        .map(|(id, _)| *id)
        .collect();
    let tie_break = tied.len() > 1;
    let chosen = if tie_break {
        tied[rng.gen_range(0..tied.len())]
    } else {
        tied[0]
    };
    Some((chosen.to_string(), top, tie_break))
}

/// System: resets the day report and enters the Mission phase
pub fn start_day(mut state: ResMut<GameState>, mut report: ResMut<DayReport>) {
    *report = DayReport {
        day: state.day,
        ..DayReport::default()
    };
    if state.phase == Phase::Breakfast {
        state.advance_phase();
    }
}

/// System: runs the day's mission and banks the earnings
pub fn run_daily_mission(
    config: Res<SimConfig>,
    mut state: ResMut<GameState>,
    mut trust: ResMut<TrustMatrix>,
    mut rng: ResMut<SimRng>,
    mut report: ResMut<DayReport>,
) {
    if state.is_over() {
        return;
    }

    let mission = Mission::for_day(state.day, config.mission);
    let result = mission.execute(&state, &mut trust, &mut rng.0);

    state.add_earnings(result.earnings);
    let day = state.day;
    state.record(GameEvent::MissionCompleted {
        day,
        mission: result.mission,
        earnings: result.earnings,
        success: result.success,
    });
    tracing::info!(
        day,
        mission = %result.mission,
        earnings = result.earnings,
        prize_pot = state.prize_pot,
        "mission complete"
    );

    // Mission -> Social
    if state.phase == Phase::Mission {
        state.advance_phase();
    }
    report.mission = Some(result);
}

/// System: counts the votes and banishes the plurality target
pub fn tally_round_table(
    mut state: ResMut<GameState>,
    mut votes: ResMut<VoteBox>,
    mut rng: ResMut<SimRng>,
    mut report: ResMut<DayReport>,
) {
    state.phase = Phase::RoundTable;
    if state.is_over() {
        votes.clear();
        return;
    }

    let day = state.day;
    let cast: Vec<GameEvent> = votes
        .votes
        .iter()
        .filter(|v| state.is_alive(&v.voter))
        .map(|v| GameEvent::VoteCast {
            day,
            voter: v.voter.clone(),
            target: v.target.clone(),
        })
        .collect();
    for event in cast {
        state.record(event);
    }

    match tally_votes(&votes.votes, &state, &mut rng.0) {
        Some((target, count, tie_break)) => match state.banish(&target, count) {
            Ok(role) => {
                report.banished = Some(Banishment {
                    player_id: target,
                    role,
                    votes: count,
                    tie_break,
                });
            }
            Err(err) => tracing::warn!(error = %err, "banishment failed"),
        },
        None => tracing::info!(day, "round table ended without a valid vote"),
    }
    votes.clear();
}

/// System: a lone surviving Traitor recruits the Faithful they trust most
pub fn recruit_lone_traitor(
    config: Res<SimConfig>,
    mut state: ResMut<GameState>,
    trust: Res<TrustMatrix>,
    mut report: ResMut<DayReport>,
) {
    if !config.game.recruitment_enabled || state.recruitment_used || state.is_over() {
        return;
    }
    let lost_teammate = state
        .history
        .iter()
        .any(|e| matches!(e, GameEvent::Banished { role: Role::Traitor, .. }));
    if !lost_teammate || state.traitors_alive() != 1 {
        return;
    }

    let Some(recruiter) = state.alive_with_role(Role::Traitor).first().map(|p| p.id.clone()) else {
        return;
    };
    let faithful: Vec<String> = state
        .alive_with_role(Role::Faithful)
        .iter()
        .map(|p| p.id.clone())
        .collect();
    let candidates: Vec<&str> = faithful.iter().map(String::as_str).collect();
    let Some((recruit, _)) = trust.least_suspicious(&recruiter, &candidates) else {
        return;
    };
    let recruit = recruit.to_string();

    match state.recruit(&recruit, &recruiter) {
        Ok(()) => report.recruited = Some(recruit),
        Err(err) => tracing::warn!(error = %err, "recruitment failed"),
    }
}

/// System: carries out the Traitors' murder if it is still valid
pub fn resolve_turret(
    mut state: ResMut<GameState>,
    mut order: ResMut<MurderOrder>,
    mut report: ResMut<DayReport>,
) {
    state.phase = Phase::Turret;
    let Some(choice) = order.choice.take() else {
        return;
    };
    if state.is_over() {
        return;
    }

    let murderer_ok = state
        .player(&choice.murderer)
        .is_some_and(|p| p.alive && p.is_traitor());
    let victim_ok = state
        .player(&choice.victim)
        .is_some_and(|p| p.alive && !p.is_traitor());
    if !(murderer_ok && victim_ok) {
        tracing::warn!(murderer = %choice.murderer, victim = %choice.victim, "stale murder order dropped");
        return;
    }

    match state.murder(&choice.victim) {
        Ok(()) => report.murdered = Some(choice.victim),
        Err(err) => tracing::warn!(error = %err, "murder failed"),
    }
}

/// System: ends the day, rolling over to the next Breakfast
pub fn end_day(config: Res<SimConfig>, mut state: ResMut<GameState>) {
    if state.is_over() {
        return;
    }
    state.advance_phase();
    state.check_winner(config.game.final_players, config.game.max_days);
}

/// System: records a winner once a win condition holds
pub fn check_end_conditions(config: Res<SimConfig>, mut state: ResMut<GameState>) {
    state.check_winner(config.game.final_players, config.game.max_days);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use sim_model::fixtures::sample_roster;

    fn vote(voter: &str, target: &str) -> VoteRecord {
        VoteRecord {
            voter: voter.into(),
            target: target.into(),
            reasoning: String::new(),
        }
    }

    #[test]
    fn test_tally_plurality() {
        let state = GameState::new(sample_roster());
        let mut rng = SmallRng::seed_from_u64(1);
        let votes = vec![vote("p0", "p1"), vote("p2", "p1"), vote("p3", "p0")];

        assert_eq!(tally_votes(&votes, &state, &mut rng), Some(("p1".into(), 2, false)));
    }

    #[test]
    fn test_tally_discards_dead_votes() {
        let mut state = GameState::new(sample_roster());
        state.murder("p4").unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        // p4 is dead: both its vote and votes for it are dropped
        let votes = vec![vote("p4", "p2"), vote("p4", "p1"), vote("p0", "p4"), vote("p5", "p3")];

        assert_eq!(tally_votes(&votes, &state, &mut rng), Some(("p3".into(), 1, false)));
        assert_eq!(tally_votes(&[vote("p0", "p4")], &state, &mut rng), None);
    }

    #[test]
    fn test_tie_break_picks_a_tied_target() {
        let state = GameState::new(sample_roster());
        let mut rng = SmallRng::seed_from_u64(99);
        let votes = vec![vote("p0", "p1"), vote("p2", "p3")];

        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..50 {
            let (target, count, tie) = tally_votes(&votes, &state, &mut rng).unwrap();
            assert!(tie);
            assert_eq!(count, 1);
            seen.insert(target);
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_vote_box_replaces_earlier_vote() {
        let mut ballot = VoteBox::new();
        ballot.cast(vote("p0", "p1"));
        ballot.cast(vote("p0", "p3"));
        assert_eq!(ballot.votes.len(), 1);
        assert_eq!(ballot.votes[0].target, "p3");
    }

    #[test]
    fn test_recruitment_after_lost_teammate() {
        let mut world = World::new();
        let mut state = GameState::new(sample_roster());
        state.banish("p3", 4).unwrap();
        let mut trust = TrustMatrix::with_players(state.alive_ids());
        trust.set("p1", "p4", 0.1);

        world.insert_resource(state);
        world.insert_resource(trust);
        world.insert_resource(SimConfig::default());
        world.insert_resource(DayReport::default());

        let mut schedule = Schedule::default();
        schedule.add_systems(recruit_lone_traitor);
        schedule.run(&mut world);

        let state = world.resource::<GameState>();
        assert!(state.player("p4").unwrap().is_traitor());
        assert!(state.recruitment_used);
        assert_eq!(world.resource::<DayReport>().recruited.as_deref(), Some("p4"));
    }

    #[test]
    fn test_stale_murder_order_dropped() {
        let mut world = World::new();
        let mut state = GameState::new(sample_roster());
        state.banish("p1", 3).unwrap();
        world.insert_resource(state);
        world.insert_resource(DayReport::default());
        world.insert_resource(MurderOrder {
            choice: Some(MurderChoice {
                murderer: "p1".into(),
                victim: "p0".into(),
                reasoning: String::new(),
            }),
        });

        let mut schedule = Schedule::default();
        schedule.add_systems(resolve_turret);
        schedule.run(&mut world);

        assert!(world.resource::<GameState>().is_alive("p0"));
        assert!(world.resource::<MurderOrder>().choice.is_none());
    }
}
