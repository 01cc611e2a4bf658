//! Game Session
//!
//! One isolated game: a `bevy_ecs` world holding the game state, trust
//! matrix, seeded RNG and config, plus the three day schedules. Nothing is
//! shared between sessions, so independent games can run on separate
//! threads.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use sim_model::{MissionResult, Phase, Player};

use crate::config::SimConfig;
use crate::random::{game_id_for_seed, SimRng};
use crate::setup::generate_roster;
use crate::state::{GameState, Winner};
use crate::systems::{
    check_end_conditions, end_day, recruit_lone_traitor, resolve_turret, run_daily_mission,
    start_day, tally_round_table, Banishment, DayReport, MurderOrder, VoteBox,
};
use crate::tools::{ToolContext, VoteRecord};
use crate::trust::TrustMatrix;

pub struct GameSession {
    world: World,
    mission: Schedule,
    round_table: Schedule,
    turret: Schedule,
}

impl GameSession {
    /// Starts a game with the given cast. The RNG is seeded from `config.simulation.seed`.
    pub fn new(players: Vec<Player>, config: SimConfig) -> Self {
        let rng = SimRng::seeded(config.simulation.seed);
        Self::with_rng(players, config, rng)
    }

    /// Starts a game with a randomly generated cast sized from config.
    pub fn generate(config: SimConfig) -> Self {
        let config = config.validated();
        let mut rng = SimRng::seeded(config.simulation.seed);
        let players = generate_roster(config.game.num_players, config.game.num_traitors, &mut rng.0);
        Self::with_rng(players, config, rng)
    }

    fn with_rng(players: Vec<Player>, config: SimConfig, rng: SimRng) -> Self {
        let config = config.validated();
        let state = GameState::new(players).with_game_id(game_id_for_seed(config.simulation.seed));
        let trust = TrustMatrix::with_players(state.players.iter().map(|p| p.id.clone()));
        tracing::info!(
            game_id = %state.game_id,
            players = state.players.len(),
            traitors = state.traitors_alive(),
            "game created"
        );

        let mut world = World::new();
        world.insert_resource(state);
        world.insert_resource(trust);
        world.insert_resource(rng);
        world.insert_resource(config);
        world.insert_resource(VoteBox::new());
        world.insert_resource(MurderOrder::default());
        world.insert_resource(DayReport::default());

        let mut mission = Schedule::default();
        mission.add_systems((start_day, run_daily_mission, check_end_conditions).chain());

        let mut round_table = Schedule::default();
        round_table.add_systems((tally_round_table, check_end_conditions, recruit_lone_traitor).chain());

        let mut turret = Schedule::default();
        turret.add_systems((resolve_turret, check_end_conditions, end_day).chain());

        Self {
            world,
            mission,
            round_table,
            turret,
        }
    }

    pub fn state(&self) -> &GameState {
        self.world.resource::<GameState>()
    }

    pub fn trust(&self) -> &TrustMatrix {
        self.world.resource::<TrustMatrix>()
    }

    pub fn trust_mut(&mut self) -> Mut<'_, TrustMatrix> {
        self.world.resource_mut::<TrustMatrix>()
    }

    pub fn config(&self) -> &SimConfig {
        self.world.resource::<SimConfig>()
    }

    pub fn report(&self) -> &DayReport {
        self.world.resource::<DayReport>()
    }

    /// The game's random stream, for decision layers that need to stay reproducible.
    pub fn rng(&mut self) -> &mut SmallRng {
        &mut self.world.resource_mut::<SimRng>().into_inner().0
    }

    pub fn winner(&self) -> Option<Winner> {
        self.state().winner
    }

    pub fn is_over(&self) -> bool {
        self.state().is_over()
    }

    /// Runs today's mission. Returns `None` once the game is over.
    pub fn run_mission(&mut self) -> Option<MissionResult> {
        self.mission.run(&mut self.world);
        self.report().mission.clone()
    }

    /// Moves from the Social phase to the Round Table.
    pub fn begin_round_table(&mut self) {
        let mut state = self.world.resource_mut::<GameState>();
        if state.phase == Phase::Social {
            state.advance_phase();
        }
    }

    /// Moves from the Round Table to the Turret.
    pub fn begin_turret(&mut self) {
        let mut state = self.world.resource_mut::<GameState>();
        if state.phase == Phase::RoundTable {
            state.advance_phase();
        }
    }

    /// Runs tool calls as `player_id` against this game.
    ///
    /// A vote or murder choice the tools accept is carried into the next
    /// Round Table or Turret.
    pub fn with_tools<T>(&mut self, player_id: &str, f: impl FnOnce(&mut ToolContext<'_>) -> T) -> T {
        let (out, vote, murder) = self.world.resource_scope(|world, mut trust: Mut<TrustMatrix>| {
            let state = world.resource::<GameState>();
            let mut ctx = ToolContext::new(player_id)
                .with_state(state)
                .with_trust(&mut trust);
            let out = f(&mut ctx);
            (out, ctx.vote_result.take(), ctx.murder_choice.take())
        });

        if let Some(vote) = vote {
            self.submit_vote(vote);
        }
        if let Some(choice) = murder {
            self.world.resource_mut::<MurderOrder>().choice = Some(choice);
        }
        out
    }

    pub fn submit_vote(&mut self, vote: VoteRecord) {
        self.world.resource_mut::<VoteBox>().cast(vote);
    }

    /// Tallies the collected votes. Returns the banishment, if any.
    pub fn resolve_round_table(&mut self) -> Option<Banishment> {
        self.round_table.run(&mut self.world);
        self.report().banished.clone()
    }

    /// Carries out the murder and closes the day. Returns the victim, if any.
    pub fn resolve_turret(&mut self) -> Option<String> {
        self.turret.run(&mut self.world);
        self.report().murdered.clone()
    }

    pub fn into_parts(mut self) -> (GameState, TrustMatrix) {
        let state = self.world.remove_resource::<GameState>().unwrap_or_else(|| GameState::new(Vec::new()));
        let trust = self.world.remove_resource::<TrustMatrix>().unwrap_or_default();
        (state, trust)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sim_model::fixtures::sample_roster;

    use crate::tools::dispatch;

    #[test]
    fn test_day_cycle() {
        let mut config = SimConfig::default();
        config.game.final_players = 2;
        config.game.recruitment_enabled = false;
        let mut session = GameSession::new(sample_roster(), config);

        let result = session.run_mission().unwrap();
        assert_eq!(result.mission, sim_model::MissionKind::SkillCheck);
        assert_eq!(session.state().phase, Phase::Social);
        assert!(session.state().prize_pot >= 0.0);

        session.begin_round_table();
        for voter in ["p0", "p2", "p4"] {
            let outcome = session.with_tools(voter, |ctx| {
                dispatch("cast_vote", &json!({ "target_player_id": "p1" }), ctx)
            });
            assert!(outcome.is_success());
        }
        let banished = session.resolve_round_table().unwrap();
        assert_eq!(banished.player_id, "p1");
        assert_eq!(banished.votes, 3);

        session.begin_turret();
        let outcome = session.with_tools("p3", |ctx| {
            dispatch("choose_murder_victim", &json!({ "victim_id": "p0", "reasoning": "too sharp" }), ctx)
        });
        assert!(outcome.is_success());
        assert_eq!(session.resolve_turret().as_deref(), Some("p0"));

        let state = session.state();
        assert_eq!(state.day, 2);
        assert_eq!(state.phase, Phase::Breakfast);
    }

    #[test]
    fn test_update_suspicion_through_session() {
        let mut session = GameSession::new(sample_roster(), SimConfig::default());
        let outcome = session.with_tools("p0", |ctx| {
            dispatch("update_suspicion", &json!({ "player_id": "p3", "new_score": 0.9 }), ctx)
        });
        assert!(outcome.is_success());
        assert!((session.trust().get("p0", "p3") - 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_generated_game_runs_to_completion() {
        let mut config = SimConfig::default();
        config.game.max_days = 3;
        let mut session = GameSession::generate(config);

        // Nobody votes or murders: the clock runs out for the Faithful
        for _ in 0..3 {
            session.run_mission();
            session.begin_round_table();
            session.resolve_round_table();
            session.begin_turret();
            session.resolve_turret();
        }
        assert_eq!(session.winner(), Some(Winner::Traitors));
        assert_eq!(session.state().day, 4);
    }
}
