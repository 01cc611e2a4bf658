//! Whole-game driver
//!
//! Plays one game from setup to a winner and condenses it into a
//! [`GameSummary`] for output.

use advisor::Advisor;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use sim_core::{generate_roster, roster_from_profiles, GameEvent, GameSession, SimConfig, Winner};
use sim_model::{MissionKind, Role};

use crate::agent::{absorb_events, mission_events, play_round_table, play_turret, round_table_events};

/// One day's headline outcomes.
#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub day: u32,
    pub mission: Option<MissionKind>,
    pub earnings: f32,
    pub banished: Option<String>,
    pub banished_role: Option<Role>,
    pub murdered: Option<String>,
    pub recruited: Option<String>,
}

/// Machine-readable result of one game.
#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub game_id: String,
    pub seed: u64,
    pub winner: Option<Winner>,
    pub days_played: u32,
    pub prize_pot: f32,
    pub players: usize,
    pub traitors_start: usize,
    pub survivors: Vec<String>,
    pub days: Vec<DaySummary>,
    pub events: usize,
}

/// Builds the cast: corpus profiles when the advisor has any, random otherwise.
fn cast(config: &SimConfig, advisor: &Advisor) -> Vec<sim_model::Player> {
    // Separate stream so the cast does not shift the game's own draws
    let mut rng = SmallRng::seed_from_u64(config.simulation.seed ^ 0x5eed_ca57);
    let (n, traitors) = (config.game.num_players, config.game.num_traitors);
    if advisor.training.profiles.is_empty() {
        generate_roster(n, traitors, &mut rng)
    } else {
        roster_from_profiles(&advisor.training.profiles, n, traitors, &mut rng)
    }
}

/// Plays one game to completion.
pub fn play_game(config: SimConfig, advisor: &Advisor) -> GameSummary {
    let config = config.validated();
    let seed = config.simulation.seed;
    let players = cast(&config, advisor);
    let traitors_start = players.iter().filter(|p| p.is_traitor()).count();
    let mut session = GameSession::new(players, config);
    let mut days = Vec::new();

    // max_days bounds the game through the win check; the cap is a backstop
    let cap = session.config().game.max_days + 1;
    for _ in 0..cap {
        let Some(result) = session.run_mission() else {
            break;
        };
        absorb_events(&mut session, advisor, &mission_events(&result));

        session.begin_round_table();
        play_round_table(&mut session, advisor);
        let banished = session.resolve_round_table();
        let events = round_table_events(
            session.state(),
            banished.as_ref().map(|b| (b.player_id.as_str(), b.role)),
        );
        absorb_events(&mut session, advisor, &events);

        if !session.is_over() {
            session.begin_turret();
            play_turret(&mut session, advisor);
            session.resolve_turret();
        }

        let report = session.report();
        days.push(DaySummary {
            day: report.day,
            mission: report.mission.as_ref().map(|m| m.mission),
            earnings: report.mission.as_ref().map_or(0.0, |m| m.earnings),
            banished: report.banished.as_ref().map(|b| b.player_id.clone()),
            banished_role: report.banished.as_ref().map(|b| b.role),
            murdered: report.murdered.clone(),
            recruited: report.recruited.clone(),
        });
        if session.is_over() {
            break;
        }
    }

    let state = session.state();
    let days_played = state
        .history
        .iter()
        .find_map(|e| match e {
            GameEvent::GameOver { day, .. } => Some(*day),
            _ => None,
        })
        .unwrap_or(state.day);
    let summary = GameSummary {
        game_id: state.game_id.to_string(),
        seed,
        winner: state.winner,
        days_played,
        prize_pot: state.prize_pot,
        players: state.players.len(),
        traitors_start,
        survivors: state.alive_ids().iter().map(|s| s.to_string()).collect(),
        days,
        events: state.history.len(),
    };
    tracing::info!(
        seed,
        winner = ?summary.winner,
        days = summary.days_played,
        prize_pot = summary.prize_pot,
        "game finished"
    );
    summary
}
