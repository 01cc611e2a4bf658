//! Game State
//!
//! The authoritative world for one game: roster, day and phase, prize pot,
//! eliminations and history. Role visibility rules live here so every
//! outward-facing query goes through the same check.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use sim_model::{Death, DeathCause, MissionKind, Phase, Player, Role};
use uuid::Uuid;

use crate::error::StateError;

/// Which side won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Faithful,
    Traitors,
}

/// Something that happened, kept for narrative and summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    MissionCompleted {
        day: u32,
        mission: MissionKind,
        earnings: f32,
        success: bool,
    },
    VoteCast {
        day: u32,
        voter: String,
        target: String,
    },
    Banished {
        day: u32,
        player_id: String,
        role: Role,
        votes: usize,
    },
    Murdered {
        day: u32,
        player_id: String,
    },
    Recruited {
        day: u32,
        player_id: String,
        recruiter: String,
    },
    GameOver {
        day: u32,
        winner: Winner,
        prize_pot: f32,
    },
}

/// Resource: authoritative state of one game
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub game_id: Uuid,
    pub day: u32,
    pub phase: Phase,
    pub prize_pot: f32,
    pub players: Vec<Player>,
    /// Banished player ids, in order
    pub banished: Vec<String>,
    /// Murdered player ids, in order
    pub murdered: Vec<String>,
    pub history: Vec<GameEvent>,
    pub winner: Option<Winner>,
    /// Set once a recruitment has happened
    pub recruitment_used: bool,
}

impl GameState {
    /// Fresh state on day one. The id is nil until [`GameState::with_game_id`].
    pub fn new(players: Vec<Player>) -> Self {
        Self {
            game_id: Uuid::nil(),
            day: 1,
            phase: Phase::Breakfast,
            prize_pot: 0.0,
            players,
            banished: Vec::new(),
            murdered: Vec::new(),
            history: Vec::new(),
            winner: None,
            recruitment_used: false,
        }
    }

    pub fn with_game_id(mut self, game_id: Uuid) -> Self {
        self.game_id = game_id;
        self
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    fn player_mut(&mut self, id: &str) -> Result<&mut Player, StateError> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StateError::UnknownPlayer(id.to_string()))
    }

    pub fn is_alive(&self, id: &str) -> bool {
        self.player(id).is_some_and(|p| p.alive)
    }

    /// Alive players in roster order.
    pub fn alive_players(&self) -> Vec<&Player> {
        self.players.iter().filter(|p| p.alive).collect()
    }

    pub fn alive_ids(&self) -> Vec<&str> {
        self.players
            .iter()
            .filter(|p| p.alive)
            .map(|p| p.id.as_str())
            .collect()
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    pub fn alive_with_role(&self, role: Role) -> Vec<&Player> {
        self.players
            .iter()
            .filter(|p| p.alive && p.role == role)
            .collect()
    }

    pub fn traitors_alive(&self) -> usize {
        self.alive_with_role(Role::Traitor).len()
    }

    pub fn faithful_alive(&self) -> usize {
        self.alive_with_role(Role::Faithful).len()
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Adds mission earnings to the pot. Negative or non-finite amounts are ignored.
    pub fn add_earnings(&mut self, amount: f32) {
        if amount.is_finite() && amount > 0.0 {
            self.prize_pot += amount;
        }
    }

    /// Moves to the next phase, starting a new day after the Turret.
    pub fn advance_phase(&mut self) {
        let (next, new_day) = self.phase.next();
        self.phase = next;
        if new_day {
            self.day += 1;
        }
    }

    pub fn record(&mut self, event: GameEvent) {
        self.history.push(event);
    }

    fn eliminate(&mut self, id: &str, cause: DeathCause) -> Result<Role, StateError> {
        if self.is_over() {
            return Err(StateError::GameOver);
        }
        let day = self.day;
        let player = self.player_mut(id)?;
        if !player.alive {
            return Err(StateError::NotAlive(id.to_string()));
        }
        player.alive = false;
        player.death = Some(Death { cause, day });
        Ok(player.role)
    }

    /// Removes a player by vote and returns their now-public role.
    pub fn banish(&mut self, id: &str, votes: usize) -> Result<Role, StateError> {
        let role = self.eliminate(id, DeathCause::Banished)?;
        self.banished.push(id.to_string());
        self.record(GameEvent::Banished {
            day: self.day,
            player_id: id.to_string(),
            role,
            votes,
        });
        tracing::info!(day = self.day, player = id, role = %role, "player banished");
        Ok(role)
    }

    pub fn murder(&mut self, id: &str) -> Result<(), StateError> {
        self.eliminate(id, DeathCause::Murdered)?;
        self.murdered.push(id.to_string());
        self.record(GameEvent::Murdered {
            day: self.day,
            player_id: id.to_string(),
        });
        tracing::info!(day = self.day, player = id, "player murdered");
        Ok(())
    }

    /// Turns an alive Faithful into a Traitor. The only role change the game allows.
    pub fn recruit(&mut self, id: &str, recruiter: &str) -> Result<(), StateError> {
        if self.is_over() {
            return Err(StateError::GameOver);
        }
        let player = self.player_mut(id)?;
        if !player.alive {
            return Err(StateError::NotAlive(id.to_string()));
        }
        if player.is_traitor() {
            return Err(StateError::AlreadyTraitor(id.to_string()));
        }
        player.role = Role::Traitor;
        self.recruitment_used = true;
        self.record(GameEvent::Recruited {
            day: self.day,
            player_id: id.to_string(),
            recruiter: recruiter.to_string(),
        });
        tracing::info!(day = self.day, player = id, recruiter, "faithful recruited");
        Ok(())
    }

    /// Decides the game if a win condition holds, recording the result once.
    ///
    /// Faithful win when no Traitor is alive. Traitors win when they are at
    /// least as many as the Faithful, when the roster has shrunk to
    /// `final_players`, or when `max_days` have been played.
    pub fn check_winner(&mut self, final_players: usize, max_days: u32) -> Option<Winner> {
        if let Some(winner) = self.winner {
            return Some(winner);
        }
        let traitors = self.traitors_alive();
        let faithful = self.faithful_alive();
        let winner = if traitors == 0 {
            Some(Winner::Faithful)
        } else if traitors >= faithful
            || traitors + faithful <= final_players
            || self.day > max_days
        {
            Some(Winner::Traitors)
        } else {
            None
        };
        if let Some(winner) = winner {
            self.winner = Some(winner);
            self.record(GameEvent::GameOver {
                day: self.day,
                winner,
                prize_pot: self.prize_pot,
            });
            tracing::info!(day = self.day, ?winner, prize_pot = self.prize_pot, "game over");
        }
        winner
    }

    /// Whether `viewer` may see `target`'s true role.
    ///
    /// Roles are public once a player is dead. While alive, only a fellow
    /// Traitor (or the player themself) sees a Traitor's role.
    pub fn role_visible_to(&self, target: &Player, viewer: Option<&Player>) -> bool {
        if !target.alive {
            return true;
        }
        match viewer {
            Some(v) if v.id == target.id => true,
            Some(v) => v.is_traitor() && target.is_traitor(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_model::fixtures::sample_roster;

    #[test]
    fn test_alive_queries() {
        let state = GameState::new(sample_roster());
        assert_eq!(state.alive_count(), 6);
        assert_eq!(state.traitors_alive(), 2);
        assert_eq!(state.faithful_alive(), 4);
        assert_eq!(state.alive_ids()[0], "p0");
    }

    #[test]
    fn test_banish_records_death() {
        let mut state = GameState::new(sample_roster());
        let role = state.banish("p1", 4).unwrap();

        assert_eq!(role, Role::Traitor);
        assert!(!state.is_alive("p1"));
        assert_eq!(state.banished, vec!["p1".to_string()]);
        let death = state.player("p1").unwrap().death.unwrap();
        assert_eq!(death.cause, DeathCause::Banished);
        assert_eq!(death.day, 1);
        // Player kept on the roster
        assert_eq!(state.players.len(), 6);
    }

    #[test]
    fn test_cannot_eliminate_twice() {
        let mut state = GameState::new(sample_roster());
        state.murder("p0").unwrap();
        assert_eq!(state.murder("p0"), Err(StateError::NotAlive("p0".into())));
        assert_eq!(
            state.banish("zz", 1),
            Err(StateError::UnknownPlayer("zz".into()))
        );
    }

    #[test]
    fn test_recruit() {
        let mut state = GameState::new(sample_roster());
        state.recruit("p2", "p1").unwrap();

        assert!(state.player("p2").unwrap().is_traitor());
        assert!(state.recruitment_used);
        assert_eq!(
            state.recruit("p2", "p1"),
            Err(StateError::AlreadyTraitor("p2".into()))
        );
    }

    #[test]
    fn test_phase_advance_increments_day() {
        let mut state = GameState::new(sample_roster());
        for _ in 0..5 {
            state.advance_phase();
        }
        assert_eq!(state.day, 2);
        assert_eq!(state.phase, Phase::Breakfast);
    }

    #[test]
    fn test_winner_conditions() {
        let mut state = GameState::new(sample_roster());
        assert_eq!(state.check_winner(2, 12), None);

        state.banish("p1", 3).unwrap();
        state.banish("p3", 3).unwrap();
        assert_eq!(state.check_winner(2, 12), Some(Winner::Faithful));
        assert!(matches!(state.history.last(), Some(GameEvent::GameOver { .. })));
        assert_eq!(state.banish("p0", 1), Err(StateError::GameOver));
    }

    #[test]
    fn test_traitors_win_at_parity() {
        let mut state = GameState::new(sample_roster());
        state.murder("p0").unwrap();
        assert_eq!(state.check_winner(2, 12), None);
        state.murder("p2").unwrap();
        // 2 traitors vs 2 faithful
        assert_eq!(state.check_winner(2, 12), Some(Winner::Traitors));
    }

    #[test]
    fn test_role_visibility() {
        let mut state = GameState::new(sample_roster());
        let traitor = state.player("p1").unwrap().clone();
        let teammate = state.player("p3").unwrap().clone();
        let faithful = state.player("p0").unwrap().clone();

        assert!(!state.role_visible_to(&traitor, None));
        assert!(!state.role_visible_to(&traitor, Some(&faithful)));
        assert!(state.role_visible_to(&traitor, Some(&teammate)));
        assert!(!state.role_visible_to(&faithful, Some(&teammate)));

        state.banish("p0", 2).unwrap();
        let banished = state.player("p0").unwrap().clone();
        assert!(state.role_visible_to(&banished, None));
    }
}
