//! Game Action Tools
//!
//! The surface an agent-decision layer uses to look at and act on a game.
//! Every call goes through a typed [`ToolContext`]; every result comes back
//! as a [`ToolOutcome`] with a success/error discriminator. Roles of alive
//! players are redacted unless the caller is entitled to see them.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sim_model::{GameContext, Player};

use crate::error::ToolError;
use crate::state::{GameEvent, GameState};
use crate::trust::TrustMatrix;

/// Role text shown for alive players whose role the caller may not see.
pub const REDACTED_ROLE: &str = "Unknown (alive)";

/// Names accepted by [`dispatch`].
pub const TOOL_NAMES: [&str; 6] = [
    "get_game_state",
    "get_my_suspicions",
    "cast_vote",
    "choose_murder_victim",
    "update_suspicion",
    "get_player_info",
];

/// How many history entries `get_game_state` reports.
const RECENT_EVENTS: usize = 6;

/// A vote accepted by `cast_vote`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub voter: String,
    pub target: String,
    pub reasoning: String,
}

/// A murder target accepted by `choose_murder_victim`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MurderChoice {
    pub murderer: String,
    pub victim: String,
    pub reasoning: String,
}

/// Everything a tool call may read or write.
///
/// Fields are optional so a caller can hand over only what a tool needs;
/// a tool that finds its context missing returns
/// [`ToolError::MissingContext`].
#[derive(Debug, Default)]
pub struct ToolContext<'a> {
    pub player_id: Option<String>,
    pub game_state: Option<&'a GameState>,
    pub trust: Option<&'a mut TrustMatrix>,
    /// Filled by a successful `cast_vote`
    pub vote_result: Option<VoteRecord>,
    /// Filled by a successful `choose_murder_victim`
    pub murder_choice: Option<MurderChoice>,
}

impl<'a> ToolContext<'a> {
    pub fn new(player_id: impl Into<String>) -> Self {
        Self {
            player_id: Some(player_id.into()),
            ..Self::default()
        }
    }

    pub fn with_state(mut self, state: &'a GameState) -> Self {
        self.game_state = Some(state);
        self
    }

    pub fn with_trust(mut self, trust: &'a mut TrustMatrix) -> Self {
        self.trust = Some(trust);
        self
    }

    fn state(&self) -> Result<&'a GameState, ToolError> {
        self.game_state.ok_or(ToolError::MissingContext("game_state"))
    }

    fn caller_id(&self) -> Result<&str, ToolError> {
        self.player_id
            .as_deref()
            .ok_or(ToolError::MissingContext("player_id"))
    }

    fn caller(&self) -> Result<&'a Player, ToolError> {
        let state = self.state()?;
        let id = self.caller_id()?;
        state
            .player(id)
            .ok_or_else(|| ToolError::InvalidArgument(format!("unknown caller {}", id)))
    }

    fn trust(&self) -> Result<&TrustMatrix, ToolError> {
        self.trust
            .as_deref()
            .ok_or(ToolError::MissingContext("trust_matrix"))
    }

    fn trust_mut(&mut self) -> Result<&mut TrustMatrix, ToolError> {
        self.trust
            .as_deref_mut()
            .ok_or(ToolError::MissingContext("trust_matrix"))
    }

    /// The caller's view of the game as a [`GameContext`].
    pub fn game_context(&self) -> Option<GameContext> {
        let state = self.game_state?;
        let caller = self.player_id.as_deref()?;
        let suspicion_on_self = self.trust.as_deref().map_or(0.5, |trust| {
            let others: Vec<&str> = state
                .alive_ids()
                .into_iter()
                .filter(|id| *id != caller)
                .collect();
            trust.average_suspicion_of(caller, &others)
        });
        Some(GameContext {
            day: state.day,
            phase: state.phase,
            alive_count: state.alive_count(),
            suspicion_on_self,
        })
    }
}

/// Structured result of a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success { data: Value },
    Error { message: String },
}

impl ToolOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success { .. })
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            ToolOutcome::Success { data } => Some(data),
            ToolOutcome::Error { .. } => None,
        }
    }
}

impl From<Result<Value, ToolError>> for ToolOutcome {
    fn from(result: Result<Value, ToolError>) -> Self {
        match result {
            Ok(data) => ToolOutcome::Success { data },
            Err(err) => ToolOutcome::Error {
                message: err.to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct CastVoteArgs {
    target_player_id: String,
    #[serde(default)]
    reasoning: String,
}

#[derive(Debug, Deserialize)]
struct MurderArgs {
    victim_id: String,
    #[serde(default)]
    reasoning: String,
}

#[derive(Debug, Deserialize)]
struct UpdateSuspicionArgs {
    player_id: String,
    new_score: f32,
    #[serde(default)]
    reason: String,
}

#[derive(Debug, Deserialize)]
struct PlayerInfoArgs {
    player_id: String,
}

fn parse<T: serde::de::DeserializeOwned>(tool: &str, args: &Value) -> Result<T, ToolError> {
    serde_json::from_value(args.clone())
        .map_err(|e| ToolError::InvalidArgument(format!("{}: {}", tool, e)))
}

/// Runs the named tool with JSON arguments.
///
/// Unknown tools, malformed arguments and rule violations all come back as
/// [`ToolOutcome::Error`].
pub fn dispatch(name: &str, args: &Value, ctx: &mut ToolContext<'_>) -> ToolOutcome {
    let result = match name {
        "get_game_state" => get_game_state(ctx),
        "get_my_suspicions" => get_my_suspicions(ctx),
        "cast_vote" => parse::<CastVoteArgs>(name, args)
            .and_then(|a| cast_vote(ctx, &a.target_player_id, &a.reasoning)),
        "choose_murder_victim" => parse::<MurderArgs>(name, args)
            .and_then(|a| choose_murder_victim(ctx, &a.victim_id, &a.reasoning)),
        "update_suspicion" => parse::<UpdateSuspicionArgs>(name, args)
            .and_then(|a| update_suspicion(ctx, &a.player_id, a.new_score, &a.reason)),
        "get_player_info" => {
            parse::<PlayerInfoArgs>(name, args).and_then(|a| get_player_info(ctx, &a.player_id))
        }
        other => Err(ToolError::UnknownTool(other.to_string())),
    };
    if let Err(err) = &result {
        tracing::debug!(tool = name, player = ?ctx.player_id, error = %err, "tool call rejected");
    }
    result.into()
}

fn public_event(event: &GameEvent) -> Option<Value> {
    match event {
        // Recruitment is known only to the Traitors
        GameEvent::Recruited { .. } => None,
        other => serde_json::to_value(other).ok(),
    }
}

/// Day, phase, pot, alive roster and eliminations as the caller sees them.
pub fn get_game_state(ctx: &ToolContext<'_>) -> Result<Value, ToolError> {
    let state = ctx.state()?;
    let viewer = ctx.caller().ok();

    let alive: Vec<Value> = state
        .alive_players()
        .into_iter()
        .map(|p| json!({ "id": p.id, "name": p.name }))
        .collect();
    let eliminated = |ids: &[String]| -> Vec<Value> {
        ids.iter()
            .filter_map(|id| state.player(id))
            .map(|p| json!({ "id": p.id, "name": p.name, "role": p.role.as_str() }))
            .collect()
    };
    let recent: Vec<Value> = state
        .history
        .iter()
        .filter_map(public_event)
        .rev()
        .take(RECENT_EVENTS)
        .collect();

    let mut data = json!({
        "game_id": state.game_id.to_string(),
        "day": state.day,
        "phase": state.phase.as_str(),
        "prize_pot": state.prize_pot,
        "alive_players": alive,
        "alive_count": state.alive_count(),
        "banished": eliminated(&state.banished),
        "murdered": eliminated(&state.murdered),
        "recent_events": recent,
        "winner": state.winner,
    });

    if let Some(me) = viewer {
        data["my_id"] = json!(me.id);
        data["my_role"] = json!(me.role.as_str());
        data["i_am_alive"] = json!(me.alive);
        if me.is_traitor() {
            let teammates: Vec<&str> = state
                .players
                .iter()
                .filter(|p| p.id != me.id && p.is_traitor() && state.role_visible_to(p, Some(me)))
                .map(|p| p.id.as_str())
                .collect();
            data["fellow_traitors"] = json!(teammates);
        }
    }
    Ok(data)
}

/// The caller's suspicion of every other alive player, most suspected first.
pub fn get_my_suspicions(ctx: &ToolContext<'_>) -> Result<Value, ToolError> {
    let state = ctx.state()?;
    let me = ctx.caller_id()?;
    let trust = ctx.trust()?;

    let mut entries: Vec<(&Player, f32)> = state
        .alive_players()
        .into_iter()
        .filter(|p| p.id != me)
        .map(|p| (p, trust.get(me, &p.id)))
        .collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));

    let list: Vec<Value> = entries
        .into_iter()
        .map(|(p, score)| json!({ "player_id": p.id, "name": p.name, "suspicion": score }))
        .collect();
    Ok(json!({ "observer": me, "suspicions": list }))
}

/// Records the caller's banishment vote. Leaves `vote_result` untouched on error.
pub fn cast_vote(ctx: &mut ToolContext<'_>, target_id: &str, reasoning: &str) -> Result<Value, ToolError> {
    let state = ctx.state()?;
    let voter = ctx.caller()?;
    if !voter.alive {
        return Err(ToolError::Forbidden(format!("{} is not alive and cannot vote", voter.id)));
    }
    if target_id == voter.id {
        return Err(ToolError::InvalidTarget("cannot vote for yourself".into()));
    }
    let target = state
        .player(target_id)
        .filter(|p| p.alive)
        .ok_or_else(|| ToolError::InvalidTarget(format!("{} is not an alive player", target_id)))?;

    ctx.vote_result = Some(VoteRecord {
        voter: voter.id.clone(),
        target: target.id.clone(),
        reasoning: reasoning.to_string(),
    });
    tracing::debug!(voter = %voter.id, target = %target.id, "vote cast");
    Ok(json!({ "voted_for": target.id, "target_name": target.name, "reasoning": reasoning }))
}

/// Records the Traitors' murder target. Only Traitors may call it and only
/// alive Faithful may be chosen.
pub fn choose_murder_victim(
    ctx: &mut ToolContext<'_>,
    victim_id: &str,
    reasoning: &str,
) -> Result<Value, ToolError> {
    let state = ctx.state()?;
    let murderer = ctx.caller()?;
    if !murderer.is_traitor() {
        return Err(ToolError::Forbidden("only Traitors can choose a murder victim".into()));
    }
    if !murderer.alive {
        return Err(ToolError::Forbidden(format!("{} is not alive", murderer.id)));
    }
    let victim = state
        .player(victim_id)
        .filter(|p| p.alive)
        .ok_or_else(|| ToolError::InvalidTarget(format!("{} is not an alive player", victim_id)))?;
    if victim.is_traitor() {
        return Err(ToolError::InvalidTarget("cannot murder a fellow Traitor".into()));
    }

    ctx.murder_choice = Some(MurderChoice {
        murderer: murderer.id.clone(),
        victim: victim.id.clone(),
        reasoning: reasoning.to_string(),
    });
    tracing::debug!(murderer = %murderer.id, victim = %victim.id, "murder victim chosen");
    Ok(json!({ "victim": victim.id, "reasoning": reasoning }))
}

/// Sets the caller's suspicion of `player_id` to `new_score`.
///
/// The matrix only applies deltas, so this computes `new_score - current`.
pub fn update_suspicion(
    ctx: &mut ToolContext<'_>,
    player_id: &str,
    new_score: f32,
    reason: &str,
) -> Result<Value, ToolError> {
    if !new_score.is_finite() || !(0.0..=1.0).contains(&new_score) {
        return Err(ToolError::InvalidArgument(format!(
            "new_score must be within [0, 1], got {}",
            new_score
        )));
    }
    let observer = ctx.caller_id()?.to_string();
    if observer == player_id {
        return Err(ToolError::InvalidTarget("cannot rate your own suspicion".into()));
    }
    if let Some(state) = ctx.game_state {
        if state.player(player_id).is_none() {
            return Err(ToolError::InvalidTarget(format!("unknown player {}", player_id)));
        }
    }

    let trust = ctx.trust_mut()?;
    let old_score = trust.get(&observer, player_id);
    let updated = trust.update(&observer, player_id, new_score - old_score);
    tracing::debug!(observer = %observer, subject = player_id, old_score, new_score = updated, "suspicion updated");
    Ok(json!({
        "player_id": player_id,
        "old_score": old_score,
        "new_score": updated,
        "reason": reason,
    }))
}

/// Public facts about one player. The role is redacted while the player is
/// alive unless the caller is the player or a fellow Traitor.
pub fn get_player_info(ctx: &ToolContext<'_>, player_id: &str) -> Result<Value, ToolError> {
    let state = ctx.state()?;
    let target = state
        .player(player_id)
        .ok_or_else(|| ToolError::InvalidTarget(format!("unknown player {}", player_id)))?;
    let viewer = ctx.caller().ok();

    let role = if state.role_visible_to(target, viewer) {
        target.role.as_str()
    } else {
        REDACTED_ROLE
    };

    let mut data = json!({
        "id": target.id,
        "name": target.name,
        "alive": target.alive,
        "role": role,
        "archetype": target.archetype,
    });
    if let Some(death) = target.death {
        data["death"] = json!({ "cause": death.cause, "day": death.day });
    }
    if let (Some(me), Ok(trust)) = (viewer, ctx.trust()) {
        if me.id != target.id {
            data["my_suspicion"] = json!(trust.get(&me.id, &target.id));
        }
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_model::fixtures::sample_roster;

    #[test]
    fn test_missing_context() {
        let mut ctx = ToolContext::default();
        let outcome = dispatch("get_game_state", &Value::Null, &mut ctx);
        assert_eq!(
            outcome,
            ToolOutcome::Error {
                message: "missing context: game_state".into()
            }
        );
    }

    #[test]
    fn test_unknown_tool() {
        let state = GameState::new(sample_roster());
        let mut ctx = ToolContext::new("p0").with_state(&state);
        let outcome = dispatch("poison_wine", &json!({}), &mut ctx);
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_malformed_arguments_rejected() {
        let state = GameState::new(sample_roster());
        let mut ctx = ToolContext::new("p0").with_state(&state);
        let outcome = dispatch("cast_vote", &json!({ "reasoning": "no target" }), &mut ctx);
        assert!(!outcome.is_success());
        assert!(ctx.vote_result.is_none());
    }

    #[test]
    fn test_outcome_wire_shape() {
        let ok = ToolOutcome::Success { data: json!({ "x": 1 }) };
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({ "status": "success", "data": { "x": 1 } })
        );
        let err = ToolOutcome::Error { message: "nope".into() };
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({ "status": "error", "message": "nope" })
        );
    }

    #[test]
    fn test_game_state_hides_recruitment() {
        let mut state = GameState::new(sample_roster());
        state.recruit("p2", "p1").unwrap();
        state.banish("p0", 3).unwrap();

        let ctx = ToolContext::new("p4").with_state(&state);
        let data = get_game_state(&ctx).unwrap();

        let events = data["recent_events"].as_array().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["type"], "banished");
        assert_eq!(data["my_role"], "faithful");
        assert!(data.get("fellow_traitors").is_none());
    }

    #[test]
    fn test_traitor_sees_teammates() {
        let state = GameState::new(sample_roster());
        let ctx = ToolContext::new("p1").with_state(&state);
        let data = get_game_state(&ctx).unwrap();
        assert_eq!(data["fellow_traitors"], json!(["p3"]));
    }

    #[test]
    fn test_game_context_from_tools() {
        let state = GameState::new(sample_roster());
        let mut trust = TrustMatrix::with_players(state.alive_ids());
        for observer in ["p1", "p2", "p3", "p4", "p5"] {
            trust.set(observer, "p0", 0.9);
        }
        let ctx = ToolContext::new("p0").with_state(&state).with_trust(&mut trust);
        let context = ctx.game_context().unwrap();
        assert_eq!(context.alive_count, 6);
        assert!((context.suspicion_on_self - 0.9).abs() < 1e-6);
    }
}
