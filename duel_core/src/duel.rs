//! DuelSimulator - full PvE and PvP battles from a seed
//!
//! A duel runs in rounds. Each round the living actors act once in speed
//! order; the duel stops the moment either side reaches 0 hp or the round
//! limit runs out.

use crate::actor::{
    build_actor_runtime, build_enemy_runtime, ActorRuntime, CombatantDefinition, EnemyConfig,
};
use crate::combat::{take_turn, TurnContext, TurnEvent};
use crate::turn_order::determine_round_order;
use balance_core::{BalanceConfigLoader, BalanceContext, BalanceSnapshot, Mode, ModeRules, Side};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Roll stream of side A (the player)
const PLAYER_STREAM: u64 = 0;
/// Roll stream of side B (the enemy or second player)
const OPPONENT_STREAM: u64 = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PveBattleRequest {
    pub player_build: CombatantDefinition,
    pub enemy_config: EnemyConfig,
    /// Non-finite or missing seeds fall back to the PvE default seed
    pub seed: Option<f64>,
    /// Overrides the PvE round limit, at least 1
    pub round_limit: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PvpBattleRequest {
    pub player_a: CombatantDefinition,
    pub player_b: CombatantDefinition,
    pub seed: Option<f64>,
    pub round_limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawReason {
    /// Both sides still standing when the round limit ran out
    RoundLimit,
    /// Both sides fell during the same action
    MutualDefeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DuelOutcome {
    Victory { winner: Side },
    Draw { reason: DrawReason },
}

impl DuelOutcome {
    pub fn winner(&self) -> Option<Side> {
        match self {
            DuelOutcome::Victory { winner } => Some(*winner),
            DuelOutcome::Draw { .. } => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(self, DuelOutcome::Draw { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemainingHp {
    pub player: f64,
    pub opponent: f64,
}

/// Everything a single duel produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuelResult {
    pub mode: Mode,
    /// Seed actually used, after fallback and truncation
    pub seed: i64,
    /// Version the balance profiles were resolved from
    pub balance_version: String,
    /// Version the loader context asked for
    pub requested_version: String,
    /// Side A (the player) won
    pub victory: bool,
    pub draw: bool,
    pub winner: Option<Side>,
    pub outcome: DuelOutcome,
    pub rounds: u32,
    pub remaining_hp: RemainingHp,
    pub timeline: Vec<TurnEvent>,
}

/// Simulate a player against a PvE enemy
pub fn simulate_pve_battle(snapshot: &BalanceSnapshot, request: &PveBattleRequest) -> DuelResult {
    let rules = snapshot.mode(Mode::Pve);
    let seed = effective_seed(request.seed, &rules);

    let player = build_actor_runtime(
        &request.player_build,
        Side::Player,
        Mode::Pve,
        snapshot,
        actor_rng(seed, PLAYER_STREAM),
    );
    let enemy = build_enemy_runtime(
        &request.enemy_config,
        snapshot,
        actor_rng(seed, OPPONENT_STREAM),
    );

    run_duel(snapshot, Mode::Pve, seed, request.round_limit, player, enemy)
}

/// Simulate two player builds against each other
pub fn simulate_pvp_battle(snapshot: &BalanceSnapshot, request: &PvpBattleRequest) -> DuelResult {
    let rules = snapshot.mode(Mode::Pvp);
    let seed = effective_seed(request.seed, &rules);

    let a = build_actor_runtime(
        &request.player_a,
        Side::Player,
        Mode::Pvp,
        snapshot,
        actor_rng(seed, PLAYER_STREAM),
    );
    let b = build_actor_runtime(
        &request.player_b,
        Side::Opponent,
        Mode::Pvp,
        snapshot,
        actor_rng(seed, OPPONENT_STREAM),
    );

    run_duel(snapshot, Mode::Pvp, seed, request.round_limit, a, b)
}

/// Missing or non-finite seeds use the mode default; others are truncated
pub fn effective_seed(seed: Option<f64>, rules: &ModeRules) -> i64 {
    match seed {
        Some(seed) if seed.is_finite() => seed.trunc() as i64,
        _ => i64::try_from(rules.default_seed).unwrap_or(i64::MAX),
    }
}

/// One generator per duel seed, one stream of it per actor
fn actor_rng(seed: i64, stream: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);
    rng.set_stream(stream);
    rng
}

fn run_duel(
    snapshot: &BalanceSnapshot,
    mode: Mode,
    seed: i64,
    round_limit: Option<u32>,
    mut player: ActorRuntime,
    mut opponent: ActorRuntime,
) -> DuelResult {
    let rules = snapshot.mode(mode);
    let limit = round_limit.unwrap_or(rules.round_limit).max(1);
    let curve = &snapshot.skill.profile;

    let mut timeline = Vec::new();
    let mut rounds_executed = 0;

    'rounds: for round in 1..=limit {
        if !player.is_alive() || !opponent.is_alive() {
            break;
        }
        rounds_executed = round;

        let order = determine_round_order(&player, &opponent, rules.fallback_first);
        debug!(round, order = ?order.order, "round start");

        for (index, side) in order.order.iter().enumerate() {
            let (actor, target) = match side {
                Side::Player => (&mut player, &mut opponent),
                Side::Opponent => (&mut opponent, &mut player),
            };
            if !actor.is_alive() {
                continue;
            }

            let ctx = TurnContext {
                curve,
                rules,
                round,
                sequence: index as u32 + 1,
            };
            timeline.push(take_turn(actor, target, &ctx));

            if !player.is_alive() || !opponent.is_alive() {
                break 'rounds;
            }
        }
    }

    let outcome = match (player.is_alive(), opponent.is_alive()) {
        (true, false) => DuelOutcome::Victory {
            winner: Side::Player,
        },
        (false, true) => DuelOutcome::Victory {
            winner: Side::Opponent,
        },
        (false, false) => DuelOutcome::Draw {
            reason: DrawReason::MutualDefeat,
        },
        (true, true) => DuelOutcome::Draw {
            reason: DrawReason::RoundLimit,
        },
    };
    let rounds = rounds_executed.min(limit);
    let balance_version = snapshot.resolved_version();

    info!(
        %mode,
        seed,
        version = %balance_version,
        requested = %snapshot.version,
        rounds,
        outcome = ?outcome,
        "duel finished"
    );

    DuelResult {
        mode,
        seed,
        balance_version,
        requested_version: snapshot.version.clone(),
        victory: outcome.winner() == Some(Side::Player),
        draw: outcome.is_draw(),
        winner: outcome.winner(),
        outcome,
        rounds,
        remaining_hp: RemainingHp {
            player: player.hp,
            opponent: opponent.hp,
        },
        timeline,
    }
}

/// Runs duels against whatever balance version its loader has active
#[derive(Debug, Clone)]
pub struct DuelSimulator {
    loader: Arc<BalanceConfigLoader>,
}

impl DuelSimulator {
    pub fn new(loader: Arc<BalanceConfigLoader>) -> Self {
        DuelSimulator { loader }
    }

    /// Simulator over `BALANCE_CONFIG_DIR` and `BALANCE_VERSION`
    pub fn from_env() -> Self {
        Self::new(Arc::new(BalanceConfigLoader::from_env(BalanceContext::from_env())))
    }

    pub fn loader(&self) -> &BalanceConfigLoader {
        &self.loader
    }

    pub fn simulate_pve(&self, request: &PveBattleRequest) -> DuelResult {
        simulate_pve_battle(&self.loader.snapshot(), request)
    }

    pub fn simulate_pvp(&self, request: &PvpBattleRequest) -> DuelResult {
        simulate_pvp_battle(&self.loader.snapshot(), request)
    }
}
