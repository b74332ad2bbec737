//! duel_core - Deterministic turn-based duel simulation
//!
//! This library provides:
//! - Stat resolution: level, equipment and explicit deltas to clamped stats
//! - Control effects: stun, silence, freeze and sleep with per-kind hooks
//! - SkillEngine: the turn pipeline from skill choice to cooldown ticks
//! - DuelSimulator: PvE and PvP battles with a full event timeline
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use duel_core::prelude::*;
//! use std::sync::Arc;
//!
//! let loader = BalanceConfigLoader::new(BalanceContext::new("v2"), ConfigSource::Embedded);
//! let simulator = DuelSimulator::new(Arc::new(loader));
//!
//! let request = PvpBattleRequest {
//!     player_a: CombatantDefinition::new("alpha"),
//!     player_b: CombatantDefinition::new("beta"),
//!     seed: Some(42.0),
//!     round_limit: None,
//! };
//! let result = simulator.simulate_pvp(&request);
//! println!("{:?} after {} rounds", result.outcome, result.rounds);
//! ```

pub mod actor;
pub mod combat;
pub mod control;
pub mod duel;
pub mod prelude;
pub mod skill;
pub mod stats;
pub mod turn_order;

// Core API - what most users need
pub use duel::{
    simulate_pve_battle, simulate_pvp_battle, DrawReason, DuelOutcome, DuelResult, DuelSimulator,
    PveBattleRequest, PvpBattleRequest, RemainingHp,
};
pub use actor::{ActorRuntime, CombatantDefinition, EnemyConfig};
pub use combat::{CombatEvent, TurnEvent};
pub use control::{ControlEffect, ControlKind};
pub use skill::{SkillDefinition, SkillError};

// Build previews
pub use stats::{resolve_combat_stats, EquipmentPiece};

// Re-export commonly needed balance_core types
pub use balance_core::{
    BalanceConfigLoader, BalanceContext, BalanceSnapshot, CombatStats, ConfigSource, DamageType,
    Element, Mode, Side, SpecialStats, StatDeltas, StatKey,
};
