//! Prelude module for convenient imports
//!
//! ```rust
//! use duel_core::prelude::*;
//! ```

// Simulation
pub use crate::duel::{DuelOutcome, DuelResult, DuelSimulator, PveBattleRequest, PvpBattleRequest};

// Combatants
pub use crate::actor::{CombatantDefinition, EnemyConfig};
pub use crate::skill::SkillDefinition;
pub use crate::stats::EquipmentPiece;

// Timeline
pub use crate::combat::{CombatEvent, TurnEvent};
pub use crate::control::ControlKind;

// Re-exports from balance_core
pub use balance_core::{
    BalanceConfigLoader, BalanceContext, ConfigSource, DamageType, Element, Side, StatDeltas,
    StatKey,
};
