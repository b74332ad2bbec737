//! Turn resolution: formulas, the skill engine and timeline events

mod engine;
mod event;
pub mod resolution;

pub use engine::{take_turn, TurnContext, TurnRolls, COUNTER_STRIKE_ID};
pub use event::{CombatEvent, HealSource, HitKind, TurnEvent};
