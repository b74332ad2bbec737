//! Stat resolution - raw deltas to clamped combat stats

mod progression;
mod resolver;

pub use progression::{equipment_deltas, level_deltas, EquipmentPiece};
pub use resolver::{clamp_combat_stats, resolve_combat_stats, resolve_special_stats};
