//! Level and gear progression expressed as raw stat deltas

use balance_core::{EquipmentCurve, LevelCurve, Rarity, StatDeltas};
use serde::{Deserialize, Serialize};

/// A piece of gear contributing stats to a combatant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EquipmentPiece {
    pub slot: String,
    pub rarity: Rarity,
    /// Enhance level, capped by the equipment curve
    pub enhance: u32,
    /// Base stats before rarity and enhance scaling
    pub stats: StatDeltas,
}

/// Growth deltas for a level on the given curve
pub fn level_deltas(curve: &LevelCurve, level: u32) -> StatDeltas {
    curve
        .growth_per_level
        .scaled(curve.growth_steps(level) as f64)
}

/// Summed deltas of every equipped piece after rarity and enhance scaling
pub fn equipment_deltas(curve: &EquipmentCurve, pieces: &[EquipmentPiece]) -> StatDeltas {
    let mut total = StatDeltas::new();
    for piece in pieces {
        let multiplier = curve.piece_multiplier(piece.rarity, piece.enhance);
        total.extend(&piece.stats.scaled(multiplier));
    }
    total
}
