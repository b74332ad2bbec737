//! Equipment curve: rarity and enhancement scaling for gear stats

use serde::{Deserialize, Serialize};
use std::fmt;

/// Item rarity tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    #[default]
    Common,
    Rare,
    Epic,
    Legendary,
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rarity::Common => write!(f, "Common"),
            Rarity::Rare => write!(f, "Rare"),
            Rarity::Epic => write!(f, "Epic"),
            Rarity::Legendary => write!(f, "Legendary"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RarityMultipliers {
    pub common: f64,
    pub rare: f64,
    pub epic: f64,
    pub legendary: f64,
}

impl Default for RarityMultipliers {
    fn default() -> Self {
        RarityMultipliers {
            common: 1.0,
            rare: 1.2,
            epic: 1.45,
            legendary: 1.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct EquipmentCurve {
    pub rarity_multipliers: RarityMultipliers,
    /// Fractional bonus per enhance level (0.05 = +5% per level)
    pub enhance_step: f64,
    /// Enhance levels above this grant nothing
    pub max_enhance: u32,
}

impl Default for EquipmentCurve {
    fn default() -> Self {
        EquipmentCurve {
            rarity_multipliers: RarityMultipliers::default(),
            enhance_step: 0.05,
            max_enhance: 15,
        }
    }
}

impl EquipmentCurve {
    pub fn rarity_multiplier(&self, rarity: Rarity) -> f64 {
        match rarity {
            Rarity::Common => self.rarity_multipliers.common,
            Rarity::Rare => self.rarity_multipliers.rare,
            Rarity::Epic => self.rarity_multipliers.epic,
            Rarity::Legendary => self.rarity_multipliers.legendary,
        }
    }

    /// Total multiplier for a piece of gear
    ///
    /// `rarity_multiplier * (1 + enhance_step * min(enhance, max_enhance))`
    pub fn piece_multiplier(&self, rarity: Rarity, enhance: u32) -> f64 {
        let steps = enhance.min(self.max_enhance) as f64;
        self.rarity_multiplier(rarity) * (1.0 + self.enhance_step * steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_multiplier() {
        let curve = EquipmentCurve::default();
        assert!((curve.piece_multiplier(Rarity::Common, 0) - 1.0).abs() < f64::EPSILON);
        // 1.2 * (1 + 0.05 * 10) = 1.8
        assert!((curve.piece_multiplier(Rarity::Rare, 10) - 1.8).abs() < 1e-9);
        // Enhance beyond the cap is ignored
        assert!(
            (curve.piece_multiplier(Rarity::Epic, 99) - curve.piece_multiplier(Rarity::Epic, 15))
                .abs()
                < f64::EPSILON
        );
    }
}
