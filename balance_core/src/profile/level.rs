//! Level curve: baseline combat stats and per-level growth

use crate::stats::{CombatStats, StatDeltas, StatKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct LevelCurve {
    /// Highest level that still grants growth
    pub max_level: u32,
    /// Baseline stat record every combatant starts from
    pub combat_stats: CombatStats,
    /// Deltas granted per level above 1
    pub growth_per_level: StatDeltas,
}

impl Default for LevelCurve {
    fn default() -> Self {
        LevelCurve {
            max_level: 100,
            combat_stats: CombatStats::default(),
            growth_per_level: StatDeltas::new()
                .with(StatKey::MaxHp, 40.0)
                .with(StatKey::PhysicalAttack, 4.0)
                .with(StatKey::MagicAttack, 4.0)
                .with(StatKey::PhysicalDefense, 2.0)
                .with(StatKey::MagicDefense, 2.0)
                .with(StatKey::Speed, 0.5)
                .with(StatKey::Accuracy, 1.0),
        }
    }
}

impl LevelCurve {
    /// Number of growth steps for a level, capped at `max_level`
    pub fn growth_steps(&self, level: u32) -> u32 {
        level.clamp(1, self.max_level.max(1)) - 1
    }
}
