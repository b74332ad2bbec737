//! Per-mode duel rules (PvE curve and PvP config)

use crate::types::Side;
use serde::{Deserialize, Serialize};

/// Rules shared by both duel modes, read by the simulator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeRules {
    pub round_limit: u32,
    pub fallback_first: Side,
    pub default_seed: u64,
    pub damage_multiplier: f64,
    pub healing_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct PveCurve {
    pub round_limit: u32,
    /// Side that acts first on an exact speed tie
    pub fallback_first: Side,
    /// Seed used when a request carries none (or a non-finite one)
    pub default_seed: u64,
    pub damage_multiplier: f64,
    pub healing_multiplier: f64,
    pub stage_growth: StageGrowth,
}

impl Default for PveCurve {
    fn default() -> Self {
        PveCurve {
            round_limit: 30,
            fallback_first: Side::Player,
            default_seed: 20_240_601,
            damage_multiplier: 1.0,
            healing_multiplier: 1.0,
            stage_growth: StageGrowth::default(),
        }
    }
}

impl PveCurve {
    pub fn rules(&self) -> ModeRules {
        ModeRules {
            round_limit: self.round_limit,
            fallback_first: self.fallback_first,
            default_seed: self.default_seed,
            damage_multiplier: self.damage_multiplier,
            healing_multiplier: self.healing_multiplier,
        }
    }
}

/// Enemy scaling per stage above 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct StageGrowth {
    pub hp: f64,
    pub attack: f64,
    pub max_stage: u32,
}

impl Default for StageGrowth {
    fn default() -> Self {
        StageGrowth {
            hp: 0.08,
            attack: 0.05,
            max_stage: 200,
        }
    }
}

impl StageGrowth {
    /// `(hp_multiplier, attack_multiplier)` for a stage
    pub fn multipliers(&self, stage: u32) -> (f64, f64) {
        let steps = (stage.clamp(1, self.max_stage.max(1)) - 1) as f64;
        (1.0 + self.hp * steps, 1.0 + self.attack * steps)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct PvpConfig {
    pub round_limit: u32,
    pub fallback_first: Side,
    pub default_seed: u64,
    pub damage_multiplier: f64,
    /// Scales every heal applied during a PvP duel
    pub healing_multiplier: f64,
}

impl Default for PvpConfig {
    fn default() -> Self {
        PvpConfig {
            round_limit: 20,
            fallback_first: Side::Player,
            default_seed: 90_210,
            damage_multiplier: 1.0,
            healing_multiplier: 0.8,
        }
    }
}

impl PvpConfig {
    pub fn rules(&self) -> ModeRules {
        ModeRules {
            round_limit: self.round_limit,
            fallback_first: self.fallback_first,
            default_seed: self.default_seed,
            damage_multiplier: self.damage_multiplier,
            healing_multiplier: self.healing_multiplier,
        }
    }
}
