//! Skill curve: resource economy, control rules and the combat formulas

use crate::types::{DamageType, ResourceKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SkillCurve {
    pub resource: ResourceCurve,
    pub basic_attack: BasicAttack,
    /// Damage ratio growth per skill level above 1
    pub level_scaling: LevelScaling,
    pub control: ControlRules,
    pub formulas: CombatFormulas,
}

// ============================================================================
// Resource
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ResourceCurve {
    pub kind: ResourceKind,
    pub max: f64,
    /// Starting fill as a fraction of `max`, used when `start_value` is unset
    pub start_fraction: f64,
    /// Absolute starting value, wins over `start_fraction`
    pub start_value: Option<f64>,
    /// Gained by an actor at the start of each of its turns
    pub turn_gain: f64,
    /// Gained by the attacker on a successful basic attack
    pub basic_attack_gain: f64,
    /// Gained by the attacker on a miss
    pub miss_gain: f64,
    /// Gained when losing a full health bar; scales linearly with damage taken
    pub damage_taken_gain: f64,
    pub crit_gain: f64,
    pub crit_taken_gain: f64,
}

impl Default for ResourceCurve {
    fn default() -> Self {
        ResourceCurve {
            kind: ResourceKind::Qi,
            max: 100.0,
            start_fraction: 0.0,
            start_value: None,
            turn_gain: 20.0,
            basic_attack_gain: 10.0,
            miss_gain: 5.0,
            damage_taken_gain: 30.0,
            crit_gain: 5.0,
            crit_taken_gain: 5.0,
        }
    }
}

impl ResourceCurve {
    /// Starting meter value, clamped to `[0, max]`
    pub fn starting_value(&self) -> f64 {
        let value = self
            .start_value
            .unwrap_or(self.start_fraction * self.max);
        value.max(0.0).min(self.max.max(0.0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct BasicAttack {
    pub id: String,
    pub name: String,
    pub damage_ratio: f64,
    pub damage_type: DamageType,
}

impl Default for BasicAttack {
    fn default() -> Self {
        BasicAttack {
            id: "basic_attack".to_string(),
            name: "Basic Attack".to_string(),
            damage_ratio: 1.0,
            damage_type: DamageType::Physical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct LevelScaling {
    pub damage_per_level: f64,
    pub max_level: u32,
}

impl Default for LevelScaling {
    fn default() -> Self {
        LevelScaling {
            damage_per_level: 0.1,
            max_level: 10,
        }
    }
}

impl LevelScaling {
    /// Damage ratio multiplier for a skill level
    pub fn multiplier(&self, level: u32) -> f64 {
        let steps = level.clamp(1, self.max_level.max(1)) - 1;
        1.0 + self.damage_per_level * steps as f64
    }
}

// ============================================================================
// Control effects
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ControlRules {
    /// Lower bound on the contested application chance
    pub min_chance: f64,
    /// Upper bound on the contested application chance
    pub max_chance: f64,
    pub freeze: FreezeRules,
    pub sleep: SleepRules,
}

impl Default for ControlRules {
    fn default() -> Self {
        ControlRules {
            min_chance: 0.05,
            max_chance: 0.85,
            freeze: FreezeRules::default(),
            sleep: SleepRules::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct FreezeRules {
    /// Whether a fire-tagged hit shatters the freeze
    pub break_on_fire: bool,
    /// Damage multiplier for the shattering hit
    pub fire_damage_multiplier: f64,
}

impl Default for FreezeRules {
    fn default() -> Self {
        FreezeRules {
            break_on_fire: true,
            fire_damage_multiplier: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SleepRules {
    pub wake_on_damage: bool,
    /// Extra resource granted at the start of a slept-through turn
    pub turn_resource_gain: f64,
}

impl Default for SleepRules {
    fn default() -> Self {
        SleepRules {
            wake_on_damage: true,
            turn_resource_gain: 10.0,
        }
    }
}

// ============================================================================
// Formulas
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CombatFormulas {
    pub hit_formula: HitFormula,
    pub crit: CritFormula,
    pub penetration: PenetrationFormula,
    pub base_damage: BaseDamageFormula,
    pub final_damage: FinalDamageFormula,
    pub mitigation: MitigationFormula,
    pub healing: HealingFormula,
    pub proc_caps: ProcCaps,
    pub proc_effects: ProcEffects,
    pub special_caps: SpecialCaps,
    pub stat_floors: StatFloors,
}

/// `hit = clamp(base + slope * (accuracy - dodge), min, max)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct HitFormula {
    pub base: f64,
    pub slope: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for HitFormula {
    fn default() -> Self {
        HitFormula {
            base: 0.85,
            slope: 0.002,
            min: 0.3,
            max: 0.98,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CritFormula {
    pub min: f64,
    pub max: f64,
    /// Ceiling on the crit damage multiplier
    pub damage_max: f64,
}

impl Default for CritFormula {
    fn default() -> Self {
        CritFormula {
            min: 0.0,
            max: 0.95,
            damage_max: 3.0,
        }
    }
}

/// `effective_defense = defense * (1 - min(penetration * scale, max))`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct PenetrationFormula {
    pub scale: f64,
    pub max: f64,
}

impl Default for PenetrationFormula {
    fn default() -> Self {
        PenetrationFormula {
            scale: 1.0,
            max: 0.6,
        }
    }
}

/// `base = attack * ratio * (random_min + roll * random_range)`
///
/// After defense the raw damage never drops below `base * min_attack_ratio`
/// nor `min_damage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct BaseDamageFormula {
    pub min_attack_ratio: f64,
    pub random_min: f64,
    pub random_range: f64,
    pub min_damage: f64,
}

impl Default for BaseDamageFormula {
    fn default() -> Self {
        BaseDamageFormula {
            min_attack_ratio: 0.15,
            random_min: 0.9,
            random_range: 0.2,
            min_damage: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct FinalDamageFormula {
    pub bonus_clamp: [f64; 2],
    pub reduction_clamp: [f64; 2],
    /// Floor on `(1 + bonus) * (1 - reduction)`
    pub min_multiplier: f64,
}

impl Default for FinalDamageFormula {
    fn default() -> Self {
        FinalDamageFormula {
            bonus_clamp: [-0.5, 3.0],
            reduction_clamp: [0.0, 0.9],
            min_multiplier: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct MitigationFormula {
    pub damage_reduction_max: f64,
}

impl Default for MitigationFormula {
    fn default() -> Self {
        MitigationFormula {
            damage_reduction_max: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct HealingFormula {
    pub life_steal_max: f64,
    pub healing_received_clamp: [f64; 2],
    pub bonus_clamp: [f64; 2],
    pub reduction_clamp: [f64; 2],
}

impl Default for HealingFormula {
    fn default() -> Self {
        HealingFormula {
            life_steal_max: 0.6,
            healing_received_clamp: [0.2, 1.5],
            bonus_clamp: [0.0, 2.0],
            reduction_clamp: [0.0, 0.9],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ProcCaps {
    pub combo_rate: f64,
    pub block: f64,
    pub counter_rate: f64,
}

impl Default for ProcCaps {
    fn default() -> Self {
        ProcCaps {
            combo_rate: 0.5,
            block: 0.5,
            counter_rate: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ProcEffects {
    /// Follow-up strike size relative to the triggering hit
    pub combo_ratio: f64,
    /// Counter strike size relative to the defender's physical attack
    pub counter_ratio: f64,
    /// Fraction of a blocked hit that is absorbed
    pub block_reduction: f64,
}

impl Default for ProcEffects {
    fn default() -> Self {
        ProcEffects {
            combo_ratio: 0.5,
            counter_ratio: 0.6,
            block_reduction: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SpecialCaps {
    pub dodge_chance: f64,
    pub damage_reflection: f64,
}

impl Default for SpecialCaps {
    fn default() -> Self {
        SpecialCaps {
            dodge_chance: 0.5,
            damage_reflection: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct StatFloors {
    pub crit_damage_min: f64,
    pub max_hp_min: f64,
}

impl Default for StatFloors {
    fn default() -> Self {
        StatFloors {
            crit_damage_min: 1.2,
            max_hp_min: 1.0,
        }
    }
}
