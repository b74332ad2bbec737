//! CombatStatResolver - Baseline stats plus deltas, clamped to profile bounds
//!
//! Every regulated stat is clamped on every resolution:
//! - critRate in [crit.min, crit.max]
//! - critDamage in [statFloors.critDamageMin, crit.damageMax]
//! - finalDamageBonus / finalDamageReduction by finalDamage.*Clamp
//! - damageReduction in [0, mitigation.damageReductionMax]
//! - lifeSteal in [0, healing.lifeStealMax]
//! - healingReceived / healingBonus / healingReduction by healing.*Clamp
//! - comboRate / block / counterRate in [0, procCaps.*]
//! - maxHp >= statFloors.maxHpMin
//!
//! Everything else is floored at zero.

use balance_core::profile::CombatFormulas;
use balance_core::{clamp_range, BalanceSnapshot, CombatStats, SpecialStats, StatDeltas, StatKey};

/// Resolve a full stat record from the level curve baseline and raw deltas
pub fn resolve_combat_stats(snapshot: &BalanceSnapshot, deltas: &StatDeltas) -> CombatStats {
    let mut stats = snapshot.level.combat_stats;
    stats.apply_deltas(deltas);
    clamp_combat_stats(&mut stats, &snapshot.skill.formulas);
    stats
}

/// Clamp every stat of `stats` in place
pub fn clamp_combat_stats(stats: &mut CombatStats, formulas: &CombatFormulas) {
    let crit = &formulas.crit;
    let healing = &formulas.healing;
    let caps = &formulas.proc_caps;

    for &key in StatKey::all() {
        let value = stats.get_mut(key);
        *value = match key {
            StatKey::CritRate => clamp_range(*value, [crit.min, crit.max]),
            StatKey::CritDamage => {
                clamp_range(*value, [formulas.stat_floors.crit_damage_min, crit.damage_max])
            }
            StatKey::FinalDamageBonus => clamp_range(*value, formulas.final_damage.bonus_clamp),
            StatKey::FinalDamageReduction => {
                clamp_range(*value, formulas.final_damage.reduction_clamp)
            }
            StatKey::DamageReduction => {
                clamp_range(*value, [0.0, formulas.mitigation.damage_reduction_max])
            }
            StatKey::LifeSteal => clamp_range(*value, [0.0, healing.life_steal_max]),
            StatKey::HealingReceived => clamp_range(*value, healing.healing_received_clamp),
            StatKey::HealingBonus => clamp_range(*value, healing.bonus_clamp),
            StatKey::HealingReduction => clamp_range(*value, healing.reduction_clamp),
            StatKey::ComboRate => clamp_range(*value, [0.0, caps.combo_rate]),
            StatKey::Block => clamp_range(*value, [0.0, caps.block]),
            StatKey::CounterRate => clamp_range(*value, [0.0, caps.counter_rate]),
            StatKey::MaxHp => value.max(formulas.stat_floors.max_hp_min),
            _ => value.max(0.0),
        };
    }
}

/// Clamp special stats to `specialCaps`
pub fn resolve_special_stats(snapshot: &BalanceSnapshot, special: &SpecialStats) -> SpecialStats {
    let caps = &snapshot.skill.formulas.special_caps;
    SpecialStats {
        dodge_chance: clamp_range(special.dodge_chance, [0.0, caps.dodge_chance]),
        damage_reflection: clamp_range(special.damage_reflection, [0.0, caps.damage_reflection]),
    }
}
