//! Combat formulas - hit, damage, crit, healing and control chances
//!
//! Pure functions over resolved stats and the skill curve's formulas; the
//! engine supplies the rolls.

use balance_core::profile::{CombatFormulas, ControlRules};
use balance_core::{clamp_range, CombatStats, DamageType, SpecialStats};

/// Chance for an attack to land
///
/// `clamp(base + slope * (accuracy - dodge), min, max) * (1 - dodgeChance)`.
/// A defender whose dodge is disabled contributes neither dodge nor dodge
/// chance.
pub fn hit_chance(
    formulas: &CombatFormulas,
    attacker: &CombatStats,
    defender: &CombatStats,
    defender_special: &SpecialStats,
    dodge_disabled: bool,
) -> f64 {
    let hit = &formulas.hit_formula;
    let (dodge, dodge_chance) = if dodge_disabled {
        (0.0, 0.0)
    } else {
        (
            defender.dodge,
            clamp_range(
                defender_special.dodge_chance,
                [0.0, formulas.special_caps.dodge_chance],
            ),
        )
    };

    let base = clamp_range(
        hit.base + hit.slope * (attacker.accuracy - dodge),
        [hit.min, hit.max],
    );
    base * (1.0 - dodge_chance)
}

/// `defense * (1 - min(penetration * scale, max))`
pub fn effective_defense(formulas: &CombatFormulas, defense: f64, penetration: f64) -> f64 {
    let pen = &formulas.penetration;
    let reduction = clamp_range(penetration * pen.scale, [0.0, pen.max]);
    defense.max(0.0) * (1.0 - reduction)
}

/// Attack, defense and penetration for a damage channel
pub fn channel_stats(
    damage_type: DamageType,
    attacker: &CombatStats,
    defender: &CombatStats,
) -> (f64, f64, f64) {
    match damage_type {
        DamageType::Physical => (
            attacker.physical_attack,
            defender.physical_defense,
            attacker.physical_penetration,
        ),
        DamageType::Magic => (
            attacker.magic_attack,
            defender.magic_defense,
            attacker.magic_penetration,
        ),
    }
}

/// Damage of one strike after defense, mitigation and final damage scaling
///
/// Does not include the mode multiplier, elements, summons, crits or blocks.
pub fn mitigated_damage(
    formulas: &CombatFormulas,
    damage_type: DamageType,
    ratio: f64,
    variance_roll: f64,
    attacker: &CombatStats,
    defender: &CombatStats,
) -> f64 {
    let (attack, defense, penetration) = channel_stats(damage_type, attacker, defender);
    let base_formula = &formulas.base_damage;

    // Step 1: Rolled base damage
    let base = attack
        * ratio
        * (base_formula.random_min + variance_roll * base_formula.random_range);

    // Step 2: Defense, with floors
    let eff_def = effective_defense(formulas, defense, penetration);
    let raw = (base - eff_def)
        .max(base * base_formula.min_attack_ratio)
        .max(base_formula.min_damage);

    // Step 3: Flat damage reduction
    let dr = clamp_range(
        defender.damage_reduction,
        [0.0, formulas.mitigation.damage_reduction_max],
    );
    let after_dr = raw * (1.0 - dr);

    // Step 4: Final damage bonus vs reduction
    after_dr * final_damage_multiplier(formulas, attacker, defender)
}

/// `max((1 + bonus) * (1 - reduction), minMultiplier)`
pub fn final_damage_multiplier(
    formulas: &CombatFormulas,
    attacker: &CombatStats,
    defender: &CombatStats,
) -> f64 {
    let fd = &formulas.final_damage;
    let bonus = clamp_range(attacker.final_damage_bonus, fd.bonus_clamp);
    let reduction = clamp_range(defender.final_damage_reduction, fd.reduction_clamp);
    ((1.0 + bonus) * (1.0 - reduction)).max(fd.min_multiplier)
}

/// `clamp(critRate - critResist, crit.min, crit.max)`
pub fn crit_chance(
    formulas: &CombatFormulas,
    attacker: &CombatStats,
    defender: &CombatStats,
) -> f64 {
    clamp_range(
        attacker.crit_rate - defender.crit_resist,
        [formulas.crit.min, formulas.crit.max],
    )
}

pub fn crit_multiplier(formulas: &CombatFormulas, attacker: &CombatStats) -> f64 {
    clamp_range(
        attacker.crit_damage,
        [formulas.stat_floors.crit_damage_min, formulas.crit.damage_max],
    )
}

/// Multiplier applied to every heal from `healer` onto `target`
pub fn heal_multiplier(
    formulas: &CombatFormulas,
    healer: &CombatStats,
    target: &CombatStats,
    mode_multiplier: f64,
) -> f64 {
    let healing = &formulas.healing;
    let bonus = clamp_range(healer.healing_bonus, healing.bonus_clamp);
    let reduction = clamp_range(target.healing_reduction, healing.reduction_clamp);
    let received = clamp_range(target.healing_received, healing.healing_received_clamp);
    ((1.0 + bonus) * (1.0 - reduction) * received * mode_multiplier).max(0.0)
}

pub fn life_steal_amount(formulas: &CombatFormulas, attacker: &CombatStats, damage: f64) -> f64 {
    damage.max(0.0) * clamp_range(attacker.life_steal, [0.0, formulas.healing.life_steal_max])
}

/// Contested control chance, bounded by the control rules
pub fn control_chance(
    rules: &ControlRules,
    base_chance: f64,
    attacker: &CombatStats,
    defender: &CombatStats,
) -> f64 {
    clamp_range(
        base_chance + attacker.control_hit - defender.control_resist,
        [rules.min_chance, rules.max_chance],
    )
}

/// `round(turns * (1 + controlStrength))`, at least one turn
pub fn control_duration(turns: u32, control_strength: f64) -> u32 {
    let scaled = (turns as f64 * (1.0 + control_strength.max(0.0))).round();
    if scaled.is_finite() && scaled >= 1.0 {
        scaled.min(u32::MAX as f64) as u32
    } else {
        1
    }
}

/// Resource gain after the holder's rage gain bonus
pub fn scaled_resource_gain(amount: f64, rage_gain: f64) -> f64 {
    (amount * (1.0 + rage_gain.max(0.0))).max(0.0)
}
