//! Combat stat records shared by the balance profiles and the simulator

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Full combat stat record for one combatant.
///
/// Rates and multipliers are fractions (`0.05` = 5%). Unregulated stats
/// (attack, defense, speed, ...) are only floored at zero by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CombatStats {
    pub max_hp: f64,
    pub physical_attack: f64,
    pub magic_attack: f64,
    pub physical_defense: f64,
    pub magic_defense: f64,
    pub speed: f64,
    pub accuracy: f64,
    pub dodge: f64,
    pub crit_rate: f64,
    pub crit_damage: f64,
    pub final_damage_bonus: f64,
    pub final_damage_reduction: f64,
    pub life_steal: f64,
    pub healing_bonus: f64,
    pub healing_reduction: f64,
    pub control_hit: f64,
    pub control_resist: f64,
    pub physical_penetration: f64,
    pub magic_penetration: f64,
    pub crit_resist: f64,
    pub combo_rate: f64,
    pub block: f64,
    pub counter_rate: f64,
    pub damage_reduction: f64,
    pub healing_received: f64,
    pub rage_gain: f64,
    pub control_strength: f64,
    pub shield_power: f64,
    pub summon_power: f64,
    pub elemental_vulnerability: f64,
}

impl Default for CombatStats {
    fn default() -> Self {
        CombatStats {
            max_hp: 1000.0,
            physical_attack: 100.0,
            magic_attack: 100.0,
            physical_defense: 50.0,
            magic_defense: 50.0,
            speed: 100.0,
            accuracy: 100.0,
            dodge: 100.0,
            crit_rate: 0.05,
            crit_damage: 1.5,
            final_damage_bonus: 0.0,
            final_damage_reduction: 0.0,
            life_steal: 0.0,
            healing_bonus: 0.0,
            healing_reduction: 0.0,
            control_hit: 0.0,
            control_resist: 0.0,
            physical_penetration: 0.0,
            magic_penetration: 0.0,
            crit_resist: 0.0,
            combo_rate: 0.0,
            block: 0.0,
            counter_rate: 0.0,
            damage_reduction: 0.0,
            healing_received: 1.0,
            rage_gain: 0.0,
            control_strength: 0.0,
            shield_power: 0.0,
            summon_power: 0.0,
            elemental_vulnerability: 0.0,
        }
    }
}

impl CombatStats {
    /// Read a stat by key
    pub fn get(&self, key: StatKey) -> f64 {
        *self.slot(key)
    }

    /// Mutable access to a stat by key
    pub fn get_mut(&mut self, key: StatKey) -> &mut f64 {
        match key {
            StatKey::MaxHp => &mut self.max_hp,
            StatKey::PhysicalAttack => &mut self.physical_attack,
            StatKey::MagicAttack => &mut self.magic_attack,
            StatKey::PhysicalDefense => &mut self.physical_defense,
            StatKey::MagicDefense => &mut self.magic_defense,
            StatKey::Speed => &mut self.speed,
            StatKey::Accuracy => &mut self.accuracy,
            StatKey::Dodge => &mut self.dodge,
            StatKey::CritRate => &mut self.crit_rate,
            StatKey::CritDamage => &mut self.crit_damage,
            StatKey::FinalDamageBonus => &mut self.final_damage_bonus,
            StatKey::FinalDamageReduction => &mut self.final_damage_reduction,
            StatKey::LifeSteal => &mut self.life_steal,
            StatKey::HealingBonus => &mut self.healing_bonus,
            StatKey::HealingReduction => &mut self.healing_reduction,
            StatKey::ControlHit => &mut self.control_hit,
            StatKey::ControlResist => &mut self.control_resist,
            StatKey::PhysicalPenetration => &mut self.physical_penetration,
            StatKey::MagicPenetration => &mut self.magic_penetration,
            StatKey::CritResist => &mut self.crit_resist,
            StatKey::ComboRate => &mut self.combo_rate,
            StatKey::Block => &mut self.block,
            StatKey::CounterRate => &mut self.counter_rate,
            StatKey::DamageReduction => &mut self.damage_reduction,
            StatKey::HealingReceived => &mut self.healing_received,
            StatKey::RageGain => &mut self.rage_gain,
            StatKey::ControlStrength => &mut self.control_strength,
            StatKey::ShieldPower => &mut self.shield_power,
            StatKey::SummonPower => &mut self.summon_power,
            StatKey::ElementalVulnerability => &mut self.elemental_vulnerability,
        }
    }

    fn slot(&self, key: StatKey) -> &f64 {
        match key {
            StatKey::MaxHp => &self.max_hp,
            StatKey::PhysicalAttack => &self.physical_attack,
            StatKey::MagicAttack => &self.magic_attack,
            StatKey::PhysicalDefense => &self.physical_defense,
            StatKey::MagicDefense => &self.magic_defense,
            StatKey::Speed => &self.speed,
            StatKey::Accuracy => &self.accuracy,
            StatKey::Dodge => &self.dodge,
            StatKey::CritRate => &self.crit_rate,
            StatKey::CritDamage => &self.crit_damage,
            StatKey::FinalDamageBonus => &self.final_damage_bonus,
            StatKey::FinalDamageReduction => &self.final_damage_reduction,
            StatKey::LifeSteal => &self.life_steal,
            StatKey::HealingBonus => &self.healing_bonus,
            StatKey::HealingReduction => &self.healing_reduction,
            StatKey::ControlHit => &self.control_hit,
            StatKey::ControlResist => &self.control_resist,
            StatKey::PhysicalPenetration => &self.physical_penetration,
            StatKey::MagicPenetration => &self.magic_penetration,
            StatKey::CritResist => &self.crit_resist,
            StatKey::ComboRate => &self.combo_rate,
            StatKey::Block => &self.block,
            StatKey::CounterRate => &self.counter_rate,
            StatKey::DamageReduction => &self.damage_reduction,
            StatKey::HealingReceived => &self.healing_received,
            StatKey::RageGain => &self.rage_gain,
            StatKey::ControlStrength => &self.control_strength,
            StatKey::ShieldPower => &self.shield_power,
            StatKey::SummonPower => &self.summon_power,
            StatKey::ElementalVulnerability => &self.elemental_vulnerability,
        }
    }

    /// Add a set of deltas, skipping non-finite values
    pub fn apply_deltas(&mut self, deltas: &StatDeltas) {
        for (key, value) in deltas.iter() {
            if value.is_finite() {
                *self.get_mut(key) += value;
            }
        }
    }
}

/// Identifier for every field of [`CombatStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatKey {
    MaxHp,
    PhysicalAttack,
    MagicAttack,
    PhysicalDefense,
    MagicDefense,
    Speed,
    Accuracy,
    Dodge,
    CritRate,
    CritDamage,
    FinalDamageBonus,
    FinalDamageReduction,
    LifeSteal,
    HealingBonus,
    HealingReduction,
    ControlHit,
    ControlResist,
    PhysicalPenetration,
    MagicPenetration,
    CritResist,
    ComboRate,
    Block,
    CounterRate,
    DamageReduction,
    HealingReceived,
    RageGain,
    ControlStrength,
    ShieldPower,
    SummonPower,
    ElementalVulnerability,
}

impl StatKey {
    /// Get all stat keys in declaration order
    pub fn all() -> &'static [StatKey] {
        &[
            StatKey::MaxHp,
            StatKey::PhysicalAttack,
            StatKey::MagicAttack,
            StatKey::PhysicalDefense,
            StatKey::MagicDefense,
            StatKey::Speed,
            StatKey::Accuracy,
            StatKey::Dodge,
            StatKey::CritRate,
            StatKey::CritDamage,
            StatKey::FinalDamageBonus,
            StatKey::FinalDamageReduction,
            StatKey::LifeSteal,
            StatKey::HealingBonus,
            StatKey::HealingReduction,
            StatKey::ControlHit,
            StatKey::ControlResist,
            StatKey::PhysicalPenetration,
            StatKey::MagicPenetration,
            StatKey::CritResist,
            StatKey::ComboRate,
            StatKey::Block,
            StatKey::CounterRate,
            StatKey::DamageReduction,
            StatKey::HealingReceived,
            StatKey::RageGain,
            StatKey::ControlStrength,
            StatKey::ShieldPower,
            StatKey::SummonPower,
            StatKey::ElementalVulnerability,
        ]
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Mirrors the serde name so log lines match config keys
        let name = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_default();
        f.write_str(&name)
    }
}

/// Raw additive stat deltas, keyed by stat name
///
/// Serialized as a plain JSON object (`{"critRate": 0.1}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatDeltas(BTreeMap<StatKey, f64>);

impl StatDeltas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style add
    pub fn with(mut self, key: StatKey, value: f64) -> Self {
        self.add(key, value);
        self
    }

    /// Accumulate a delta onto a key
    pub fn add(&mut self, key: StatKey, value: f64) {
        *self.0.entry(key).or_insert(0.0) += value;
    }

    pub fn get(&self, key: StatKey) -> f64 {
        self.0.get(&key).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKey, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge another set of deltas into this one
    pub fn extend(&mut self, other: &StatDeltas) {
        for (key, value) in other.iter() {
            self.add(key, value);
        }
    }

    /// Every delta multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> StatDeltas {
        StatDeltas(self.0.iter().map(|(k, v)| (*k, v * factor)).collect())
    }
}

impl FromIterator<(StatKey, f64)> for StatDeltas {
    fn from_iter<I: IntoIterator<Item = (StatKey, f64)>>(iter: I) -> Self {
        let mut deltas = StatDeltas::new();
        for (key, value) in iter {
            deltas.add(key, value);
        }
        deltas
    }
}

/// Stats outside the core record, each with its own cap
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecialStats {
    /// Flat chance to evade a hit that passed the hit roll
    pub dodge_chance: f64,
    /// Fraction of damage taken returned to the attacker
    pub damage_reflection: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_mut_round_trips_every_key() {
        let mut stats = CombatStats::default();
        for (i, key) in StatKey::all().iter().enumerate() {
            *stats.get_mut(*key) = i as f64;
        }
        for (i, key) in StatKey::all().iter().enumerate() {
            assert!((stats.get(*key) - i as f64).abs() < f64::EPSILON, "{key}");
        }
    }

    #[test]
    fn test_apply_deltas_skips_non_finite() {
        let mut stats = CombatStats::default();
        let deltas = StatDeltas::new()
            .with(StatKey::PhysicalAttack, 25.0)
            .with(StatKey::Speed, f64::NAN)
            .with(StatKey::Dodge, f64::INFINITY);
        stats.apply_deltas(&deltas);

        assert!((stats.physical_attack - 125.0).abs() < f64::EPSILON);
        assert!((stats.speed - 100.0).abs() < f64::EPSILON);
        assert!((stats.dodge - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_deltas_parse_from_camel_case_object() {
        let deltas: StatDeltas =
            serde_json::from_str(r#"{"critRate": 5, "maxHp": 200.5}"#).unwrap();
        assert!((deltas.get(StatKey::CritRate) - 5.0).abs() < f64::EPSILON);
        assert!((deltas.get(StatKey::MaxHp) - 200.5).abs() < f64::EPSILON);
        assert_eq!(StatKey::MaxHp.to_string(), "maxHp");
    }

    #[test]
    fn test_unknown_stat_key_is_rejected() {
        let parsed: Result<StatDeltas, _> = serde_json::from_str(r#"{"mana": 5}"#);
        assert!(parsed.is_err());
    }
}
