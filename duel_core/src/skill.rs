//! Skill definitions and per-duel skill state

use crate::control::ControlKind;
use balance_core::{DamageType, Element};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a skill definition was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkillError {
    #[error("skill id is empty")]
    EmptyId,
    #[error("skill '{id}' has invalid cost {cost}")]
    InvalidCost { id: String, cost: f64 },
    #[error("skill '{id}' has invalid {field} {value}")]
    InvalidRatio {
        id: String,
        field: &'static str,
        value: f64,
    },
    #[error("skill '{id}' has invalid control chance {chance}")]
    InvalidControlChance { id: String, chance: f64 },
}

/// Control a skill attempts to apply on hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlSpec {
    pub kind: ControlKind,
    /// Base application chance before controlHit / controlResist
    pub chance: f64,
    /// Base duration before controlStrength
    pub turns: u32,
}

/// An active skill in a combatant's kit
///
/// A skill with `damage_ratio <= 0` and no summon ratio is a pure support
/// skill: it never rolls to hit and only heals or shields its user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillDefinition {
    pub id: String,
    pub name: String,
    /// Higher fires first when several skills are ready
    pub priority: i32,
    /// Resource spent on use
    pub cost: f64,
    /// Turns before the skill can be used again
    pub cooldown: u32,
    /// Skill level, scales the damage ratio through the level scaling curve
    pub level: u32,
    pub damage_type: DamageType,
    pub element: Option<Element>,
    pub damage_ratio: f64,
    /// Heal for `heal_ratio * magicAttack`
    pub heal_ratio: f64,
    /// Shield for `shield_ratio * magicAttack * (1 + shieldPower)`
    pub shield_ratio: f64,
    /// Extra damage of `summon_ratio * summonPower * attack`
    pub summon_ratio: f64,
    pub control: Option<ControlSpec>,
}

impl Default for SkillDefinition {
    fn default() -> Self {
        SkillDefinition {
            id: String::new(),
            name: String::new(),
            priority: 0,
            cost: 0.0,
            cooldown: 0,
            level: 1,
            damage_type: DamageType::Physical,
            element: None,
            damage_ratio: 1.0,
            heal_ratio: 0.0,
            shield_ratio: 0.0,
            summon_ratio: 0.0,
            control: None,
        }
    }
}

impl SkillDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        SkillDefinition {
            name: id.clone(),
            id,
            ..Default::default()
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_cooldown(mut self, cooldown: u32) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_damage(mut self, damage_type: DamageType, ratio: f64) -> Self {
        self.damage_type = damage_type;
        self.damage_ratio = ratio;
        self
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    pub fn with_heal(mut self, ratio: f64) -> Self {
        self.heal_ratio = ratio;
        self
    }

    pub fn with_shield(mut self, ratio: f64) -> Self {
        self.shield_ratio = ratio;
        self
    }

    pub fn with_summon(mut self, ratio: f64) -> Self {
        self.summon_ratio = ratio;
        self
    }

    pub fn with_control(mut self, kind: ControlKind, chance: f64, turns: u32) -> Self {
        self.control = Some(ControlSpec {
            kind,
            chance,
            turns,
        });
        self
    }

    /// Whether the skill targets the opponent at all
    pub fn is_offensive(&self) -> bool {
        self.damage_ratio > 0.0 || self.summon_ratio > 0.0
    }

    pub fn validate(&self) -> Result<(), SkillError> {
        if self.id.trim().is_empty() {
            return Err(SkillError::EmptyId);
        }
        if !self.cost.is_finite() || self.cost < 0.0 {
            return Err(SkillError::InvalidCost {
                id: self.id.clone(),
                cost: self.cost,
            });
        }
        for (field, value) in [
            ("damageRatio", self.damage_ratio),
            ("healRatio", self.heal_ratio),
            ("shieldRatio", self.shield_ratio),
            ("summonRatio", self.summon_ratio),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SkillError::InvalidRatio {
                    id: self.id.clone(),
                    field,
                    value,
                });
            }
        }
        if let Some(control) = &self.control {
            if !control.chance.is_finite() {
                return Err(SkillError::InvalidControlChance {
                    id: self.id.clone(),
                    chance: control.chance,
                });
            }
        }
        Ok(())
    }
}

/// A validated skill with its cooldown state for one duel
#[derive(Debug, Clone, PartialEq)]
pub struct SkillSlot {
    pub definition: SkillDefinition,
    /// Turns until the skill is usable again, 0 = ready
    pub cooldown_remaining: u32,
}

impl SkillSlot {
    pub fn new(definition: SkillDefinition) -> Self {
        SkillSlot {
            definition,
            cooldown_remaining: 0,
        }
    }

    pub fn is_off_cooldown(&self) -> bool {
        self.cooldown_remaining == 0
    }

    /// Off cooldown and affordable with `resource`
    pub fn is_ready(&self, resource: f64) -> bool {
        self.is_off_cooldown() && resource >= self.definition.cost
    }

    /// Put the skill on cooldown after use
    ///
    /// The end-of-turn tick runs right after, so a cooldown of `n` blocks the
    /// skill for the user's next `n` turns.
    pub fn start_cooldown(&mut self) {
        self.cooldown_remaining = match self.definition.cooldown {
            0 => 0,
            turns => turns.saturating_add(1),
        };
    }

    pub fn tick(&mut self) {
        self.cooldown_remaining = self.cooldown_remaining.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_bad_definitions() {
        assert_eq!(SkillDefinition::new("  ").validate(), Err(SkillError::EmptyId));
        assert!(matches!(
            SkillDefinition::new("a").with_cost(f64::NAN).validate(),
            Err(SkillError::InvalidCost { .. })
        ));
        assert!(matches!(
            SkillDefinition::new("a").with_cost(-1.0).validate(),
            Err(SkillError::InvalidCost { .. })
        ));
        assert!(matches!(
            SkillDefinition::new("a").with_heal(f64::INFINITY).validate(),
            Err(SkillError::InvalidRatio { field: "healRatio", .. })
        ));
        assert!(SkillDefinition::new("a").with_cost(30.0).validate().is_ok());
    }

    #[test]
    fn test_parse_with_defaults() {
        let skill: SkillDefinition = serde_json::from_str(
            r#"{
                "id": "flame",
                "cost": 40,
                "element": "fire",
                "control": {"kind": "stun", "chance": 0.3, "turns": 1}
            }"#,
        )
        .unwrap();
        assert_eq!(skill.level, 1);
        assert!((skill.damage_ratio - 1.0).abs() < f64::EPSILON);
        assert_eq!(skill.element, Some(Element::Fire));
        assert_eq!(skill.control.map(|c| c.kind), Some(ControlKind::Stun));
    }

    #[test]
    fn test_cooldown_blocks_next_turns() {
        let mut slot = SkillSlot::new(SkillDefinition::new("a").with_cooldown(2));
        assert!(slot.is_ready(0.0));

        slot.start_cooldown();
        // End of the turn it was used
        slot.tick();
        assert!(!slot.is_off_cooldown());
        slot.tick();
        assert!(!slot.is_off_cooldown());
        slot.tick();
        assert!(slot.is_off_cooldown());
    }

    #[test]
    fn test_ready_requires_resource() {
        let slot = SkillSlot::new(SkillDefinition::new("a").with_cost(50.0));
        assert!(!slot.is_ready(49.0));
        assert!(slot.is_ready(50.0));
    }
}
