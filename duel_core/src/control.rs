//! Control effects - stun, silence, freeze, sleep
//!
//! Each kind's behaviour is expressed through the hook methods on
//! [`ControlKind`]; the engine only ever asks the hooks, never the kind.

use balance_core::profile::ControlRules;
use balance_core::Element;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    Stun,
    Silence,
    Freeze,
    Sleep,
}

/// What a control does when its holder's turn starts
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TurnStartEffect {
    pub skip_turn: bool,
    pub resource_gain: f64,
}

/// How a control reacts to its holder taking a hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageReaction {
    /// Multiplier for the hit that triggered the reaction
    pub damage_multiplier: f64,
    /// Whether the control ends immediately
    pub breaks: bool,
}

impl Default for DamageReaction {
    fn default() -> Self {
        DamageReaction {
            damage_multiplier: 1.0,
            breaks: false,
        }
    }
}

impl ControlKind {
    pub fn skips_turn(self) -> bool {
        match self {
            ControlKind::Stun | ControlKind::Freeze | ControlKind::Sleep => true,
            ControlKind::Silence => false,
        }
    }

    pub fn disables_basic_attack(self) -> bool {
        match self {
            ControlKind::Stun | ControlKind::Freeze | ControlKind::Sleep => true,
            ControlKind::Silence => false,
        }
    }

    pub fn disables_active_skills(self) -> bool {
        match self {
            ControlKind::Stun | ControlKind::Silence | ControlKind::Freeze | ControlKind::Sleep => {
                true
            }
        }
    }

    /// A helpless target contributes neither dodge nor dodge chance
    pub fn disables_dodge(self) -> bool {
        match self {
            ControlKind::Stun | ControlKind::Freeze | ControlKind::Sleep => true,
            ControlKind::Silence => false,
        }
    }

    pub fn on_turn_start(self, rules: &ControlRules) -> TurnStartEffect {
        match self {
            ControlKind::Sleep => TurnStartEffect {
                skip_turn: true,
                resource_gain: rules.sleep.turn_resource_gain,
            },
            ControlKind::Stun | ControlKind::Freeze => TurnStartEffect {
                skip_turn: true,
                resource_gain: 0.0,
            },
            ControlKind::Silence => TurnStartEffect::default(),
        }
    }

    /// Reaction to a hit of `element` landing on the holder
    pub fn on_damage_taken(self, element: Option<Element>, rules: &ControlRules) -> DamageReaction {
        match self {
            ControlKind::Freeze if rules.freeze.break_on_fire && element == Some(Element::Fire) => {
                DamageReaction {
                    damage_multiplier: rules.freeze.fire_damage_multiplier,
                    breaks: true,
                }
            }
            ControlKind::Sleep if rules.sleep.wake_on_damage => DamageReaction {
                damage_multiplier: 1.0,
                breaks: true,
            },
            ControlKind::Stun | ControlKind::Silence | ControlKind::Freeze | ControlKind::Sleep => {
                DamageReaction::default()
            }
        }
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlKind::Stun => write!(f, "stun"),
            ControlKind::Silence => write!(f, "silence"),
            ControlKind::Freeze => write!(f, "freeze"),
            ControlKind::Sleep => write!(f, "sleep"),
        }
    }
}

/// An active control with its remaining duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlEffect {
    pub kind: ControlKind,
    pub remaining_turns: u32,
}

/// Result of applying a control to a set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlApplication {
    Added,
    /// Already present; duration is now the longer of old and new
    Refreshed,
}

/// Active controls on one actor, at most one per kind, in application order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlSet {
    effects: Vec<ControlEffect>,
}

impl ControlSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, kind: ControlKind, turns: u32) -> ControlApplication {
        match self.effects.iter_mut().find(|e| e.kind == kind) {
            Some(existing) => {
                existing.remaining_turns = existing.remaining_turns.max(turns);
                ControlApplication::Refreshed
            }
            None => {
                self.effects.push(ControlEffect {
                    kind,
                    remaining_turns: turns,
                });
                ControlApplication::Added
            }
        }
    }

    pub fn remove(&mut self, kind: ControlKind) -> bool {
        let before = self.effects.len();
        self.effects.retain(|e| e.kind != kind);
        self.effects.len() != before
    }

    pub fn contains(&self, kind: ControlKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControlEffect> {
        self.effects.iter()
    }

    pub fn kinds(&self) -> Vec<ControlKind> {
        self.effects.iter().map(|e| e.kind).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn skips_turn(&self) -> bool {
        self.effects.iter().any(|e| e.kind.skips_turn())
    }

    pub fn disables_basic_attack(&self) -> bool {
        self.effects.iter().any(|e| e.kind.disables_basic_attack())
    }

    pub fn disables_active_skills(&self) -> bool {
        self.effects.iter().any(|e| e.kind.disables_active_skills())
    }

    pub fn disables_dodge(&self) -> bool {
        self.effects.iter().any(|e| e.kind.disables_dodge())
    }

    /// Count every control down one turn, returning the kinds that ran out
    pub fn tick(&mut self) -> Vec<ControlKind> {
        let mut expired = Vec::new();
        for effect in &mut self.effects {
            effect.remaining_turns = effect.remaining_turns.saturating_sub(1);
            if effect.remaining_turns == 0 {
                expired.push(effect.kind);
            }
        }
        self.effects.retain(|e| e.remaining_turns > 0);
        expired
    }
}
