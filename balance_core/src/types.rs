use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of a duel an actor fights on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    Player,
    Opponent,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => write!(f, "player"),
            Side::Opponent => write!(f, "opponent"),
        }
    }
}

/// Duel mode, selects the pve or pvp profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Pve,
    Pvp,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Pve => write!(f, "pve"),
            Mode::Pvp => write!(f, "pvp"),
        }
    }
}

/// Damage channel: picks the attack, defense and penetration stats used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    #[default]
    Physical,
    Magic,
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DamageType::Physical => write!(f, "physical"),
            DamageType::Magic => write!(f, "magic"),
        }
    }
}

/// Elemental tag carried by some skills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Fire,
    Frost,
    Lightning,
    Wind,
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Fire => write!(f, "fire"),
            Element::Frost => write!(f, "frost"),
            Element::Lightning => write!(f, "lightning"),
            Element::Wind => write!(f, "wind"),
        }
    }
}

/// Kind of skill resource meter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    #[default]
    Qi,
    Rage,
    Mana,
}

/// Clamp `value` into `[range[0], range[1]]` without panicking on bad bounds
///
/// A NaN `value` lands on the lower bound.
pub fn clamp_range(value: f64, range: [f64; 2]) -> f64 {
    value.max(range[0]).min(range[1])
}
