//! Typed balance profiles, one per tuning domain

mod equipment;
mod level;
mod mode;
mod skill;

pub use equipment::{EquipmentCurve, Rarity, RarityMultipliers};
pub use level::LevelCurve;
pub use mode::{ModeRules, PvpConfig, PveCurve, StageGrowth};
pub use skill::{
    BaseDamageFormula, BasicAttack, CombatFormulas, ControlRules, CritFormula,
    FinalDamageFormula, FreezeRules, HealingFormula, HitFormula, LevelScaling,
    MitigationFormula, PenetrationFormula, ProcCaps, ProcEffects, ResourceCurve, SkillCurve,
    SleepRules, SpecialCaps, StatFloors,
};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::ops::Deref;

/// Tuning domains, each backed by its own balance document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Level,
    Equipment,
    Skill,
    Pve,
    Pvp,
}

impl Domain {
    pub fn all() -> &'static [Domain] {
        &[
            Domain::Level,
            Domain::Equipment,
            Domain::Skill,
            Domain::Pve,
            Domain::Pvp,
        ]
    }

    /// Document file name without extension
    pub fn file_stem(&self) -> &'static str {
        match self {
            Domain::Level => "level_curve",
            Domain::Equipment => "equipment_curve",
            Domain::Skill => "skill_curve",
            Domain::Pve => "pve_curve",
            Domain::Pvp => "pvp_config",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// A complete profile type for one domain
///
/// `Default` is the full compiled-in profile that partial overrides are
/// applied onto.
pub trait BalanceProfile:
    Default + Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    const DOMAIN: Domain;

    /// Dotted paths of map-typed fields whose keys are open-ended
    ///
    /// Overrides may add new keys under these paths; everywhere else an
    /// unknown key is rejected.
    const OPEN_MAPS: &'static [&'static str] = &[];
}

impl BalanceProfile for LevelCurve {
    const DOMAIN: Domain = Domain::Level;
    const OPEN_MAPS: &'static [&'static str] = &["growthPerLevel"];
}

impl BalanceProfile for EquipmentCurve {
    const DOMAIN: Domain = Domain::Equipment;
}

impl BalanceProfile for SkillCurve {
    const DOMAIN: Domain = Domain::Skill;
}

impl BalanceProfile for PveCurve {
    const DOMAIN: Domain = Domain::Pve;
}

impl BalanceProfile for PvpConfig {
    const DOMAIN: Domain = Domain::Pvp;
}

/// A resolved profile tagged with the version it was resolved from
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub version: String,
    pub profile: T,
}

impl<T> Resolved<T> {
    pub fn new(version: impl Into<String>, profile: T) -> Self {
        Resolved {
            version: version.into(),
            profile,
        }
    }
}

impl<T> Deref for Resolved<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.profile
    }
}
