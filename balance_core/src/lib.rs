//! balance_core - Versioned balance configuration for duel simulation
//!
//! This library provides:
//! - CombatStats / StatDeltas: the combat stat record and raw additive deltas
//! - Five typed balance profiles (level, equipment, skill, pve, pvp)
//! - Versioned balance documents, embedded or read from a directory
//! - A validated override step applying a document's partial profile onto
//!   the compiled-in defaults
//! - BalanceContext: the shared active version
//! - BalanceConfigLoader: memoized resolved profiles and consistent snapshots
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use balance_core::{BalanceConfigLoader, BalanceContext, ConfigSource};
//!
//! let context = BalanceContext::new("v2");
//! let loader = BalanceConfigLoader::new(context, ConfigSource::Embedded);
//!
//! let snapshot = loader.snapshot();
//! assert_eq!(snapshot.version, "v2");
//! println!("hit base: {}", snapshot.skill.formulas.hit_formula.base);
//! ```

mod context;
mod document;
mod loader;
pub mod overlay;
pub mod profile;
pub mod stats;
pub mod types;

pub use context::{BalanceContext, DEFAULT_BALANCE_VERSION};
pub use document::BalanceDocument;
pub use loader::{BalanceConfigLoader, BalanceSnapshot, ConfigSource, CONFIG_DIR_ENV};
pub use profile::{
    BalanceProfile, Domain, EquipmentCurve, LevelCurve, ModeRules, PvpConfig, PveCurve, Rarity,
    Resolved, SkillCurve,
};
pub use stats::{CombatStats, SpecialStats, StatDeltas, StatKey};
pub use types::{clamp_range, DamageType, Element, Mode, ResourceKind, Side};

use std::path::PathBuf;
use thiserror::Error;

/// Error reading a balance document or applying one of its profiles
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading '{path:?}': {error}")]
    Io {
        error: std::io::Error,
        path: PathBuf,
    },
    #[error("JSON parse error in '{origin}': {error}")]
    Json {
        error: serde_json::Error,
        origin: String,
    },
    #[error("TOML parse error in '{origin}': {error}")]
    Toml {
        error: toml::de::Error,
        origin: String,
    },
    #[error("Unknown field '{path}'")]
    UnknownField { path: String },
    #[error("Type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Validation error in {domain}: {message}")]
    Validation { domain: Domain, message: String },
}
