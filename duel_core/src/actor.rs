//! ActorRuntimeFactory - combatant definitions to per-duel runtime state

use crate::control::ControlSet;
use crate::skill::{SkillDefinition, SkillSlot};
use crate::stats::{
    equipment_deltas, level_deltas, resolve_combat_stats, resolve_special_stats, EquipmentPiece,
};
use balance_core::profile::ResourceCurve;
use balance_core::{
    BalanceSnapshot, CombatStats, Mode, ResourceKind, Side, SpecialStats, StatDeltas,
};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A player build or opponent as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CombatantDefinition {
    pub id: String,
    pub name: String,
    /// Character level, 1 when absent
    pub level: Option<u32>,
    pub equipment: Vec<EquipmentPiece>,
    /// Explicit stat deltas on top of level and equipment
    pub stats: StatDeltas,
    pub special: SpecialStats,
    pub skills: Option<Vec<SkillDefinition>>,
}

impl CombatantDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        CombatantDefinition {
            name: id.clone(),
            id,
            ..Default::default()
        }
    }

    pub fn with_stats(mut self, stats: StatDeltas) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_special(mut self, special: SpecialStats) -> Self {
        self.special = special;
        self
    }

    pub fn with_skills(mut self, skills: Vec<SkillDefinition>) -> Self {
        self.skills = Some(skills);
        self
    }

    /// Level growth, equipment and explicit stats combined
    pub fn total_deltas(&self, snapshot: &BalanceSnapshot) -> StatDeltas {
        let mut deltas = level_deltas(&snapshot.level, self.level.unwrap_or(1));
        deltas.extend(&equipment_deltas(&snapshot.equipment, &self.equipment));
        deltas.extend(&self.stats);
        deltas
    }
}

/// A PvE enemy: a combatant plus the stage it is fought at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnemyConfig {
    #[serde(flatten)]
    pub combatant: CombatantDefinition,
    /// Stage above 1 scales hp and attack by `stageGrowth`
    pub stage: u32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        EnemyConfig {
            combatant: CombatantDefinition::default(),
            stage: 1,
        }
    }
}

impl EnemyConfig {
    pub fn new(combatant: CombatantDefinition) -> Self {
        EnemyConfig {
            combatant,
            stage: 1,
        }
    }

    pub fn at_stage(mut self, stage: u32) -> Self {
        self.stage = stage;
        self
    }
}

/// Per-event resource gains, before the holder's rage gain bonus
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceGains {
    pub turn: f64,
    pub basic_attack: f64,
    pub miss: f64,
    /// Scaled by `damage / maxHp`
    pub damage_taken: f64,
    pub crit: f64,
    pub crit_taken: f64,
}

impl ResourceGains {
    pub fn from_curve(curve: &ResourceCurve) -> Self {
        ResourceGains {
            turn: curve.turn_gain,
            basic_attack: curve.basic_attack_gain,
            miss: curve.miss_gain,
            damage_taken: curve.damage_taken_gain,
            crit: curve.crit_gain,
            crit_taken: curve.crit_taken_gain,
        }
    }
}

/// Skill resource meter (qi, rage or mana)
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceMeter {
    pub kind: ResourceKind,
    pub max: f64,
    pub current: f64,
    pub gains: ResourceGains,
}

impl ResourceMeter {
    pub fn from_curve(curve: &ResourceCurve) -> Self {
        ResourceMeter {
            kind: curve.kind,
            max: curve.max.max(0.0),
            current: curve.starting_value(),
            gains: ResourceGains::from_curve(curve),
        }
    }

    /// Add up to `amount`, capped at max; returns the previous value
    pub fn gain(&mut self, amount: f64) -> f64 {
        let before = self.current;
        if amount.is_finite() && amount > 0.0 {
            self.current = (self.current + amount).min(self.max);
        }
        before
    }

    pub fn spend(&mut self, amount: f64) {
        self.current = (self.current - amount.max(0.0)).max(0.0);
    }
}

/// Mutable per-duel state of one combatant
#[derive(Debug, Clone)]
pub struct ActorRuntime {
    pub id: String,
    pub name: String,
    pub side: Side,
    pub mode: Mode,
    pub hp: f64,
    pub shield: f64,
    pub resource: ResourceMeter,
    pub stats: CombatStats,
    pub special: SpecialStats,
    pub controls: ControlSet,
    pub skills: Vec<SkillSlot>,
    /// Private roll stream, drawn from only on this actor's turns
    pub rng: ChaCha8Rng,
}

impl ActorRuntime {
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    pub fn max_hp(&self) -> f64 {
        self.stats.max_hp
    }

    /// Apply damage to shield, then hp; returns the amount the shield absorbed
    pub fn take_damage(&mut self, damage: f64) -> f64 {
        let damage = damage.max(0.0);
        let absorbed = damage.min(self.shield);
        self.shield -= absorbed;
        self.hp = (self.hp - (damage - absorbed)).max(0.0);
        absorbed
    }

    /// Heal up to max hp; returns the amount actually restored
    pub fn heal(&mut self, amount: f64) -> f64 {
        if !self.is_alive() {
            return 0.0;
        }
        let before = self.hp;
        self.hp = (self.hp + amount.max(0.0)).min(self.max_hp());
        self.hp - before
    }

    /// Add shield, total capped at max hp; returns the amount added
    pub fn add_shield(&mut self, amount: f64) -> f64 {
        let before = self.shield;
        self.shield = (self.shield + amount.max(0.0)).min(self.max_hp());
        self.shield - before
    }
}

/// Build the runtime for a combatant
pub fn build_actor_runtime(
    definition: &CombatantDefinition,
    side: Side,
    mode: Mode,
    snapshot: &BalanceSnapshot,
    rng: ChaCha8Rng,
) -> ActorRuntime {
    let stats = resolve_combat_stats(snapshot, &definition.total_deltas(snapshot));
    runtime_with_stats(definition, stats, side, mode, snapshot, rng)
}

/// Build a PvE enemy, scaling hp and attacks by stage
pub fn build_enemy_runtime(
    enemy: &EnemyConfig,
    snapshot: &BalanceSnapshot,
    rng: ChaCha8Rng,
) -> ActorRuntime {
    let definition = &enemy.combatant;
    let mut stats = resolve_combat_stats(snapshot, &definition.total_deltas(snapshot));

    if enemy.stage > 1 {
        let (hp_mult, attack_mult) = snapshot.pve.stage_growth.multipliers(enemy.stage);
        stats.max_hp *= hp_mult;
        stats.physical_attack *= attack_mult;
        stats.magic_attack *= attack_mult;
    }

    runtime_with_stats(definition, stats, Side::Opponent, Mode::Pve, snapshot, rng)
}

fn runtime_with_stats(
    definition: &CombatantDefinition,
    stats: CombatStats,
    side: Side,
    mode: Mode,
    snapshot: &BalanceSnapshot,
    rng: ChaCha8Rng,
) -> ActorRuntime {
    ActorRuntime {
        id: definition.id.clone(),
        name: definition.name.clone(),
        side,
        mode,
        hp: stats.max_hp,
        shield: 0.0,
        resource: ResourceMeter::from_curve(&snapshot.skill.resource),
        stats,
        special: resolve_special_stats(snapshot, &definition.special),
        controls: ControlSet::new(),
        skills: valid_skills(definition),
        rng,
    }
}

fn valid_skills(definition: &CombatantDefinition) -> Vec<SkillSlot> {
    definition
        .skills
        .iter()
        .flatten()
        .filter(|skill| match skill.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!(actor = %definition.id, error = %e, "dropping invalid skill");
                false
            }
        })
        .cloned()
        .map(SkillSlot::new)
        .collect()
}
