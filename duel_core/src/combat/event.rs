//! Timeline records emitted by the skill engine

use crate::control::ControlKind;
use serde::{Deserialize, Serialize};

/// Which strike of a turn a hit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitKind {
    Primary,
    Combo,
    Counter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealSource {
    LifeSteal,
    Skill,
}

/// One thing that happened during a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum CombatEvent {
    /// Turn lost to a control effect
    Skipped { actor: String, control: ControlKind },
    SkillUsed {
        actor: String,
        skill_id: String,
        cost: f64,
    },
    Miss {
        actor: String,
        target: String,
        chance: f64,
    },
    Hit {
        actor: String,
        target: String,
        skill_id: String,
        kind: HitKind,
        damage: f64,
        /// Portion of `damage` taken by the target's shield
        absorbed: f64,
        crit: bool,
        blocked: bool,
    },
    Reflect {
        actor: String,
        target: String,
        damage: f64,
    },
    Heal {
        actor: String,
        target: String,
        amount: f64,
        source: HealSource,
    },
    Shield { actor: String, amount: f64 },
    ControlApplied {
        actor: String,
        target: String,
        control: ControlKind,
        turns: u32,
    },
    ControlResisted {
        actor: String,
        target: String,
        control: ControlKind,
        chance: f64,
    },
    /// Control ended early by its reaction to damage
    ControlBroken { actor: String, control: ControlKind },
    ControlExpired { actor: String, control: ControlKind },
    /// Resource crossed the cost of a skill
    SkillReady { actor: String, skill_id: String },
    Defeated { actor: String },
}

/// Everything one actor's turn produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnEvent {
    pub round: u32,
    /// Position within the round, from 1
    pub sequence: u32,
    pub actor_id: String,
    pub target_id: String,
    /// None when the turn was skipped
    pub skill_id: Option<String>,
    /// Turn-start bookkeeping: resource gains and control gates
    pub pre_events: Vec<CombatEvent>,
    pub events: Vec<CombatEvent>,
    pub summary: String,
}

impl TurnEvent {
    pub fn new(round: u32, sequence: u32, actor_id: &str, target_id: &str) -> Self {
        TurnEvent {
            round,
            sequence,
            actor_id: actor_id.to_string(),
            target_id: target_id.to_string(),
            skill_id: None,
            pre_events: Vec::new(),
            events: Vec::new(),
            summary: String::new(),
        }
    }
}

/// Timeline helpers for tests. Events name actors by id, and two PvP builds
/// may share one.
#[cfg(test)]
impl TurnEvent {
    /// Total damage dealt to `target` by hits and reflections this turn
    pub fn damage_to(&self, target: &str) -> f64 {
        self.events
            .iter()
            .map(|event| match event {
                CombatEvent::Hit {
                    target: t, damage, ..
                }
                | CombatEvent::Reflect {
                    target: t, damage, ..
                } if t == target => *damage,
                _ => 0.0,
            })
            .sum()
    }

    pub fn was_skipped(&self) -> bool {
        self.pre_events
            .iter()
            .any(|e| matches!(e, CombatEvent::Skipped { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = CombatEvent::SkillReady {
            actor: "p1".to_string(),
            skill_id: "flame".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "skill_ready", "actor": "p1", "skillId": "flame"})
        );
    }

    #[test]
    fn test_damage_to_sums_hits_and_reflects() {
        let mut turn = TurnEvent::new(1, 1, "a", "b");
        turn.events.push(CombatEvent::Hit {
            actor: "a".to_string(),
            target: "b".to_string(),
            skill_id: "basic_attack".to_string(),
            kind: HitKind::Primary,
            damage: 100.0,
            absorbed: 0.0,
            crit: false,
            blocked: false,
        });
        turn.events.push(CombatEvent::Reflect {
            actor: "b".to_string(),
            target: "a".to_string(),
            damage: 10.0,
        });
        assert!((turn.damage_to("b") - 100.0).abs() < f64::EPSILON);
        assert!((turn.damage_to("a") - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_was_skipped_reads_pre_events() {
        let mut turn = TurnEvent::new(2, 1, "a", "b");
        assert!(!turn.was_skipped());
        turn.pre_events.push(CombatEvent::Skipped {
            actor: "a".to_string(),
            control: ControlKind::Sleep,
        });
        assert!(turn.was_skipped());
    }
}
