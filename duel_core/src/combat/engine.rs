//! SkillEngine - resolve one actor's turn against its opponent
//!
//! Every turn draws the same eight rolls from the actor's stream before
//! anything else, so the stream position never depends on what happened.
//!
//! Pipeline:
//! 1. Turn start: resource gain, control gate
//! 2. Skill selection (highest ready priority, else basic attack)
//! 3. Hit roll
//! 4. Damage: defense, mitigation, final damage, mode, element, summon
//! 5. Crit
//! 6. Block, control reactions, shield then hp
//! 7. Healing: life steal, heal and shield skills
//! 8. Procs: reflection, combo, counter
//! 9. Resource economy
//! 10. Control application
//! 11. End of turn: cooldowns and control durations tick

use super::event::{CombatEvent, HealSource, HitKind, TurnEvent};
use super::resolution::{
    channel_stats, control_chance, control_duration, crit_chance, crit_multiplier,
    heal_multiplier, hit_chance, life_steal_amount, mitigated_damage, scaled_resource_gain,
};
use crate::actor::ActorRuntime;
use crate::control::ControlKind;
use crate::skill::{ControlSpec, SkillSlot};
use balance_core::profile::SkillCurve;
use balance_core::{clamp_range, DamageType, Element, ModeRules};
use rand::Rng;

/// Id used for counter strikes in the timeline
pub const COUNTER_STRIKE_ID: &str = "counter";

/// Shared inputs for one turn
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
    pub curve: &'a SkillCurve,
    pub rules: ModeRules,
    pub round: u32,
    pub sequence: u32,
}

/// The fixed set of rolls one turn consumes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnRolls {
    pub skill_pick: f64,
    pub hit: f64,
    pub variance: f64,
    pub crit: f64,
    pub block: f64,
    pub control: f64,
    pub combo: f64,
    pub counter: f64,
}

impl TurnRolls {
    pub fn draw(rng: &mut impl Rng) -> Self {
        TurnRolls {
            skill_pick: rng.gen(),
            hit: rng.gen(),
            variance: rng.gen(),
            crit: rng.gen(),
            block: rng.gen(),
            control: rng.gen(),
            combo: rng.gen(),
            counter: rng.gen(),
        }
    }
}

/// The action chosen for a turn, with skill level already applied
#[derive(Debug, Clone)]
struct Action {
    skill_id: String,
    name: String,
    /// Index into the actor's skills, None for the basic attack
    slot: Option<usize>,
    damage_type: DamageType,
    element: Option<Element>,
    damage_ratio: f64,
    heal_ratio: f64,
    shield_ratio: f64,
    summon_ratio: f64,
    control: Option<ControlSpec>,
}

impl Action {
    fn basic(curve: &SkillCurve) -> Self {
        let basic = &curve.basic_attack;
        Action {
            skill_id: basic.id.clone(),
            name: basic.name.clone(),
            slot: None,
            damage_type: basic.damage_type,
            element: None,
            damage_ratio: basic.damage_ratio,
            heal_ratio: 0.0,
            shield_ratio: 0.0,
            summon_ratio: 0.0,
            control: None,
        }
    }

    fn from_slot(index: usize, slot: &SkillSlot, curve: &SkillCurve) -> Self {
        let skill = &slot.definition;
        Action {
            skill_id: skill.id.clone(),
            name: skill.name.clone(),
            slot: Some(index),
            damage_type: skill.damage_type,
            element: skill.element,
            damage_ratio: skill.damage_ratio * curve.level_scaling.multiplier(skill.level),
            heal_ratio: skill.heal_ratio,
            shield_ratio: skill.shield_ratio,
            summon_ratio: skill.summon_ratio,
            control: skill.control.clone(),
        }
    }

    fn is_basic(&self) -> bool {
        self.slot.is_none()
    }

    fn is_offensive(&self) -> bool {
        self.damage_ratio > 0.0 || self.summon_ratio > 0.0
    }
}

/// Resolve one turn of `actor` against `opponent`
pub fn take_turn(
    actor: &mut ActorRuntime,
    opponent: &mut ActorRuntime,
    ctx: &TurnContext<'_>,
) -> TurnEvent {
    let rolls = TurnRolls::draw(&mut actor.rng);
    let curve = ctx.curve;
    let formulas = &curve.formulas;
    let mut turn = TurnEvent::new(ctx.round, ctx.sequence, &actor.id, &opponent.id);

    // Step 1: Turn start
    let turn_gain = actor.resource.gains.turn;
    gain_resource(actor, turn_gain, &mut turn.pre_events);

    let mut gate = None;
    for kind in actor.controls.kinds() {
        let start = kind.on_turn_start(&curve.control);
        gain_resource(actor, start.resource_gain, &mut turn.pre_events);
        if start.skip_turn && gate.is_none() {
            gate = Some(kind);
        }
    }
    if let Some(kind) = gate {
        skip_turn(actor, kind, &mut turn);
        return turn;
    }

    // Step 2: Skill selection. Every control that disables the basic
    // attack also skips the turn, so a turn that gets here can always attack.
    let action = match select_skill(actor, rolls.skill_pick) {
        Some(index) => Action::from_slot(index, &actor.skills[index], curve),
        None => Action::basic(curve),
    };
    turn.skill_id = Some(action.skill_id.clone());

    if let Some(index) = action.slot {
        let slot = &mut actor.skills[index];
        let cost = slot.definition.cost;
        slot.start_cooldown();
        actor.resource.spend(cost);
        turn.events.push(CombatEvent::SkillUsed {
            actor: actor.id.clone(),
            skill_id: action.skill_id.clone(),
            cost,
        });
    }

    if !action.is_offensive() {
        apply_support(actor, &action, ctx, &mut turn.events);
        end_of_turn(actor, &mut turn.events);
        turn.summary = format!("{} uses {}", actor.name, action.name);
        return turn;
    }

    // Step 3: Hit roll
    let chance = hit_chance(
        formulas,
        &actor.stats,
        &opponent.stats,
        &opponent.special,
        opponent.controls.disables_dodge(),
    );
    if rolls.hit >= chance {
        turn.events.push(CombatEvent::Miss {
            actor: actor.id.clone(),
            target: opponent.id.clone(),
            chance,
        });
        let miss_gain = actor.resource.gains.miss;
        gain_resource(actor, miss_gain, &mut turn.events);
        end_of_turn(actor, &mut turn.events);
        turn.summary = format!(
            "{} uses {} on {} and misses",
            actor.name, action.name, opponent.name
        );
        return turn;
    }

    // Step 4: Damage
    let mut damage = mitigated_damage(
        formulas,
        action.damage_type,
        action.damage_ratio,
        rolls.variance,
        &actor.stats,
        &opponent.stats,
    ) * ctx.rules.damage_multiplier;

    if action.element.is_some() {
        damage *= 1.0 + opponent.stats.elemental_vulnerability;
    }
    if action.summon_ratio > 0.0 {
        let (attack, _, _) = channel_stats(action.damage_type, &actor.stats, &opponent.stats);
        damage += action.summon_ratio * actor.stats.summon_power * attack;
    }

    // Step 5: Crit
    let crit = rolls.crit < crit_chance(formulas, &actor.stats, &opponent.stats);
    if crit {
        damage *= crit_multiplier(formulas, &actor.stats);
    }

    // Step 6: Block and control reactions
    let block_chance = clamp_range(opponent.stats.block, [0.0, formulas.proc_caps.block]);
    let blocked = rolls.block < block_chance;
    if blocked {
        damage *= 1.0 - clamp_range(formulas.proc_effects.block_reduction, [0.0, 1.0]);
    }

    let mut broken = Vec::new();
    for kind in opponent.controls.kinds() {
        let reaction = kind.on_damage_taken(action.element, &curve.control);
        damage *= reaction.damage_multiplier;
        if reaction.breaks {
            opponent.controls.remove(kind);
            broken.push(kind);
        }
    }

    let damage = damage.round().max(0.0);
    let (absorbed, killed) = strike(opponent, damage);
    turn.events.push(CombatEvent::Hit {
        actor: actor.id.clone(),
        target: opponent.id.clone(),
        skill_id: action.skill_id.clone(),
        kind: HitKind::Primary,
        damage,
        absorbed,
        crit,
        blocked,
    });
    for kind in broken {
        turn.events.push(CombatEvent::ControlBroken {
            actor: opponent.id.clone(),
            control: kind,
        });
    }
    if killed {
        turn.events.push(defeated(opponent));
    }

    let mut dealt_to_opponent = damage;
    let mut dealt_to_actor = 0.0;

    // Step 7: Healing
    let steal = life_steal_amount(formulas, &actor.stats, damage);
    if steal > 0.0 {
        let multiplier = heal_multiplier(
            formulas,
            &actor.stats,
            &actor.stats,
            ctx.rules.healing_multiplier,
        );
        let healed = actor.heal((steal * multiplier).round());
        if healed > 0.0 {
            turn.events.push(CombatEvent::Heal {
                actor: actor.id.clone(),
                target: actor.id.clone(),
                amount: healed,
                source: HealSource::LifeSteal,
            });
        }
    }
    apply_support(actor, &action, ctx, &mut turn.events);

    // Step 8: Procs
    let reflection = clamp_range(
        opponent.special.damage_reflection,
        [0.0, formulas.special_caps.damage_reflection],
    );
    let reflected = (damage * reflection).round();
    if reflected > 0.0 {
        let (_, killed) = strike(actor, reflected);
        turn.events.push(CombatEvent::Reflect {
            actor: opponent.id.clone(),
            target: actor.id.clone(),
            damage: reflected,
        });
        if killed {
            turn.events.push(defeated(actor));
        }
        dealt_to_actor += reflected;
    }

    let combo_chance = clamp_range(actor.stats.combo_rate, [0.0, formulas.proc_caps.combo_rate]);
    if actor.is_alive() && opponent.is_alive() && rolls.combo < combo_chance {
        let combo = (damage * formulas.proc_effects.combo_ratio).round().max(0.0);
        let (absorbed, killed) = strike(opponent, combo);
        turn.events.push(CombatEvent::Hit {
            actor: actor.id.clone(),
            target: opponent.id.clone(),
            skill_id: action.skill_id.clone(),
            kind: HitKind::Combo,
            damage: combo,
            absorbed,
            crit: false,
            blocked: false,
        });
        if killed {
            turn.events.push(defeated(opponent));
        }
        dealt_to_opponent += combo;
    }

    let counter_chance = clamp_range(
        opponent.stats.counter_rate,
        [0.0, formulas.proc_caps.counter_rate],
    );
    if actor.is_alive() && opponent.is_alive() && rolls.counter < counter_chance {
        let counter = (mitigated_damage(
            formulas,
            DamageType::Physical,
            formulas.proc_effects.counter_ratio,
            rolls.variance,
            &opponent.stats,
            &actor.stats,
        ) * ctx.rules.damage_multiplier)
            .round()
            .max(0.0);
        let (absorbed, killed) = strike(actor, counter);
        turn.events.push(CombatEvent::Hit {
            actor: opponent.id.clone(),
            target: actor.id.clone(),
            skill_id: COUNTER_STRIKE_ID.to_string(),
            kind: HitKind::Counter,
            damage: counter,
            absorbed,
            crit: false,
            blocked: false,
        });
        if killed {
            turn.events.push(defeated(actor));
        }
        dealt_to_actor += counter;
    }

    // Step 9: Resource economy
    let gains = actor.resource.gains;
    let opponent_gains = opponent.resource.gains;
    if action.is_basic() {
        gain_resource(actor, gains.basic_attack, &mut turn.events);
    }
    let taken_gain = opponent_gains.damage_taken * dealt_to_opponent / opponent.max_hp();
    gain_resource(opponent, taken_gain, &mut turn.events);
    let taken_gain = gains.damage_taken * dealt_to_actor / actor.max_hp();
    gain_resource(actor, taken_gain, &mut turn.events);
    if crit {
        gain_resource(actor, gains.crit, &mut turn.events);
        gain_resource(opponent, opponent_gains.crit_taken, &mut turn.events);
    }

    // Step 10: Control application
    if let Some(spec) = &action.control {
        if opponent.is_alive() {
            let chance = control_chance(&curve.control, spec.chance, &actor.stats, &opponent.stats);
            if rolls.control < chance {
                let turns = control_duration(spec.turns, actor.stats.control_strength);
                opponent.controls.apply(spec.kind, turns);
                turn.events.push(CombatEvent::ControlApplied {
                    actor: actor.id.clone(),
                    target: opponent.id.clone(),
                    control: spec.kind,
                    turns,
                });
            } else {
                turn.events.push(CombatEvent::ControlResisted {
                    actor: actor.id.clone(),
                    target: opponent.id.clone(),
                    control: spec.kind,
                    chance,
                });
            }
        }
    }

    // Step 11: End of turn
    end_of_turn(actor, &mut turn.events);

    turn.summary = format!(
        "{} uses {} on {} for {} damage{}{}",
        actor.name,
        action.name,
        opponent.name,
        damage,
        if crit { " (critical)" } else { "" },
        if killed { format!(", {} is defeated", opponent.name) } else { String::new() },
    );
    turn
}

/// Highest-priority ready skill, ties broken by the pick roll
fn select_skill(actor: &ActorRuntime, roll: f64) -> Option<usize> {
    if actor.controls.disables_active_skills() {
        return None;
    }

    let ready: Vec<usize> = actor
        .skills
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.is_ready(actor.resource.current))
        .map(|(i, _)| i)
        .collect();

    let top = ready
        .iter()
        .map(|&i| actor.skills[i].definition.priority)
        .max()?;
    let tied: Vec<usize> = ready
        .into_iter()
        .filter(|&i| actor.skills[i].definition.priority == top)
        .collect();

    let pick = ((roll * tied.len() as f64) as usize).min(tied.len().saturating_sub(1));
    tied.get(pick).copied()
}

fn skip_turn(actor: &mut ActorRuntime, kind: ControlKind, turn: &mut TurnEvent) {
    turn.pre_events.push(CombatEvent::Skipped {
        actor: actor.id.clone(),
        control: kind,
    });
    end_of_turn(actor, &mut turn.events);
    turn.summary = format!("{} is under {} and skips the turn", actor.name, kind);
}

/// Heal and shield parts of the action, always on the user
fn apply_support(
    actor: &mut ActorRuntime,
    action: &Action,
    ctx: &TurnContext<'_>,
    events: &mut Vec<CombatEvent>,
) {
    let formulas = &ctx.curve.formulas;

    if action.heal_ratio > 0.0 {
        let multiplier = heal_multiplier(
            formulas,
            &actor.stats,
            &actor.stats,
            ctx.rules.healing_multiplier,
        );
        let amount = (action.heal_ratio * actor.stats.magic_attack * multiplier).round();
        let healed = actor.heal(amount);
        if healed > 0.0 {
            events.push(CombatEvent::Heal {
                actor: actor.id.clone(),
                target: actor.id.clone(),
                amount: healed,
                source: HealSource::Skill,
            });
        }
    }

    if action.shield_ratio > 0.0 {
        let amount = (action.shield_ratio
            * actor.stats.magic_attack
            * (1.0 + actor.stats.shield_power))
            .round();
        let added = actor.add_shield(amount);
        if added > 0.0 {
            events.push(CombatEvent::Shield {
                actor: actor.id.clone(),
                amount: added,
            });
        }
    }
}

/// Damage a target; returns the shield absorption and whether it died
fn strike(target: &mut ActorRuntime, damage: f64) -> (f64, bool) {
    let was_alive = target.is_alive();
    let absorbed = target.take_damage(damage);
    (absorbed, was_alive && !target.is_alive())
}

fn defeated(actor: &ActorRuntime) -> CombatEvent {
    CombatEvent::Defeated {
        actor: actor.id.clone(),
    }
}

/// Add resource and report every skill whose cost the gain crossed
fn gain_resource(actor: &mut ActorRuntime, amount: f64, events: &mut Vec<CombatEvent>) {
    if !actor.is_alive() || amount.is_nan() || amount <= 0.0 {
        return;
    }

    let before = actor
        .resource
        .gain(scaled_resource_gain(amount, actor.stats.rage_gain));
    let after = actor.resource.current;

    for slot in &actor.skills {
        let cost = slot.definition.cost;
        if cost > 0.0 && before < cost && after >= cost {
            events.push(CombatEvent::SkillReady {
                actor: actor.id.clone(),
                skill_id: slot.definition.id.clone(),
            });
        }
    }
}

fn end_of_turn(actor: &mut ActorRuntime, events: &mut Vec<CombatEvent>) {
    for slot in &mut actor.skills {
        slot.tick();
    }
    for kind in actor.controls.tick() {
        events.push(CombatEvent::ControlExpired {
            actor: actor.id.clone(),
            control: kind,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{build_actor_runtime, CombatantDefinition};
    use crate::skill::SkillDefinition;
    use balance_core::{BalanceSnapshot, Mode, Resolved, Side, SpecialStats, StatDeltas, StatKey};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    /// Snapshot where every attack lands, nothing crits and controls always stick
    fn sure_hit_snapshot() -> BalanceSnapshot {
        let mut snapshot = BalanceSnapshot::defaults("test");
        let mut skill = snapshot.skill.profile.clone();
        skill.formulas.hit_formula.min = 1.0;
        skill.formulas.hit_formula.max = 1.0;
        skill.formulas.crit.max = 0.0;
        skill.control.max_chance = 1.0;
        snapshot.skill = Arc::new(Resolved::new("test", skill));
        snapshot
    }

    fn with_skill_curve(
        snapshot: &BalanceSnapshot,
        edit: impl FnOnce(&mut SkillCurve),
    ) -> BalanceSnapshot {
        let mut snapshot = snapshot.clone();
        let mut skill = snapshot.skill.profile.clone();
        edit(&mut skill);
        snapshot.skill = Arc::new(Resolved::new("test", skill));
        snapshot
    }

    fn combatant(
        id: &str,
        side: Side,
        stats: StatDeltas,
        skills: Vec<SkillDefinition>,
        snapshot: &BalanceSnapshot,
    ) -> ActorRuntime {
        let definition = CombatantDefinition::new(id)
            .with_stats(stats)
            .with_skills(skills);
        build_actor_runtime(
            &definition,
            side,
            Mode::Pve,
            snapshot,
            ChaCha8Rng::seed_from_u64(7),
        )
    }

    fn pair(
        snapshot: &BalanceSnapshot,
        skills: Vec<SkillDefinition>,
    ) -> (ActorRuntime, ActorRuntime) {
        (
            combatant("hero", Side::Player, StatDeltas::new(), skills, snapshot),
            combatant("foe", Side::Opponent, StatDeltas::new(), Vec::new(), snapshot),
        )
    }

    fn ctx(snapshot: &BalanceSnapshot) -> TurnContext<'_> {
        TurnContext {
            curve: &snapshot.skill.profile,
            rules: snapshot.mode(Mode::Pve),
            round: 1,
            sequence: 1,
        }
    }

    fn primary_damage(turn: &TurnEvent) -> Option<f64> {
        turn.events.iter().find_map(|e| match e {
            CombatEvent::Hit {
                kind: HitKind::Primary,
                damage,
                ..
            } => Some(*damage),
            _ => None,
        })
    }

    #[test]
    fn test_basic_attack_when_skill_unaffordable() {
        let snapshot = sure_hit_snapshot();
        let nuke = SkillDefinition::new("nuke").with_cost(1000.0);
        let (mut hero, mut foe) = pair(&snapshot, vec![nuke]);

        let turn = take_turn(&mut hero, &mut foe, &ctx(&snapshot));

        assert_eq!(turn.skill_id.as_deref(), Some("basic_attack"));
        let damage = primary_damage(&turn).unwrap();
        assert!(damage > 0.0);
        assert!((foe.hp - (1000.0 - damage)).abs() < f64::EPSILON);
        // turn gain + basic attack gain
        assert!((hero.resource.current - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ready_skill_used_and_paid() {
        let snapshot = sure_hit_snapshot();
        let skill = SkillDefinition::new("slash")
            .with_cost(20.0)
            .with_cooldown(2)
            .with_priority(5)
            .with_damage(DamageType::Physical, 2.0);
        let (mut hero, mut foe) = pair(&snapshot, vec![skill]);

        let turn = take_turn(&mut hero, &mut foe, &ctx(&snapshot));

        assert_eq!(turn.skill_id.as_deref(), Some("slash"));
        assert!(turn
            .pre_events
            .iter()
            .any(|e| matches!(e, CombatEvent::SkillReady { skill_id, .. } if skill_id == "slash")));
        assert!(hero.resource.current < 20.0);
        assert!(!hero.skills[0].is_off_cooldown());
    }

    #[test]
    fn test_priority_wins_over_order() {
        let snapshot = sure_hit_snapshot();
        let skills = vec![
            SkillDefinition::new("low").with_priority(1),
            SkillDefinition::new("high").with_priority(9),
        ];
        let (mut hero, mut foe) = pair(&snapshot, skills);

        let turn = take_turn(&mut hero, &mut foe, &ctx(&snapshot));
        assert_eq!(turn.skill_id.as_deref(), Some("high"));
    }

    #[test]
    fn test_cooldown_alternates_with_basic_attack() {
        let snapshot = sure_hit_snapshot();
        let skill = SkillDefinition::new("jab").with_cooldown(1).with_priority(1);
        let (mut hero, mut foe) = pair(&snapshot, vec![skill]);
        foe.hp = 1.0e9;

        let used: Vec<Option<String>> = (0..4)
            .map(|_| take_turn(&mut hero, &mut foe, &ctx(&snapshot)).skill_id)
            .collect();
        assert_eq!(
            used,
            vec![
                Some("jab".to_string()),
                Some("basic_attack".to_string()),
                Some("jab".to_string()),
                Some("basic_attack".to_string()),
            ]
        );
    }

    #[test]
    fn test_stun_skips_next_turn_then_expires() {
        let snapshot = sure_hit_snapshot();
        let skill = SkillDefinition::new("bash")
            .with_priority(1)
            .with_control(ControlKind::Stun, 1.0, 1);
        let (mut hero, mut foe) = pair(&snapshot, vec![skill]);

        let turn = take_turn(&mut hero, &mut foe, &ctx(&snapshot));
        assert!(turn.events.iter().any(|e| matches!(
            e,
            CombatEvent::ControlApplied {
                control: ControlKind::Stun,
                turns: 1,
                ..
            }
        )));
        assert!(foe.controls.contains(ControlKind::Stun));

        let hp_before = hero.hp;
        let turn = take_turn(&mut foe, &mut hero, &ctx(&snapshot));
        assert!(turn.was_skipped());
        assert_eq!(turn.skill_id, None);
        assert!(turn.events.iter().any(|e| matches!(
            e,
            CombatEvent::ControlExpired {
                control: ControlKind::Stun,
                ..
            }
        )));
        assert!(foe.controls.is_empty());
        assert_eq!(hero.hp, hp_before);
        // A stunned actor still gains its turn resource
        assert!(foe.resource.current >= 20.0);
    }

    #[test]
    fn test_control_resisted() {
        let snapshot = with_skill_curve(&sure_hit_snapshot(), |curve| {
            curve.control.min_chance = 0.0;
            curve.control.max_chance = 0.0;
        });
        let skill = SkillDefinition::new("bash")
            .with_priority(1)
            .with_control(ControlKind::Stun, 1.0, 1);
        let (mut hero, mut foe) = pair(&snapshot, vec![skill]);

        let turn = take_turn(&mut hero, &mut foe, &ctx(&snapshot));
        assert!(turn
            .events
            .iter()
            .any(|e| matches!(e, CombatEvent::ControlResisted { .. })));
        assert!(foe.controls.is_empty());
    }

    #[test]
    fn test_silence_still_allows_basic_attack() {
        let snapshot = sure_hit_snapshot();
        let free = SkillDefinition::new("free").with_priority(3);
        let (mut hero, mut foe) = pair(&snapshot, vec![free]);
        hero.controls.apply(ControlKind::Silence, 2);

        let turn = take_turn(&mut hero, &mut foe, &ctx(&snapshot));
        assert!(!turn.was_skipped());
        assert_eq!(turn.skill_id.as_deref(), Some("basic_attack"));
        assert!(hero.controls.contains(ControlKind::Silence));
    }

    #[test]
    fn test_sleep_skip_grants_extra_resource() {
        let snapshot = sure_hit_snapshot();
        let (mut hero, mut foe) = pair(&snapshot, Vec::new());
        hero.controls.apply(ControlKind::Sleep, 2);

        let turn = take_turn(&mut hero, &mut foe, &ctx(&snapshot));
        assert!(turn.was_skipped());
        // 20 turn gain + 10 sleep gain
        assert!((hero.resource.current - 30.0).abs() < f64::EPSILON);
        assert!(hero.controls.contains(ControlKind::Sleep));
    }

    #[test]
    fn test_sleeping_target_wakes_on_hit() {
        let snapshot = sure_hit_snapshot();
        let (mut hero, mut foe) = pair(&snapshot, Vec::new());
        foe.controls.apply(ControlKind::Sleep, 3);

        let turn = take_turn(&mut hero, &mut foe, &ctx(&snapshot));
        assert!(turn.events.iter().any(|e| matches!(
            e,
            CombatEvent::ControlBroken {
                control: ControlKind::Sleep,
                ..
            }
        )));
        assert!(foe.controls.is_empty());
    }

    #[test]
    fn test_fire_shatters_freeze() {
        let snapshot = sure_hit_snapshot();
        let fireball = SkillDefinition::new("fireball")
            .with_priority(1)
            .with_element(Element::Fire);

        let (mut hero, mut foe) = pair(&snapshot, vec![fireball.clone()]);
        let normal = primary_damage(&take_turn(&mut hero, &mut foe, &ctx(&snapshot))).unwrap();

        let (mut hero, mut foe) = pair(&snapshot, vec![fireball]);
        foe.controls.apply(ControlKind::Freeze, 3);
        let turn = take_turn(&mut hero, &mut foe, &ctx(&snapshot));
        let shattered = primary_damage(&turn).unwrap();

        assert!((shattered - normal * 1.5).abs() <= 1.5);
        assert!(!foe.controls.contains(ControlKind::Freeze));
    }

    #[test]
    fn test_frozen_target_cannot_dodge() {
        let snapshot = BalanceSnapshot::defaults("test");
        let (hero, mut foe) = pair(&snapshot, Vec::new());
        foe.special = SpecialStats {
            dodge_chance: 0.5,
            damage_reflection: 0.0,
        };
        foe.controls.apply(ControlKind::Freeze, 3);

        let chance = hit_chance(
            &snapshot.skill.formulas,
            &hero.stats,
            &foe.stats,
            &foe.special,
            foe.controls.disables_dodge(),
        );
        assert!((chance - 0.98).abs() < 1e-9);
    }

    #[test]
    fn test_miss_grants_miss_gain() {
        let snapshot = with_skill_curve(&sure_hit_snapshot(), |curve| {
            curve.formulas.hit_formula.min = 0.0;
            curve.formulas.hit_formula.max = 0.0;
        });
        let (mut hero, mut foe) = pair(&snapshot, Vec::new());

        let turn = take_turn(&mut hero, &mut foe, &ctx(&snapshot));
        assert!(turn.events.iter().any(|e| matches!(e, CombatEvent::Miss { .. })));
        assert!((foe.hp - 1000.0).abs() < f64::EPSILON);
        assert!((hero.resource.current - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rolls_consumed_regardless_of_outcome() {
        let hit = sure_hit_snapshot();
        let miss = with_skill_curve(&hit, |curve| {
            curve.formulas.hit_formula.min = 0.0;
            curve.formulas.hit_formula.max = 0.0;
        });

        let (mut a, mut foe) = pair(&hit, Vec::new());
        take_turn(&mut a, &mut foe, &ctx(&hit));
        let (mut b, mut foe) = pair(&miss, Vec::new());
        take_turn(&mut b, &mut foe, &ctx(&miss));
        let (mut c, mut foe) = pair(&hit, Vec::new());
        c.controls.apply(ControlKind::Stun, 1);
        take_turn(&mut c, &mut foe, &ctx(&hit));

        assert_eq!(a.rng.get_word_pos(), b.rng.get_word_pos());
        assert_eq!(a.rng.get_word_pos(), c.rng.get_word_pos());
    }

    #[test]
    fn test_life_steal_heals_attacker() {
        let snapshot = sure_hit_snapshot();
        let mut hero = combatant(
            "hero",
            Side::Player,
            StatDeltas::new().with(StatKey::LifeSteal, 0.5),
            Vec::new(),
            &snapshot,
        );
        let mut foe = combatant("foe", Side::Opponent, StatDeltas::new(), Vec::new(), &snapshot);
        hero.hp = 500.0;

        let turn = take_turn(&mut hero, &mut foe, &ctx(&snapshot));
        let damage = primary_damage(&turn).unwrap();
        assert!((hero.hp - (500.0 + (damage * 0.5).round())).abs() < f64::EPSILON);
        assert!(turn.events.iter().any(|e| matches!(
            e,
            CombatEvent::Heal {
                source: HealSource::LifeSteal,
                ..
            }
        )));
    }

    #[test]
    fn test_support_skill_shields_without_attacking() {
        let snapshot = sure_hit_snapshot();
        let barrier = SkillDefinition::new("barrier")
            .with_priority(1)
            .with_damage(DamageType::Magic, 0.0)
            .with_shield(1.0);
        let (mut hero, mut foe) = pair(&snapshot, vec![barrier]);

        let turn = take_turn(&mut hero, &mut foe, &ctx(&snapshot));
        assert!(primary_damage(&turn).is_none());
        assert!((hero.shield - 100.0).abs() < f64::EPSILON);
        assert!((foe.hp - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reflection_damages_attacker() {
        let snapshot = sure_hit_snapshot();
        let (mut hero, mut foe) = pair(&snapshot, Vec::new());
        foe.special.damage_reflection = 0.2;

        let turn = take_turn(&mut hero, &mut foe, &ctx(&snapshot));
        let damage = primary_damage(&turn).unwrap();
        let reflected = (damage * 0.2).round();
        assert!((hero.hp - (1000.0 - reflected)).abs() < f64::EPSILON);
        assert!((turn.damage_to("hero") - reflected).abs() < f64::EPSILON);
    }

    #[test]
    fn test_counter_strikes_back() {
        let snapshot = sure_hit_snapshot();
        let mut hero = combatant("hero", Side::Player, StatDeltas::new(), Vec::new(), &snapshot);
        let mut foe = combatant(
            "foe",
            Side::Opponent,
            StatDeltas::new().with(StatKey::CounterRate, 1.0),
            Vec::new(),
            &snapshot,
        );

        // Counter rate is capped at 0.4, so look across a few turns
        let countered = (0..20).any(|_| {
            let turn = take_turn(&mut hero, &mut foe, &ctx(&snapshot));
            foe.hp = 1000.0;
            hero.hp = 1000.0;
            turn.events.iter().any(|e| matches!(
                e,
                CombatEvent::Hit {
                    kind: HitKind::Counter,
                    ..
                }
            ))
        });
        assert!(countered);
    }

    fn first_rolls() -> TurnRolls {
        TurnRolls::draw(&mut ChaCha8Rng::seed_from_u64(7))
    }

    /// Primary hit damage before crit, block and rounding for the first turn
    fn expected_raw(
        snapshot: &BalanceSnapshot,
        hero: &ActorRuntime,
        foe: &ActorRuntime,
        damage_type: DamageType,
        ratio: f64,
    ) -> f64 {
        mitigated_damage(
            &snapshot.skill.formulas,
            damage_type,
            ratio,
            first_rolls().variance,
            &hero.stats,
            &foe.stats,
        ) * snapshot.mode(Mode::Pve).damage_multiplier
    }

    fn hits(turn: &TurnEvent, wanted: HitKind) -> Vec<(f64, bool, bool)> {
        turn.events
            .iter()
            .filter_map(|e| match e {
                CombatEvent::Hit {
                    kind,
                    damage,
                    crit,
                    blocked,
                    ..
                } if *kind == wanted => Some((*damage, *crit, *blocked)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_block_reduces_hit() {
        let snapshot = with_skill_curve(&sure_hit_snapshot(), |curve| {
            curve.formulas.proc_caps.block = 1.0;
        });
        let mut hero = combatant("hero", Side::Player, StatDeltas::new(), Vec::new(), &snapshot);
        let mut foe = combatant(
            "foe",
            Side::Opponent,
            StatDeltas::new().with(StatKey::Block, 1.0),
            Vec::new(),
            &snapshot,
        );
        let raw = expected_raw(&snapshot, &hero, &foe, DamageType::Physical, 1.0);

        let turn = take_turn(&mut hero, &mut foe, &ctx(&snapshot));
        let primary = hits(&turn, HitKind::Primary);
        assert_eq!(primary.len(), 1);
        let (damage, _, blocked) = primary[0];
        assert!(blocked);
        assert!((damage - (raw * (1.0 - 0.5)).round()).abs() < f64::EPSILON);

        let (mut hero, mut foe) = pair(&snapshot, Vec::new());
        let turn = take_turn(&mut hero, &mut foe, &ctx(&snapshot));
        let (damage, _, blocked) = hits(&turn, HitKind::Primary)[0];
        assert!(!blocked);
        assert!((damage - raw.round()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_combo_follows_up_at_ratio() {
        let snapshot = with_skill_curve(&sure_hit_snapshot(), |curve| {
            curve.formulas.proc_caps.combo_rate = 1.0;
        });
        let mut hero = combatant(
            "hero",
            Side::Player,
            StatDeltas::new().with(StatKey::ComboRate, 1.0),
            Vec::new(),
            &snapshot,
        );
        let mut foe = combatant("foe", Side::Opponent, StatDeltas::new(), Vec::new(), &snapshot);

        let turn = take_turn(&mut hero, &mut foe, &ctx(&snapshot));
        let primary = primary_damage(&turn).unwrap();
        let combo = hits(&turn, HitKind::Combo);
        assert_eq!(combo.len(), 1);
        assert!((combo[0].0 - (primary * 0.5).round()).abs() < f64::EPSILON);
        assert!((foe.hp - (1000.0 - primary - combo[0].0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summon_adds_summon_power_damage() {
        let snapshot = sure_hit_snapshot();
        let wolves = SkillDefinition::new("wolves").with_priority(1).with_summon(1.0);
        let mut hero = combatant(
            "hero",
            Side::Player,
            StatDeltas::new().with(StatKey::SummonPower, 0.5),
            vec![wolves],
            &snapshot,
        );
        let mut foe = combatant("foe", Side::Opponent, StatDeltas::new(), Vec::new(), &snapshot);
        let raw = expected_raw(&snapshot, &hero, &foe, DamageType::Physical, 1.0);
        let summon = 1.0 * 0.5 * hero.stats.physical_attack;

        let turn = take_turn(&mut hero, &mut foe, &ctx(&snapshot));
        assert_eq!(turn.skill_id.as_deref(), Some("wolves"));
        let damage = primary_damage(&turn).unwrap();
        assert!((damage - (raw + summon).round()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_elemental_vulnerability_scales_elemental_hits() {
        let snapshot = sure_hit_snapshot();
        let frostbolt = SkillDefinition::new("frostbolt")
            .with_priority(1)
            .with_element(Element::Frost);
        let mut hero = combatant(
            "hero",
            Side::Player,
            StatDeltas::new(),
            vec![frostbolt],
            &snapshot,
        );
        let mut foe = combatant(
            "foe",
            Side::Opponent,
            StatDeltas::new().with(StatKey::ElementalVulnerability, 1.0),
            Vec::new(),
            &snapshot,
        );
        let raw = expected_raw(&snapshot, &hero, &foe, DamageType::Physical, 1.0);

        let turn = take_turn(&mut hero, &mut foe, &ctx(&snapshot));
        let damage = primary_damage(&turn).unwrap();
        assert!((damage - (raw * 2.0).round()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_crit_grants_resource_to_both_sides() {
        let snapshot = with_skill_curve(&sure_hit_snapshot(), |curve| {
            curve.formulas.crit.min = 1.0;
            curve.formulas.crit.max = 1.0;
        });
        let (mut hero, mut foe) = pair(&snapshot, Vec::new());
        let raw = expected_raw(&snapshot, &hero, &foe, DamageType::Physical, 1.0);

        let turn = take_turn(&mut hero, &mut foe, &ctx(&snapshot));
        let (damage, crit, _) = hits(&turn, HitKind::Primary)[0];
        assert!(crit);
        assert!((damage - (raw * 1.5).round()).abs() < f64::EPSILON);
        // turn gain + basic attack gain + crit gain
        assert!((hero.resource.current - 35.0).abs() < 1e-9);
        // damage taken gain + crit taken gain
        assert!((foe.resource.current - (30.0 * damage / 1000.0 + 5.0)).abs() < 1e-9);
    }

    #[test]
    fn test_gains_come_from_the_actor_meter() {
        let snapshot = sure_hit_snapshot();
        let (mut hero, mut foe) = pair(&snapshot, Vec::new());
        hero.resource.gains.turn = 7.0;
        foe.resource.gains.damage_taken = 0.0;

        take_turn(&mut hero, &mut foe, &ctx(&snapshot));
        // 7 turn gain + 10 basic attack gain
        assert!((hero.resource.current - 17.0).abs() < f64::EPSILON);
        assert_eq!(foe.resource.current, 0.0);
    }

    #[test]
    fn test_stunned_actor_never_selects_skill() {
        let snapshot = sure_hit_snapshot();
        let ready = SkillDefinition::new("ready").with_priority(5);
        let (mut hero, mut foe) = pair(&snapshot, vec![ready]);
        hero.controls.apply(ControlKind::Stun, 2);

        let turn = take_turn(&mut hero, &mut foe, &ctx(&snapshot));
        assert!(turn.was_skipped());
        assert_eq!(turn.skill_id, None);
        assert!(!turn
            .events
            .iter()
            .any(|e| matches!(e, CombatEvent::SkillUsed { .. })));
        assert!(hero.skills[0].is_off_cooldown());
        assert!((foe.hp - 1000.0).abs() < f64::EPSILON);
    }
}
