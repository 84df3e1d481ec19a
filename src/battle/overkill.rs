//! Overkill: damage delivered past the HP a target had left.
//!
//! Targets are not attributed per hit. Each turn has one ambient HP reference, the
//! highest HP any positioned enemy reported at that turn, and every skill fired in the
//! turn is measured against it.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::battle::damage_type::{attack_type_label, Locale};
use crate::battle::log_ingest::{BattleLog, DamageEntry};
use crate::battle::stats::{round2, stat_number, HP_KEY};
use crate::names::ActorNames;

/// Max HP observed per (enemy, turn) and per turn across positioned enemies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HpByTurn {
    by_enemy_turn: HashMap<(u32, usize), f64>,
    by_turn: HashMap<usize, f64>,
}

impl HpByTurn {
    /// Built once per battle.
    pub fn from_log(log: &BattleLog) -> Self {
        let mut table = Self::default();
        for (enemy_id, detail) in log.positioned_enemies() {
            for row in &detail.stats_history {
                let Some(hp) = stat_number(&row.stats, HP_KEY) else {
                    continue;
                };
                let turn = row.turn_battle_id;
                let per_enemy = table.by_enemy_turn.entry((enemy_id, turn)).or_insert(0.0);
                *per_enemy = per_enemy.max(hp);
                let ambient = table.by_turn.entry(turn).or_insert(0.0);
                *ambient = ambient.max(hp);
            }
        }
        table
    }

    pub fn enemy_at(&self, enemy_id: u32, turn: usize) -> Option<f64> {
        self.by_enemy_turn.get(&(enemy_id, turn)).copied()
    }

    /// The single HP reference used for every skill in `turn`.
    pub fn turn_reference(&self, turn: usize) -> Option<f64> {
        self.by_turn.get(&turn).copied()
    }
}

/// Accumulate hits in order and stop at the first point the target is reached.
/// Returns the overshoot at that point, never negative.
pub fn minimal_overshoot(parts: &[DamageEntry], target_hp: f64) -> f64 {
    let mut accumulated = 0.0;
    for part in parts {
        accumulated += part.damage;
        if accumulated >= target_hp {
            break;
        }
    }
    (accumulated - target_hp).max(0.0)
}

/// One skill that overshot its turn's HP reference.
#[derive(Debug, Clone, PartialEq)]
pub struct OverkillEntry {
    pub avatar_id: u32,
    pub skill_name: String,
    pub skill_type: u32,
    pub damage: f64,
    pub overkill_amount: f64,
    pub action_value: f64,
}

pub fn detect_overkills(log: &BattleLog) -> Vec<OverkillEntry> {
    let hp = HpByTurn::from_log(log);
    log.skill_history
        .iter()
        .filter_map(|skill| {
            let target_hp = hp
                .turn_reference(skill.turn_battle_id)
                .filter(|target| *target > 0.0)?;
            let overkill_amount = round2(minimal_overshoot(&skill.damage_detail, target_hp));
            if overkill_amount <= 0.0 {
                return None;
            }
            let action_value = log
                .turn_history
                .get(skill.turn_battle_id)
                .map(|turn| round2(turn.action_value))
                .unwrap_or(0.0);
            Some(OverkillEntry {
                avatar_id: skill.avatar_id,
                skill_name: skill.skill_name.clone(),
                skill_type: skill.skill_type,
                damage: round2(skill.total_damage),
                overkill_amount,
                action_value,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverkillSkill {
    pub skill_name: String,
    pub skill_type: u32,
    pub skill_type_localized: String,
    pub damage: f64,
    pub overkill_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorOverkill {
    pub avatar_id: u32,
    pub avatar_name: String,
    pub total_damage: f64,
    pub total_overkill_amount: f64,
    pub skill_count: usize,
    pub damage_rejection_percent: f64,
    pub skills: Vec<OverkillSkill>,
}

/// Aggregate entries per actor, keeping only the first occurrence of each
/// (skill name, skill type) pair. Sorted by total overkill, largest first.
pub fn summarize_overkill(
    entries: &[OverkillEntry],
    names: &ActorNames,
    locale: Locale,
) -> Vec<ActorOverkill> {
    let mut by_actor: BTreeMap<u32, ActorOverkill> = BTreeMap::new();
    for entry in entries {
        let actor = by_actor.entry(entry.avatar_id).or_insert_with(|| ActorOverkill {
            avatar_id: entry.avatar_id,
            avatar_name: names.name_for(entry.avatar_id),
            total_damage: 0.0,
            total_overkill_amount: 0.0,
            skill_count: 0,
            damage_rejection_percent: 0.0,
            skills: Vec::new(),
        });
        let seen = actor
            .skills
            .iter()
            .any(|skill| skill.skill_name == entry.skill_name && skill.skill_type == entry.skill_type);
        if seen {
            continue;
        }
        actor.total_damage += entry.damage;
        actor.total_overkill_amount += entry.overkill_amount;
        actor.skill_count += 1;
        actor.skills.push(OverkillSkill {
            skill_name: entry.skill_name.clone(),
            skill_type: entry.skill_type,
            skill_type_localized: attack_type_label(entry.skill_type, locale),
            damage: entry.damage,
            overkill_amount: entry.overkill_amount,
        });
    }

    let mut summary: Vec<ActorOverkill> = by_actor
        .into_values()
        .map(|mut actor| {
            actor.damage_rejection_percent = if actor.total_damage > 0.0 {
                round2(actor.total_overkill_amount / actor.total_damage * 100.0)
            } else {
                0.0
            };
            actor.total_damage = round2(actor.total_damage);
            actor.total_overkill_amount = round2(actor.total_overkill_amount);
            actor
        })
        .collect();
    summary.sort_by(|a, b| b.total_overkill_amount.total_cmp(&a.total_overkill_amount));
    summary
}
