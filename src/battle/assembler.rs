//! Turn assembly: joins skill events with enemy snapshots into ordered turn records.
//!
//! Player stats for turn 0 are the avatar's full initial stats; for later turns they are
//! only the rows recorded at that exact turn. Enemies appear in a turn only when they
//! have a stats row there. Turns without any action are dropped.

use std::collections::{BTreeMap, HashMap};

use crate::battle::damage_type::{damage_type_label, Locale};
use crate::battle::log_ingest::{BattleLog, SkillEvent};
use crate::battle::rounds::derive_rounds;
use crate::battle::stats::{
    is_noisy_key, merge_rows_at_turn, round2, rounded_stats, stat_number, StatMap, StatValue,
    ACTION_VALUE_KEY, HP_KEY, IS_DIE_KEY,
};
use crate::names::ActorNames;

#[derive(Debug, Clone, PartialEq)]
pub struct DamagePart {
    pub damage: f64,
    pub damage_type: u32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerAction {
    pub avatar_id: u32,
    pub avatar_name: String,
    pub stats: StatMap,
    pub damage_detail: Vec<DamagePart>,
    pub total_damage: f64,
    pub skill_type: u32,
    pub skill_name: String,
    pub turn_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnemyAction {
    pub enemy_id: u32,
    pub name: String,
    pub stats: StatMap,
    pub turn_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionRecord {
    Player(PlayerAction),
    Enemy(EnemyAction),
}

/// Identity used to collapse repeated actions inside a turn. Damage breakdown is not
/// part of it, only the rounded total.
#[derive(Debug, PartialEq)]
enum DedupKey<'a> {
    Player {
        actor_id: u32,
        skill_name: &'a str,
        skill_type: u32,
        total_damage: f64,
        turn: usize,
    },
    Enemy {
        actor_id: u32,
        turn: usize,
    },
}

impl ActionRecord {
    pub fn stats(&self) -> &StatMap {
        match self {
            Self::Player(action) => &action.stats,
            Self::Enemy(action) => &action.stats,
        }
    }

    /// The action's own recorded action value; 0 when the snapshot lacks one.
    pub fn action_value(&self) -> f64 {
        stat_number(self.stats(), ACTION_VALUE_KEY).unwrap_or(0.0)
    }

    fn dedup_key(&self) -> DedupKey<'_> {
        match self {
            Self::Player(action) => DedupKey::Player {
                actor_id: action.avatar_id,
                skill_name: &action.skill_name,
                skill_type: action.skill_type,
                total_damage: action.total_damage,
                turn: action.turn_index,
            },
            Self::Enemy(action) => DedupKey::Enemy {
                actor_id: action.enemy_id,
                turn: action.turn_index,
            },
        }
    }
}

/// Changed stats of one roster avatar between two consecutive turns.
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarDelta {
    pub avatar_id: u32,
    pub avatar_name: String,
    pub stats: StatMap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnRecord {
    pub index: usize,
    pub action_value: f64,
    pub wave_index: u32,
    pub round: i64,
    pub actions: Vec<ActionRecord>,
    pub avatar_stats: Vec<AvatarDelta>,
}

/// Build the ordered, deduplicated turn records for the whole battle.
pub fn assemble_turns(log: &BattleLog, names: &ActorNames, locale: Locale) -> Vec<TurnRecord> {
    let rounds = derive_rounds(&log.turn_history);
    let mut skills_by_turn: BTreeMap<usize, Vec<&SkillEvent>> = BTreeMap::new();
    for skill in &log.skill_history {
        skills_by_turn.entry(skill.turn_battle_id).or_default().push(skill);
    }

    let mut turns: Vec<TurnRecord> = log
        .turn_history
        .iter()
        .zip(rounds)
        .enumerate()
        .filter_map(|(index, (turn, round))| {
            let skills = skills_by_turn.get(&index).map(Vec::as_slice).unwrap_or(&[]);
            let mut actions: Vec<ActionRecord> = skills
                .iter()
                .map(|skill| ActionRecord::Player(player_action(log, names, skill, index, locale)))
                .collect();
            actions.extend(enemy_actions(log, names, index).into_iter().map(ActionRecord::Enemy));
            if actions.is_empty() {
                return None;
            }

            Some(TurnRecord {
                index,
                action_value: round2(turn.action_value),
                wave_index: turn.wave_index,
                round,
                actions: order_actions(actions),
                avatar_stats: avatar_deltas(log, names, index),
            })
        })
        .collect();

    flag_life_state(log, &mut turns);
    tracing::debug!(
        turns = log.turn_history.len(),
        kept = turns.len(),
        "assembled turn records"
    );
    turns
}

fn player_action(
    log: &BattleLog,
    names: &ActorNames,
    skill: &SkillEvent,
    turn: usize,
    locale: Locale,
) -> PlayerAction {
    let stats = log
        .avatar_detail
        .get(&skill.avatar_id)
        .map(|detail| {
            if turn == 0 {
                rounded_stats(&detail.stats)
            } else {
                rounded_stats(&merge_rows_at_turn(&detail.stats_history, turn))
            }
        })
        .unwrap_or_default();

    PlayerAction {
        avatar_id: skill.avatar_id,
        avatar_name: names.name_for(skill.avatar_id),
        stats,
        damage_detail: skill
            .damage_detail
            .iter()
            .map(|entry| DamagePart {
                damage: round2(entry.damage),
                damage_type: entry.damage_type,
                label: damage_type_label(entry.damage_type, locale),
            })
            .collect(),
        total_damage: round2(skill.total_damage),
        skill_type: skill.skill_type,
        skill_name: skill.skill_name.clone(),
        turn_index: turn,
    }
}

fn enemy_actions(log: &BattleLog, names: &ActorNames, turn: usize) -> Vec<EnemyAction> {
    log.positioned_enemies()
        .into_iter()
        .filter(|(_, detail)| detail.stats_history.iter().any(|row| row.turn_battle_id == turn))
        .map(|(enemy_id, detail)| EnemyAction {
            enemy_id,
            name: names.enemy_name(enemy_id, detail),
            stats: rounded_stats(&merge_rows_at_turn(&detail.stats_history, turn)),
            turn_index: turn,
        })
        .collect()
}

/// Drop repeated actions (first occurrence wins), then order by action value.
fn order_actions(actions: Vec<ActionRecord>) -> Vec<ActionRecord> {
    let mut unique: Vec<ActionRecord> = Vec::with_capacity(actions.len());
    for action in actions {
        let duplicate = unique
            .iter()
            .any(|existing| existing.dedup_key() == action.dedup_key());
        if !duplicate {
            unique.push(action);
        }
    }
    unique.sort_by(|a, b| a.action_value().total_cmp(&b.action_value()));
    unique
}

fn avatar_deltas(log: &BattleLog, names: &ActorNames, turn: usize) -> Vec<AvatarDelta> {
    if turn == 0 {
        return Vec::new();
    }
    log.roster_ids()
        .into_iter()
        .filter_map(|avatar_id| {
            let detail = log.avatar_detail.get(&avatar_id)?;
            let previous = merge_rows_at_turn(&detail.stats_history, turn - 1);
            let current = merge_rows_at_turn(&detail.stats_history, turn);
            let changed: StatMap = current
                .iter()
                .filter(|(key, value)| !is_noisy_key(key) && previous.get(*key) != Some(*value))
                .map(|(key, value)| (key.clone(), value.rounded()))
                .collect();
            (!changed.is_empty()).then(|| AvatarDelta {
                avatar_id,
                avatar_name: names.name_for(avatar_id),
                stats: changed,
            })
        })
        .collect()
}

/// Mark life-state transitions on avatar deltas: `isDie` is written only when an
/// avatar's downed state differs from the last one seen on a surviving turn.
fn flag_life_state(log: &BattleLog, turns: &mut [TurnRecord]) {
    let mut last_is_die: HashMap<u32, bool> = HashMap::new();
    for turn in turns.iter_mut() {
        for delta in &mut turn.avatar_stats {
            let Some(detail) = log.avatar_detail.get(&delta.avatar_id) else {
                continue;
            };
            let current = merge_rows_at_turn(&detail.stats_history, turn.index);
            let is_die = stat_number(&current, HP_KEY).is_some_and(|hp| hp <= 0.0);
            let last = last_is_die.get(&delta.avatar_id).copied().unwrap_or(false);
            if is_die != last {
                delta
                    .stats
                    .insert(IS_DIE_KEY.to_string(), StatValue::Flag(is_die));
                last_is_die.insert(delta.avatar_id, is_die);
            }
        }
    }
}
