//! Output sanitation and delta compression.
//!
//! Two passes over the assembled turns. The first clamps overflow values, prunes
//! noisy keys and internal ids, and merges each action's breakdown by damage type.
//! The second walks the whole battle per avatar and reduces player stats to the keys
//! that changed since that avatar's last emitted snapshot.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::battle::assembler::{ActionRecord, AvatarDelta, DamagePart, TurnRecord};
use crate::battle::stats::{is_noisy_key, round2, StatMap, StatValue, IS_DIE_KEY};

/// Largest value the report consumers accept (2^31 - 1). Anything above is collector
/// garbage and becomes 0.
pub const ANOMALY_LIMIT: f64 = 2_147_483_647.0;

pub fn clamp_anomaly(value: f64) -> f64 {
    if value > ANOMALY_LIMIT {
        0.0
    } else {
        value
    }
}

/// Recursively clamp every numeric leaf of a JSON document.
pub fn clamp_json(value: &mut Value) {
    match value {
        Value::Number(number) => {
            if number.as_f64().is_some_and(|n| n > ANOMALY_LIMIT) {
                *value = Value::from(0);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(clamp_json),
        Value::Object(fields) => fields.values_mut().for_each(clamp_json),
        _ => {}
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageLine {
    pub damage: f64,
    #[serde(rename = "damage_type")]
    pub damage_type: u32,
    pub damage_type_localized: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLine {
    #[serde(skip)]
    pub avatar_id: u32,
    pub avatar_name: String,
    pub stats: StatMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_detail: Option<Vec<DamageLine>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_damage: Option<f64>,
    pub skill_type: u32,
    pub skill_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyLine {
    pub name: String,
    pub stats: StatMap,
    pub is_enemy: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionLine {
    Player(PlayerLine),
    Enemy(EnemyLine),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarStatLine {
    pub avatar_name: String,
    pub stats: StatMap,
}

/// One emitted turn. `index` names the `Turn<N>` key and is not part of the body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnLine {
    #[serde(skip)]
    pub index: usize,
    pub action_value: f64,
    pub wave_index: u32,
    pub round: i64,
    pub actions: Vec<ActionLine>,
    pub avatar_stats: Vec<AvatarStatLine>,
}

fn clean_stats(stats: &StatMap) -> StatMap {
    stats
        .iter()
        .filter(|(key, _)| !is_noisy_key(key))
        .map(|(key, value)| {
            let value = match value {
                StatValue::Number(number) => StatValue::Number(clamp_anomaly(*number)),
                other => other.clone(),
            };
            (key.clone(), value)
        })
        .collect()
}

/// Sum repeated damage types into one entry, keeping first-appearance order.
fn merge_breakdown(parts: &[DamagePart]) -> Vec<DamageLine> {
    let mut merged: Vec<DamageLine> = Vec::new();
    for part in parts {
        let damage = clamp_anomaly(part.damage);
        match merged.iter_mut().find(|line| line.damage_type == part.damage_type) {
            Some(line) => line.damage = round2(line.damage + damage),
            None => merged.push(DamageLine {
                damage: round2(damage),
                damage_type: part.damage_type,
                damage_type_localized: part.label.clone(),
            }),
        }
    }
    merged
}

fn clean_action(action: &ActionRecord) -> ActionLine {
    match action {
        ActionRecord::Player(player) => {
            let total = clamp_anomaly(player.total_damage);
            let has_damage = total > 0.0;
            ActionLine::Player(PlayerLine {
                avatar_id: player.avatar_id,
                avatar_name: player.avatar_name.clone(),
                stats: clean_stats(&player.stats),
                damage_detail: has_damage.then(|| merge_breakdown(&player.damage_detail)),
                total_damage: has_damage.then_some(total),
                skill_type: player.skill_type,
                skill_name: player.skill_name.clone(),
            })
        }
        ActionRecord::Enemy(enemy) => ActionLine::Enemy(EnemyLine {
            name: enemy.name.clone(),
            stats: clean_stats(&enemy.stats),
            is_enemy: true,
        }),
    }
}

fn clean_delta(delta: &AvatarDelta) -> AvatarStatLine {
    AvatarStatLine {
        avatar_name: delta.avatar_name.clone(),
        stats: clean_stats(&delta.stats),
    }
}

/// Reduce `stats` to the keys that differ from `baseline`. `isDie` is kept whenever
/// present. An unchanged snapshot becomes an empty map.
fn compress_against(baseline: &mut StatMap, stats: &StatMap) -> StatMap {
    let changed: StatMap = stats
        .iter()
        .filter(|(key, value)| key.as_str() == IS_DIE_KEY || baseline.get(*key) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    baseline.extend(changed.iter().map(|(key, value)| (key.clone(), value.clone())));
    changed
}

fn compress_player_stats(lines: &mut [TurnLine]) {
    let mut baselines: HashMap<u32, StatMap> = HashMap::new();
    for action in lines.iter_mut().flat_map(|line| line.actions.iter_mut()) {
        let ActionLine::Player(player) = action else {
            continue;
        };
        match baselines.get_mut(&player.avatar_id) {
            Some(baseline) => player.stats = compress_against(baseline, &player.stats),
            None => {
                baselines.insert(player.avatar_id, player.stats.clone());
            }
        }
    }
}

pub fn sanitize_turns(turns: &[TurnRecord]) -> Vec<TurnLine> {
    let mut lines: Vec<TurnLine> = turns
        .iter()
        .map(|turn| TurnLine {
            index: turn.index,
            action_value: clamp_anomaly(turn.action_value),
            wave_index: turn.wave_index,
            round: turn.round,
            actions: turn.actions.iter().map(clean_action).collect(),
            avatar_stats: turn.avatar_stats.iter().map(clean_delta).collect(),
        })
        .collect();
    compress_player_stats(&mut lines);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stats(pairs: &[(&str, f64)]) -> StatMap {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), StatValue::Number(*value)))
            .collect()
    }

    #[test]
    fn clamp_json_replaces_nested_overflow() {
        let mut doc = json!({"a": 3_000_000_000u64, "b": [1.5, {"c": 2_147_483_648.0}], "d": "x"});
        clamp_json(&mut doc);
        assert_eq!(doc, json!({"a": 0, "b": [1.5, {"c": 0}], "d": "x"}));
    }

    #[test]
    fn limit_itself_is_kept() {
        assert_eq!(clamp_anomaly(ANOMALY_LIMIT), ANOMALY_LIMIT);
        assert_eq!(clamp_anomaly(ANOMALY_LIMIT + 1.0), 0.0);
    }

    #[test]
    fn breakdown_merges_repeated_types() {
        let part = |damage: f64, damage_type: u32| DamagePart {
            damage,
            damage_type,
            label: format!("T{damage_type}"),
        };
        let merged = merge_breakdown(&[part(10.0, 1), part(5.0, 2), part(2.5, 1)]);
        assert_eq!(merged.len(), 2);
        assert_eq!((merged[0].damage_type, merged[0].damage), (1, 12.5));
        assert_eq!((merged[1].damage_type, merged[1].damage), (2, 5.0));
    }

    #[test]
    fn compression_keeps_changed_keys_and_is_die() {
        let mut baseline = stats(&[("HP", 100.0), ("ATK", 50.0)]);
        let mut next = stats(&[("HP", 100.0), ("ATK", 60.0)]);
        next.insert(IS_DIE_KEY.to_string(), StatValue::Flag(false));
        let compressed = compress_against(&mut baseline, &next);
        assert_eq!(compressed.len(), 2);
        assert_eq!(compressed["ATK"], StatValue::Number(60.0));
        assert!(compressed.contains_key(IS_DIE_KEY));
        assert_eq!(baseline["ATK"], StatValue::Number(60.0));

        let unchanged = compress_against(&mut baseline, &stats(&[("HP", 100.0)]));
        assert!(unchanged.is_empty());
    }

    #[test]
    fn noisy_keys_are_pruned() {
        let cleaned = clean_stats(&stats(&[("AV", 1.0), ("CurrentSP", 2.0), ("HP", 3.0)]));
        assert_eq!(cleaned.keys().collect::<Vec<_>>(), vec!["HP"]);
    }
}
