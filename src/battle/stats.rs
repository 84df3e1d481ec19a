//! Open-ended actor stat maps.
//!
//! Game content keeps adding stat keys, so stats stay a string-keyed map of scalars
//! instead of a fixed record. Reserved keys are plain constants.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::battle::log_ingest::StatsRow;

/// A single stat value as the collector writes it.
///
/// The collector serializes NaN as `null` and occasionally nests objects; both are
/// kept as-is and never read as a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Flag(bool),
    Number(f64),
    Text(String),
    Null,
    Nested(serde_json::Value),
}

pub type StatMap = BTreeMap<String, StatValue>;

pub const ACTION_VALUE_KEY: &str = "AV";
pub const HP_KEY: &str = "HP";
pub const STANCE_KEY: &str = "CurrentStance";
pub const IS_DIE_KEY: &str = "isDie";
pub const RANK_KEY: &str = "Rank";

/// Keys that change on nearly every row and carry no analytical signal.
pub const NOISY_STAT_KEYS: [&str; 4] = [ACTION_VALUE_KEY, "CurrentSP", "MaxSP", "SPRatio"];

pub fn is_noisy_key(key: &str) -> bool {
    NOISY_STAT_KEYS.contains(&key)
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl StatValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn rounded(&self) -> Self {
        match self {
            Self::Number(value) => Self::Number(round2(*value)),
            other => other.clone(),
        }
    }
}

impl From<f64> for StatValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for StatValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

pub fn rounded_stats(stats: &StatMap) -> StatMap {
    stats
        .iter()
        .map(|(key, value)| (key.clone(), value.rounded()))
        .collect()
}

pub fn stat_number(stats: &StatMap, key: &str) -> Option<f64> {
    stats.get(key).and_then(StatValue::as_f64)
}

/// Union of every row recorded at `turn`; later rows overwrite earlier keys.
pub fn merge_rows_at_turn(history: &[StatsRow], turn: usize) -> StatMap {
    let mut merged = StatMap::new();
    for row in history.iter().filter(|row| row.turn_battle_id == turn) {
        for (key, value) in &row.stats {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(turn: usize, pairs: &[(&str, f64)]) -> StatsRow {
        StatsRow {
            turn_battle_id: turn,
            stats: pairs
                .iter()
                .map(|(key, value)| (key.to_string(), StatValue::Number(*value)))
                .collect(),
        }
    }

    #[test]
    fn round2_keeps_two_decimals() {
        assert_eq!(round2(101.456), 101.46);
        assert_eq!(round2(50.123), 50.12);
        assert_eq!(round2(-3.005_1), -3.01);
    }

    #[test]
    fn merge_rows_is_last_write_wins_within_turn() {
        let history = vec![
            row(1, &[("HP", 900.0), ("Speed", 100.0)]),
            row(2, &[("HP", 500.0)]),
            row(1, &[("HP", 850.0)]),
        ];
        let merged = merge_rows_at_turn(&history, 1);
        assert_eq!(stat_number(&merged, "HP"), Some(850.0));
        assert_eq!(stat_number(&merged, "Speed"), Some(100.0));
        assert!(merge_rows_at_turn(&history, 3).is_empty());
    }

    #[test]
    fn stat_values_deserialize_from_mixed_scalars() {
        let stats: StatMap =
            serde_json::from_str(r#"{"HP": 12.5, "isDie": true, "Tag": "boss"}"#).unwrap();
        assert_eq!(stats["HP"], StatValue::Number(12.5));
        assert_eq!(stats["isDie"], StatValue::Flag(true));
        assert_eq!(stats["Tag"], StatValue::Text("boss".to_string()));
    }

    #[test]
    fn null_and_nested_stats_are_not_numbers() {
        let stats: StatMap =
            serde_json::from_str(r#"{"HP": null, "Buffs": {"ATK": 0.2}, "Ids": [1, 2]}"#)
                .unwrap();
        assert_eq!(stats["HP"], StatValue::Null);
        assert!(matches!(stats["Buffs"], StatValue::Nested(_)));
        assert!(matches!(stats["Ids"], StatValue::Nested(_)));
        assert_eq!(stat_number(&stats, "HP"), None);
        assert_eq!(stat_number(&stats, "Buffs"), None);
    }

    #[test]
    fn noisy_keys_are_recognized() {
        assert!(is_noisy_key("AV"));
        assert!(is_noisy_key("SPRatio"));
        assert!(!is_noisy_key("HP"));
    }
}
