//! Raw battle telemetry ingestion.
//!
//! The collector exports one finished battle as a single JSON document: an ordered
//! turn history, the skill events fired during those turns, and sparse per-actor stat
//! histories that only record rows when something changed.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::battle::stats::StatMap;

/// Complete battle log as supplied by the collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleLog {
    pub turn_history: Vec<TurnEntry>,
    #[serde(default)]
    pub skill_history: Vec<SkillEvent>,
    #[serde(default)]
    pub avatar_detail: BTreeMap<u32, ActorDetail>,
    #[serde(default)]
    pub enemy_detail: BTreeMap<u32, ActorDetail>,
    #[serde(default)]
    pub lineup: Vec<LineupSlot>,
    #[serde(default)]
    pub battle_end: Option<BattleEnd>,
    /// Caller-supplied names used when the resolver cannot answer.
    #[serde(default)]
    pub character_name_map: BTreeMap<u32, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnEntry {
    #[serde(default)]
    pub avatar_id: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub action_value: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wave_index: u32,
    /// Counts down over the battle; the collector writes null when it missed the marker.
    #[serde(default)]
    pub cycle_index: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillEvent {
    pub avatar_id: u32,
    pub turn_battle_id: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skill_type: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skill_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub damage_detail: Vec<DamageEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_damage: f64,
}

/// One hit inside a skill's damage breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub damage: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub damage_type: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorDetail {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub stats: StatMap,
    #[serde(default)]
    pub stats_history: Vec<StatsRow>,
    /// Only enemies that took a slot on the field carry a position.
    #[serde(default)]
    pub position_index: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRow {
    pub turn_battle_id: usize,
    #[serde(default)]
    pub stats: StatMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineupSlot {
    #[serde(alias = "id")]
    pub avatar_id: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleEnd {
    #[serde(default, alias = "total_damage")]
    pub total_damage: Option<f64>,
    #[serde(default, alias = "action_value")]
    pub action_value: Option<f64>,
}

/// Reads an explicit `null` the same way as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug)]
pub enum LogParseError {
    Json(serde_json::Error),
    EmptyTurnHistory,
}

impl fmt::Display for LogParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid battle log JSON: {err}"),
            Self::EmptyTurnHistory => write!(f, "battle log has an empty turnHistory"),
        }
    }
}

impl std::error::Error for LogParseError {}

impl From<serde_json::Error> for LogParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Parse a battle log from a JSON string.
pub fn parse_battle_log_json(input: &str) -> Result<BattleLog, LogParseError> {
    let log: BattleLog = serde_json::from_str(input)?;
    if log.turn_history.is_empty() {
        return Err(LogParseError::EmptyTurnHistory);
    }
    Ok(log)
}

impl BattleLog {
    /// Avatars that took part in the battle, in lineup order. Falls back to the
    /// detail map when the collector did not record a lineup.
    pub fn roster_ids(&self) -> Vec<u32> {
        if self.lineup.is_empty() {
            self.avatar_detail.keys().copied().collect()
        } else {
            self.lineup.iter().map(|slot| slot.avatar_id).collect()
        }
    }

    /// Every avatar id that needs a display name.
    pub fn avatar_ids(&self) -> Vec<u32> {
        let mut ids: BTreeSet<u32> = self.roster_ids().into_iter().collect();
        ids.extend(self.avatar_detail.keys().copied());
        ids.extend(self.skill_history.iter().map(|skill| skill.avatar_id));
        ids.into_iter().collect()
    }

    /// Enemies that occupied a field position, ordered by that position.
    pub fn positioned_enemies(&self) -> Vec<(u32, &ActorDetail)> {
        let mut enemies: Vec<(u32, &ActorDetail)> = self
            .enemy_detail
            .iter()
            .filter(|(_, detail)| detail.position_index.is_some())
            .map(|(id, detail)| (*id, detail))
            .collect();
        enemies.sort_by_key(|(_, detail)| detail.position_index);
        enemies
    }

    pub fn skills_at(&self, turn: usize) -> impl Iterator<Item = &SkillEvent> {
        self.skill_history
            .iter()
            .filter(move |skill| skill.turn_battle_id == turn)
    }

    /// Battle-level damage total: the collector's figure when present, otherwise the
    /// sum of every skill total.
    pub fn battle_total_damage(&self) -> f64 {
        self.battle_end
            .and_then(|end| end.total_damage)
            .unwrap_or_else(|| self.skill_history.iter().map(|skill| skill.total_damage).sum())
    }

    /// Battle-level action value: the collector's figure when present, otherwise the
    /// action value of the final turn.
    pub fn battle_action_value(&self) -> f64 {
        self.battle_end
            .and_then(|end| end.action_value)
            .or_else(|| self.turn_history.last().map(|turn| turn.action_value))
            .unwrap_or(0.0)
    }
}
