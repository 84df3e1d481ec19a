//! Battle outcome: totals, survival counts and mission completion.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::battle::assembler::{ActionRecord, TurnRecord};
use crate::battle::log_ingest::{ActorDetail, BattleLog};
use crate::battle::stats::{round2, stat_number, HP_KEY};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllyStats {
    pub total: usize,
    pub alive: usize,
    pub dead: usize,
    pub survival_rate: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyStats {
    pub total: usize,
    pub alive: usize,
    pub dead: usize,
    pub defeat_rate: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SurvivalStats {
    pub allies: AllyStats,
    pub enemies: EnemyStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleSummary {
    pub total_damage: f64,
    #[serde(rename = "totalAV")]
    pub total_av: f64,
    #[serde(rename = "damagePerAV")]
    pub damage_per_av: f64,
    pub survival_stats: SurvivalStats,
    pub mission_complete: bool,
}

/// HP from the latest-turn history row that records one. Rows sharing that turn
/// resolve last-write-wins.
fn final_avatar_hp(detail: &ActorDetail) -> Option<f64> {
    detail
        .stats_history
        .iter()
        .filter_map(|row| stat_number(&row.stats, HP_KEY).map(|hp| (row.turn_battle_id, hp)))
        .fold(None, |latest: Option<(usize, f64)>, (turn, hp)| match latest {
            Some((latest_turn, _)) if latest_turn > turn => latest,
            _ => Some((turn, hp)),
        })
        .map(|(_, hp)| hp)
}

fn rate(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(part as f64 / total as f64 * 100.0)
    }
}

pub fn summarize_battle(log: &BattleLog, turns: &[TurnRecord]) -> BattleSummary {
    let roster = log.roster_ids();
    let allies_dead = roster
        .iter()
        .filter_map(|id| log.avatar_detail.get(id))
        .filter_map(final_avatar_hp)
        .filter(|hp| *hp <= 0.0)
        .count();
    let allies_alive = roster.len() - allies_dead;

    let mut enemy_final_hp: BTreeMap<u32, f64> = BTreeMap::new();
    for action in turns.iter().flat_map(|turn| &turn.actions) {
        if let ActionRecord::Enemy(enemy) = action {
            if let Some(hp) = stat_number(&enemy.stats, HP_KEY) {
                enemy_final_hp.insert(enemy.enemy_id, hp);
            }
        }
    }
    let enemies_appeared = enemy_final_hp.len();
    let enemies_dead = enemy_final_hp.values().filter(|hp| **hp <= 0.0).count();

    let total_damage = round2(log.battle_total_damage());
    let total_av = round2(log.battle_action_value());
    let damage_per_av = if total_av > 0.0 {
        round2(log.battle_total_damage() / log.battle_action_value())
    } else {
        0.0
    };

    let all_allies_alive = allies_alive == roster.len();
    let all_enemies_defeated = enemies_appeared > 0 && enemies_dead == enemies_appeared;

    BattleSummary {
        total_damage,
        total_av,
        damage_per_av,
        survival_stats: SurvivalStats {
            allies: AllyStats {
                total: roster.len(),
                alive: allies_alive,
                dead: allies_dead,
                survival_rate: rate(allies_alive, roster.len()),
            },
            enemies: EnemyStats {
                total: enemies_appeared,
                alive: enemies_appeared - enemies_dead,
                dead: enemies_dead,
                defeat_rate: rate(enemies_dead, enemies_appeared),
            },
        },
        mission_complete: all_allies_alive || all_enemies_defeated,
    }
}
