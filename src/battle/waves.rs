//! Per-wave damage, enemy peaks and damage per action value.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::battle::assembler::{ActionRecord, TurnRecord};
use crate::battle::log_ingest::SkillEvent;
use crate::battle::stats::{round2, stat_number, HP_KEY, STANCE_KEY};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveStat {
    pub wave_index: u32,
    pub enemy_names: Vec<String>,
    #[serde(rename = "enemyMaxHP")]
    pub enemy_max_hp: BTreeMap<String, f64>,
    pub enemy_current_stance: BTreeMap<String, f64>,
    pub total_damage: f64,
    pub action_value_in_wave: f64,
    pub dpav: f64,
}

fn raise_peak(peaks: &mut BTreeMap<String, f64>, name: &str, value: f64) {
    let peak = peaks.entry(name.to_string()).or_insert(0.0);
    *peak = peak.max(value);
}

/// Bucket surviving turns by wave. Enemy HP and stance are running maxima over the
/// wave, since incremental logs tend to under-report late values.
pub fn analyze_waves(turns: &[TurnRecord], skills: &[SkillEvent]) -> BTreeMap<u32, WaveStat> {
    let mut waves: BTreeMap<u32, WaveStat> = BTreeMap::new();
    let mut last_action_value: BTreeMap<u32, f64> = BTreeMap::new();

    for turn in turns {
        let wave = waves.entry(turn.wave_index).or_insert_with(|| WaveStat {
            wave_index: turn.wave_index,
            ..WaveStat::default()
        });
        wave.total_damage += skills
            .iter()
            .filter(|skill| skill.turn_battle_id == turn.index)
            .map(|skill| skill.total_damage)
            .sum::<f64>();

        for action in &turn.actions {
            let ActionRecord::Enemy(enemy) = action else {
                continue;
            };
            if !wave.enemy_names.contains(&enemy.name) {
                wave.enemy_names.push(enemy.name.clone());
            }
            if let Some(hp) = stat_number(&enemy.stats, HP_KEY) {
                raise_peak(&mut wave.enemy_max_hp, &enemy.name, hp);
            }
            if let Some(stance) = stat_number(&enemy.stats, STANCE_KEY) {
                raise_peak(&mut wave.enemy_current_stance, &enemy.name, stance);
            }
        }
        last_action_value.insert(turn.wave_index, turn.action_value);
    }

    for (index, wave) in waves.iter_mut() {
        let span = match *index {
            0 => 0.0,
            1 => last_action_value.get(index).copied().unwrap_or(0.0),
            _ => match (last_action_value.get(index), last_action_value.get(&(index - 1))) {
                (Some(current), Some(previous)) => current - previous,
                _ => 0.0,
            },
        };
        wave.action_value_in_wave = round2(span);
        wave.dpav = if wave.action_value_in_wave > 0.0 {
            round2(wave.total_damage / wave.action_value_in_wave)
        } else {
            0.0
        };
        wave.total_damage = round2(wave.total_damage);
    }
    tracing::debug!(waves = waves.len(), "wave analysis complete");
    waves
}
