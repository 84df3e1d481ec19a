//! The analytical report document and the pipeline that builds it.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

use crate::battle::assembler::assemble_turns;
use crate::battle::damage_type::Locale;
use crate::battle::log_ingest::BattleLog;
use crate::battle::overkill::{detect_overkills, summarize_overkill, ActorOverkill};
use crate::battle::sanitize::{clamp_json, sanitize_turns, TurnLine};
use crate::battle::shares::{percent_by_avatar, percent_by_type, PercentByType};
use crate::battle::stats::{stat_number, RANK_KEY};
use crate::battle::summary::{summarize_battle, BattleSummary};
use crate::battle::waves::{analyze_waves, WaveStat};
use crate::names::{resolve_actor_names, ActorNames, CharacterCatalog, NameResolver};

const UNKNOWN_TRAIT: &str = "???";
const UNKNOWN_RARITY: &str = "?";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineupEntry {
    pub avatar_id: u32,
    pub rank: u32,
    pub avatar_name: String,
    pub path: String,
    pub element: String,
    pub rarity: String,
}

/// Emitted turns keyed `Turn<N>`, in numeric order. Dropped turns leave gaps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DamageLines(pub Vec<TurnLine>);

impl DamageLines {
    pub fn get(&self, index: usize) -> Option<&TurnLine> {
        self.0.iter().find(|line| line.index == index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for DamageLines {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for line in &self.0 {
            map.serialize_entry(&format!("Turn{}", line.index), line)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleReport {
    pub lineups: Vec<LineupEntry>,
    pub damage_lines: DamageLines,
    pub overkill_summary: Vec<ActorOverkill>,
    pub percent_by_avatar: BTreeMap<u32, f64>,
    pub percent_by_type: PercentByType,
    pub wave_analysis: BTreeMap<u32, WaveStat>,
    pub battle_summary: BattleSummary,
}

/// Everything the pure pass needs besides the log itself.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub names: &'a ActorNames,
    pub catalog: &'a CharacterCatalog,
    pub locale: Locale,
}

fn lineup_entries(log: &BattleLog, ctx: &ReportContext<'_>) -> Vec<LineupEntry> {
    log.roster_ids()
        .into_iter()
        .map(|avatar_id| {
            let avatar_name = ctx.names.name_for(avatar_id);
            let rank = log
                .avatar_detail
                .get(&avatar_id)
                .and_then(|detail| stat_number(&detail.stats, RANK_KEY))
                .filter(|rank| *rank >= 0.0)
                .map(|rank| rank as u32)
                .unwrap_or(0);
            let entry = ctx.catalog.lookup(&avatar_name);
            LineupEntry {
                avatar_id,
                rank,
                path: entry.map_or_else(|| UNKNOWN_TRAIT.to_string(), |e| e.path.clone()),
                element: entry.map_or_else(|| UNKNOWN_TRAIT.to_string(), |e| e.element.clone()),
                rarity: entry
                    .and_then(|e| e.rarity)
                    .map_or_else(|| UNKNOWN_RARITY.to_string(), |r| r.to_string()),
                avatar_name,
            }
        })
        .collect()
}

/// Single pure pass from a log and pre-resolved names to the finished report.
pub fn build_report(log: &BattleLog, ctx: &ReportContext<'_>) -> BattleReport {
    let turns = assemble_turns(log, ctx.names, ctx.locale);
    let battle_total = log.battle_total_damage();

    let overkills = detect_overkills(log);
    tracing::debug!(entries = overkills.len(), "overkill entries detected");

    BattleReport {
        lineups: lineup_entries(log, ctx),
        overkill_summary: summarize_overkill(&overkills, ctx.names, ctx.locale),
        percent_by_avatar: percent_by_avatar(&log.skill_history, battle_total),
        percent_by_type: percent_by_type(&log.skill_history, battle_total, ctx.locale),
        wave_analysis: analyze_waves(&turns, &log.skill_history),
        battle_summary: summarize_battle(log, &turns),
        damage_lines: DamageLines(sanitize_turns(&turns)),
    }
}

/// Resolve names once, then run the pure pass.
pub async fn analyze_battle<R>(
    log: &BattleLog,
    resolver: &R,
    catalog: &CharacterCatalog,
    locale: Locale,
) -> BattleReport
where
    R: NameResolver + ?Sized,
{
    let names = resolve_actor_names(resolver, &log.avatar_ids(), &log.character_name_map).await;
    build_report(
        log,
        &ReportContext {
            names: &names,
            catalog,
            locale,
        },
    )
}

/// Serialize the report with a final overflow clamp over every numeric leaf.
pub fn report_to_json(report: &BattleReport) -> Result<Value, serde_json::Error> {
    let mut value = serde_json::to_value(report)?;
    clamp_json(&mut value);
    Ok(value)
}
