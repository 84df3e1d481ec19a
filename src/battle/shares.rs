//! Damage-share breakdowns by actor and by damage type.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::battle::damage_type::{damage_type_label, Locale};
use crate::battle::log_ingest::SkillEvent;
use crate::battle::stats::round2;

fn percent_of(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        round2(part / total * 100.0)
    } else {
        0.0
    }
}

/// Share of the battle total per actor, from skill totals. Every share is 0 when the
/// battle total is 0.
pub fn percent_by_avatar(skills: &[SkillEvent], battle_total: f64) -> BTreeMap<u32, f64> {
    let mut totals: BTreeMap<u32, f64> = BTreeMap::new();
    for skill in skills {
        *totals.entry(skill.avatar_id).or_insert(0.0) += skill.total_damage;
    }
    totals
        .into_iter()
        .map(|(avatar_id, damage)| (avatar_id, percent_of(damage, battle_total)))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeShare {
    pub label: String,
    pub total_damage: f64,
    /// Number of breakdown entries, not skills.
    pub skill_count: usize,
    pub average_damage: f64,
    pub percentage: f64,
}

/// Per-type totals in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PercentByType {
    pub shares: Vec<TypeShare>,
}

impl PercentByType {
    pub fn get(&self, label: &str) -> Option<&TypeShare> {
        self.shares.iter().find(|share| share.label == label)
    }
}

/// Group every breakdown entry by its damage type.
pub fn percent_by_type(skills: &[SkillEvent], battle_total: f64, locale: Locale) -> PercentByType {
    let mut shares: Vec<TypeShare> = Vec::new();
    for entry in skills.iter().flat_map(|skill| &skill.damage_detail) {
        let label = damage_type_label(entry.damage_type, locale);
        let position = match shares.iter().position(|share| share.label == label) {
            Some(position) => position,
            None => {
                shares.push(TypeShare {
                    label,
                    total_damage: 0.0,
                    skill_count: 0,
                    average_damage: 0.0,
                    percentage: 0.0,
                });
                shares.len() - 1
            }
        };
        shares[position].total_damage += round2(entry.damage);
        shares[position].skill_count += 1;
    }

    for share in &mut shares {
        share.average_damage = round2(share.total_damage / share.skill_count as f64);
        share.percentage = percent_of(share.total_damage, battle_total);
        share.total_damage = round2(share.total_damage);
    }
    PercentByType { shares }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct TypeTotals {
    total_damage: f64,
    skill_count: usize,
    average_damage: f64,
}

impl Serialize for PercentByType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.shares.len() * 2))?;
        for share in &self.shares {
            map.serialize_entry(
                &share.label,
                &TypeTotals {
                    total_damage: share.total_damage,
                    skill_count: share.skill_count,
                    average_damage: share.average_damage,
                },
            )?;
        }
        for share in &self.shares {
            map.serialize_entry(&format!("{}_percentage", share.label), &share.percentage)?;
        }
        map.end()
    }
}
