//! Pipeline throughput: full report builds on synthetic battle logs.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use combat_digest::battle::{build_report, parse_battle_log_json, BattleLog, Locale, ReportContext};
use combat_digest::names::{ActorNames, CharacterCatalog};
use serde_json::{json, Value};

const AVATARS: [u32; 4] = [1001, 1002, 1003, 1004];

/// A battle of `turns` turns across three waves, four avatars and two enemies per wave.
fn synthetic_log(turns: usize) -> BattleLog {
    let waves = 3;
    let per_wave = turns.div_ceil(waves).max(1);

    let turn_history: Vec<Value> = (0..turns)
        .map(|t| {
            json!({
                "avatarId": AVATARS[t % AVATARS.len()],
                "actionValue": t as f64 * 12.5,
                "waveIndex": t / per_wave + 1,
                "cycleIndex": if t % 3 == 0 { Value::from(100 - (t / 8) as i64) } else { Value::Null }
            })
        })
        .collect();

    let skill_history: Vec<Value> = (0..turns)
        .map(|t| {
            json!({
                "avatarId": AVATARS[t % AVATARS.len()],
                "turnBattleId": t,
                "skillType": (t % 4) as u32,
                "skillName": format!("Skill {}", t % 7),
                "damageDetail": [
                    {"damage": 1200.0 + t as f64, "damage_type": (t % 4) as u32},
                    {"damage": 300.0, "damage_type": 10},
                    {"damage": 150.0, "damage_type": (t % 4) as u32}
                ],
                "totalDamage": 1650.0 + t as f64
            })
        })
        .collect();

    let avatar_detail: serde_json::Map<String, Value> = AVATARS
        .iter()
        .map(|id| {
            let history: Vec<Value> = (1..turns)
                .filter(|t| t % AVATARS.len() == (*id as usize) % AVATARS.len())
                .map(|t| json!({"turnBattleId": t, "stats": {"HP": 5000 - t as i64, "AV": t, "ATK": 2000 + t % 5}}))
                .collect();
            (
                id.to_string(),
                json!({"stats": {"HP": 5000, "AV": 100, "Rank": 1, "ATK": 2000}, "statsHistory": history}),
            )
        })
        .collect();

    let enemy_detail: serde_json::Map<String, Value> = (0..waves * 2)
        .map(|i| {
            let wave_start = (i / 2) * per_wave;
            let history: Vec<Value> = (wave_start..(wave_start + per_wave).min(turns))
                .map(|t| {
                    let hp = 200_000.0 - (t - wave_start) as f64 * 8_000.0;
                    json!({"turnBattleId": t, "stats": {"HP": hp.max(0.0), "CurrentStance": 90}})
                })
                .collect();
            (
                (2001 + i).to_string(),
                json!({"name": format!("Enemy {i}"), "positionIndex": i % 2, "statsHistory": history}),
            )
        })
        .collect();

    let log = json!({
        "turnHistory": turn_history,
        "skillHistory": skill_history,
        "avatarDetail": avatar_detail,
        "enemyDetail": enemy_detail,
        "lineup": AVATARS.iter().map(|id| json!({"avatarId": id})).collect::<Vec<_>>()
    });
    parse_battle_log_json(&log.to_string()).expect("synthetic log should parse")
}

fn bench_build_report(c: &mut Criterion) {
    let names = ActorNames::default();
    let catalog = CharacterCatalog::default();
    let ctx = ReportContext {
        names: &names,
        catalog: &catalog,
        locale: Locale::En,
    };

    let mut group = c.benchmark_group("build_report");
    for turns in [30usize, 120, 480] {
        let log = synthetic_log(turns);
        group.throughput(Throughput::Elements(turns as u64));
        group.bench_with_input(BenchmarkId::from_parameter(turns), &log, |b, log| {
            b.iter(|| black_box(build_report(black_box(log), &ctx)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build_report);
criterion_main!(benches);
