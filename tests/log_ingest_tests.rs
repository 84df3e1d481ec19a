//! Tests for raw battle log ingestion.

use std::path::Path;

use combat_digest::battle::{parse_battle_log_json, LogParseError, StatValue};

fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("battles")
        .join(name)
}

#[test]
fn parse_sample_battle_fixture() {
    let json = std::fs::read_to_string(fixture_path("sample_battle.json")).expect("read fixture");
    let log = parse_battle_log_json(&json).expect("parse");

    assert_eq!(log.turn_history.len(), 5);
    assert_eq!(log.turn_history[1].cycle_index, None);
    assert_eq!(log.turn_history[2].cycle_index, Some(2));
    assert_eq!(log.skill_history.len(), 5);
    assert_eq!(log.skill_history[0].damage_detail.len(), 2);
    assert_eq!(log.lineup.len(), 2);
    assert_eq!(log.roster_ids(), vec![1001, 1002]);
    assert_eq!(log.character_name_map.get(&1002).map(String::as_str), Some("Dan Heng"));
    assert_eq!(
        log.avatar_detail[&1001].stats.get("AV"),
        Some(&StatValue::Number(50.123))
    );
}

#[test]
fn only_positioned_enemies_are_present_in_order() {
    let json = std::fs::read_to_string(fixture_path("sample_battle.json")).expect("read fixture");
    let log = parse_battle_log_json(&json).expect("parse");
    let ids: Vec<u32> = log
        .positioned_enemies()
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(ids, vec![2001, 2002]);
}

#[test]
fn missing_optional_sections_default_to_empty() {
    let log = parse_battle_log_json(
        r#"{"turnHistory":[{"actionValue":12.5,"waveIndex":1,"cycleIndex":null}]}"#,
    )
    .expect("parse");
    assert!(log.skill_history.is_empty());
    assert!(log.avatar_detail.is_empty());
    assert!(log.battle_end.is_none());
    assert_eq!(log.battle_total_damage(), 0.0);
    assert_eq!(log.battle_action_value(), 12.5);
}

#[test]
fn missing_damage_type_defaults_to_zero() {
    let log = parse_battle_log_json(
        r#"{
            "turnHistory":[{"actionValue":0,"waveIndex":1,"cycleIndex":1}],
            "skillHistory":[{"avatarId":1,"turnBattleId":0,"damageDetail":[{"damage":5}],"totalDamage":5}]
        }"#,
    )
    .expect("parse");
    assert_eq!(log.skill_history[0].damage_detail[0].damage_type, 0);
}

#[test]
fn snake_case_battle_end_is_accepted() {
    let log = parse_battle_log_json(
        r#"{
            "turnHistory":[{"actionValue":3,"waveIndex":1,"cycleIndex":1}],
            "battleEnd":{"total_damage":1234.5,"action_value":88}
        }"#,
    )
    .expect("parse");
    assert_eq!(log.battle_total_damage(), 1234.5);
    assert_eq!(log.battle_action_value(), 88.0);
}

#[test]
fn lineup_falls_back_to_avatar_detail() {
    let log = parse_battle_log_json(
        r#"{
            "turnHistory":[{"actionValue":0,"waveIndex":1,"cycleIndex":1}],
            "avatarDetail":{"7":{"stats":{}},"3":{"stats":{}}}
        }"#,
    )
    .expect("parse");
    assert_eq!(log.roster_ids(), vec![3, 7]);
}

#[test]
fn empty_turn_history_is_rejected() {
    let err = parse_battle_log_json(r#"{"turnHistory":[]}"#).expect_err("should fail");
    assert!(matches!(err, LogParseError::EmptyTurnHistory));
}

#[test]
fn malformed_json_is_rejected() {
    let err = parse_battle_log_json("{not json").expect_err("should fail");
    assert!(matches!(err, LogParseError::Json(_)));
    assert!(err.to_string().contains("invalid battle log JSON"));
}

#[test]
fn null_scalars_read_as_missing_observations() {
    let log = parse_battle_log_json(
        r#"{
            "turnHistory":[{"avatarId":1,"actionValue":null,"waveIndex":null,"cycleIndex":null}],
            "skillHistory":[{
                "avatarId":1,"turnBattleId":0,"skillType":null,"skillName":null,
                "damageDetail":[{"damage":null,"damage_type":null}],"totalDamage":null
            }],
            "avatarDetail":{"1":{
                "stats":{"HP":null,"Buffs":{"ATK":0.2}},
                "statsHistory":[{"turnBattleId":0,"stats":{"HP":null,"Speed":101}}]
            }}
        }"#,
    )
    .expect("nulls should not reject the log");

    assert_eq!(log.turn_history[0].action_value, 0.0);
    assert_eq!(log.turn_history[0].wave_index, 0);
    let skill = &log.skill_history[0];
    assert_eq!((skill.skill_type, skill.skill_name.as_str()), (0, ""));
    assert_eq!(skill.total_damage, 0.0);
    assert_eq!(skill.damage_detail[0].damage, 0.0);

    let detail = &log.avatar_detail[&1];
    assert_eq!(detail.stats.get("HP"), Some(&StatValue::Null));
    assert!(matches!(detail.stats.get("Buffs"), Some(StatValue::Nested(_))));
    assert_eq!(
        detail.stats_history[0].stats.get("Speed"),
        Some(&StatValue::Number(101.0))
    );
}
