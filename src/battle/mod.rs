//! Battle log analysis: ingest, turn assembly and the report sections built from it.

pub mod assembler;
pub mod damage_type;
pub mod log_ingest;
pub mod overkill;
pub mod report;
pub mod rounds;
pub mod sanitize;
pub mod shares;
pub mod stats;
pub mod summary;
pub mod waves;

pub use assembler::{
    assemble_turns, ActionRecord, AvatarDelta, DamagePart, EnemyAction, PlayerAction, TurnRecord,
};
pub use damage_type::{attack_type_label, damage_type_label, DamageType, Locale};
pub use log_ingest::{
    parse_battle_log_json, ActorDetail, BattleEnd, BattleLog, DamageEntry, LineupSlot,
    LogParseError, SkillEvent, StatsRow, TurnEntry,
};
pub use overkill::{
    detect_overkills, minimal_overshoot, summarize_overkill, ActorOverkill, HpByTurn,
    OverkillEntry, OverkillSkill,
};
pub use report::{
    analyze_battle, build_report, report_to_json, BattleReport, DamageLines, LineupEntry,
    ReportContext,
};
pub use rounds::{derive_rounds, RoundFold};
pub use sanitize::{
    clamp_anomaly, clamp_json, sanitize_turns, ActionLine, TurnLine, ANOMALY_LIMIT,
};
pub use shares::{percent_by_avatar, percent_by_type, PercentByType, TypeShare};
pub use stats::{round2, StatMap, StatValue, NOISY_STAT_KEYS};
pub use summary::{summarize_battle, BattleSummary, SurvivalStats};
pub use waves::{analyze_waves, WaveStat};
