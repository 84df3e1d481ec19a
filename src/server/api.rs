use std::fmt;

use crate::battle::{analyze_battle, parse_battle_log_json, report_to_json, LogParseError};
use crate::server::AppState;

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "combat-digest-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[derive(Debug)]
pub enum AnalyzeError {
    Parse(LogParseError),
    Serialize(serde_json::Error),
}

impl fmt::Display for AnalyzeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to serialize report: {err}"),
        }
    }
}

impl std::error::Error for AnalyzeError {}

impl From<LogParseError> for AnalyzeError {
    fn from(err: LogParseError) -> Self {
        Self::Parse(err)
    }
}

/// POST /api/analyze: battle log in, report document out.
pub fn analyze_payload(body: &str, state: &AppState) -> Result<String, AnalyzeError> {
    let log = parse_battle_log_json(body)?;
    let report = state.runtime().block_on(analyze_battle(
        &log,
        state.resolver(),
        state.catalog(),
        state.locale(),
    ));

    let purged = state.purge_expired_names();
    if purged > 0 {
        tracing::debug!(purged, "expired name cache entries removed");
    }

    let document = report_to_json(&report).map_err(AnalyzeError::Serialize)?;
    serde_json::to_string_pretty(&document).map_err(AnalyzeError::Serialize)
}
