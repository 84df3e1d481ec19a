use std::env;
use std::path::PathBuf;

use crate::battle::Locale;
use crate::names::DEFAULT_NAME_CACHE_TTL_SECS;

pub const BIND_VAR: &str = "COMBAT_DIGEST_BIND";
pub const LOCALE_VAR: &str = "COMBAT_DIGEST_LOCALE";
pub const NAMES_PATH_VAR: &str = "COMBAT_DIGEST_NAMES_PATH";
pub const CATALOG_PATH_VAR: &str = "COMBAT_DIGEST_CATALOG_PATH";
pub const NAME_CACHE_TTL_VAR: &str = "COMBAT_DIGEST_NAME_CACHE_TTL_SECS";

const DEFAULT_BIND: &str = "127.0.0.1:3000";
const DEFAULT_NAMES_PATH: &str = "data/characters.json";
const DEFAULT_CATALOG_PATH: &str = "data/character_catalog.json";

/// Runtime settings, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    pub bind_addr: String,
    pub locale: Locale,
    pub names_path: PathBuf,
    pub catalog_path: PathBuf,
    pub name_cache_ttl_secs: i64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
            locale: Locale::default(),
            names_path: PathBuf::from(DEFAULT_NAMES_PATH),
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            name_cache_ttl_secs: DEFAULT_NAME_CACHE_TTL_SECS,
        }
    }
}

impl AnalyzerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(bind_addr) = lookup(BIND_VAR).filter(|v| !v.trim().is_empty()) {
            config.bind_addr = bind_addr;
        }
        if let Some(raw) = lookup(LOCALE_VAR) {
            match raw.parse::<Locale>() {
                Ok(locale) => config.locale = locale,
                Err(err) => tracing::warn!("{LOCALE_VAR}: {err}, defaulting to en"),
            }
        }
        if let Some(path) = lookup(NAMES_PATH_VAR).filter(|v| !v.trim().is_empty()) {
            config.names_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(CATALOG_PATH_VAR).filter(|v| !v.trim().is_empty()) {
            config.catalog_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(NAME_CACHE_TTL_VAR) {
            match raw.trim().parse::<i64>() {
                Ok(secs) if secs > 0 => config.name_cache_ttl_secs = secs,
                _ => tracing::warn!(
                    "invalid {NAME_CACHE_TTL_VAR} '{raw}', defaulting to {DEFAULT_NAME_CACHE_TTL_SECS}"
                ),
            }
        }
        config
    }
}
