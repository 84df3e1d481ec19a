//! Character catalog: path, element and rarity by display name, used to enrich the
//! lineup. Graceful fallback when the catalog file is missing.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub path: String,
    pub element: String,
    #[serde(default)]
    pub rarity: Option<u8>,
}

#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read character catalog: {err}"),
            Self::Parse(err) => write!(f, "failed to parse character catalog: {err}"),
        }
    }
}

impl std::error::Error for CatalogError {}

#[derive(Debug, Clone, Default)]
pub struct CharacterCatalog {
    by_name: HashMap<String, CatalogEntry>,
}

/// Normalize a name for lookup: lowercase, collapse spaces/underscores.
fn normalize_lookup(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '_' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

impl CharacterCatalog {
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        let by_name = entries
            .into_iter()
            .map(|entry| (normalize_lookup(&entry.name), entry))
            .collect();
        Self { by_name }
    }

    /// Load a JSON array of catalog entries.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path).map_err(CatalogError::Io)?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&raw).map_err(CatalogError::Parse)?;
        Ok(Self::from_entries(entries))
    }

    /// Like [CharacterCatalog::load], but an unreadable catalog yields an empty one.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::warn!(path = %path.display(), "character catalog unavailable: {err}");
                Self::default()
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&CatalogEntry> {
        self.by_name.get(&normalize_lookup(name))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Strip `<...>` tags and `{RUBY_B#...}` / `{RUBY_E#}` annotations from a display name.
pub fn clean_display_name(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find(|c: char| c == '<' || c == '{') {
        cleaned.push_str(&rest[..start]);
        let tail = &rest[start..];
        let markup_end = if tail.starts_with('<') {
            tail.find('>')
        } else if tail.starts_with("{RUBY_B#") || tail.starts_with("{RUBY_E#") {
            tail.find('}')
        } else {
            None
        };
        match markup_end {
            Some(end) => rest = &tail[end + 1..],
            None => {
                cleaned.push_str(&tail[..1]);
                rest = &tail[1..];
            }
        }
    }
    cleaned.push_str(rest);
    cleaned.trim().to_string()
}
