use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::battle::log_ingest::ActorDetail;
use crate::names::catalog::clean_display_name;

pub type NameMap = BTreeMap<u32, String>;

#[derive(Debug)]
pub enum ResolveError {
    Unavailable(String),
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "name dictionary unavailable: {reason}"),
            Self::Io(err) => write!(f, "failed to read name dictionary: {err}"),
            Self::Parse(err) => write!(f, "failed to parse name dictionary: {err}"),
        }
    }
}

impl std::error::Error for ResolveError {}

impl From<std::io::Error> for ResolveError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ResolveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

/// External id -> display name dictionary.
pub trait NameResolver: Send + Sync {
    fn resolve<'a>(&'a self, ids: &'a [u32]) -> BoxFuture<'a, Result<NameMap, ResolveError>>;
}

/// Resolver backed by an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct StaticNameResolver {
    names: NameMap,
}

impl StaticNameResolver {
    pub fn new(names: NameMap) -> Self {
        Self { names }
    }
}

impl NameResolver for StaticNameResolver {
    fn resolve<'a>(&'a self, ids: &'a [u32]) -> BoxFuture<'a, Result<NameMap, ResolveError>> {
        let found = ids
            .iter()
            .filter_map(|id| self.names.get(id).map(|name| (*id, name.clone())))
            .collect();
        async move { Ok::<NameMap, ResolveError>(found) }.boxed()
    }
}

/// Resolver reading a `{ "<id>": "<name>" }` dictionary from disk on every call.
#[derive(Debug, Clone)]
pub struct FileNameResolver {
    path: PathBuf,
}

impl FileNameResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NameResolver for FileNameResolver {
    fn resolve<'a>(&'a self, ids: &'a [u32]) -> BoxFuture<'a, Result<NameMap, ResolveError>> {
        async move {
            let raw = tokio::fs::read_to_string(&self.path).await?;
            let dictionary: BTreeMap<u32, String> = serde_json::from_str(&raw)?;
            let found: NameMap = ids
                .iter()
                .filter_map(|id| dictionary.get(id).map(|name| (*id, name.clone())))
                .collect();
            Ok::<NameMap, ResolveError>(found)
        }
        .boxed()
    }
}

/// Pre-resolved names handed to the analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorNames {
    names: NameMap,
}

impl ActorNames {
    pub fn new(names: NameMap) -> Self {
        Self { names }
    }

    pub fn as_map(&self) -> &NameMap {
        &self.names
    }

    pub fn name_for(&self, id: u32) -> String {
        self.names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| synthetic_name(id))
    }

    /// Enemies carry their own name in the log; the dictionary is only a fallback.
    pub fn enemy_name(&self, id: u32, detail: &ActorDetail) -> String {
        detail
            .name
            .as_deref()
            .map(clean_display_name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.name_for(id))
    }
}

fn synthetic_name(id: u32) -> String {
    format!("Actor_{id}")
}

/// Resolve every id up front. A failing resolver never aborts the analysis: the
/// caller-supplied fallback map answers instead, then a synthetic `Actor_<id>`.
pub async fn resolve_actor_names<R>(resolver: &R, ids: &[u32], fallback: &NameMap) -> ActorNames
where
    R: NameResolver + ?Sized,
{
    let resolved = match resolver.resolve(ids).await {
        Ok(resolved) => resolved,
        Err(err) => {
            tracing::warn!("name resolution failed, using fallback names: {err}");
            NameMap::new()
        }
    };

    let names = ids
        .iter()
        .filter_map(|id| {
            resolved
                .get(id)
                .or_else(|| fallback.get(id))
                .map(|raw| (*id, clean_display_name(raw)))
        })
        .filter(|(_, name)| !name.is_empty())
        .collect();
    ActorNames::new(names)
}
