//! Actor display names.
//!
//! Names come from an external dictionary that may be unavailable. Resolution happens
//! once, before any analysis, and the analysis only ever sees the finished [ActorNames].

pub mod cache;
pub mod catalog;
pub mod resolver;

pub use cache::{CachedNameResolver, NameCache, DEFAULT_NAME_CACHE_TTL_SECS};
pub use catalog::{clean_display_name, CatalogEntry, CatalogError, CharacterCatalog};
pub use resolver::{
    resolve_actor_names, ActorNames, FileNameResolver, NameMap, NameResolver, ResolveError,
    StaticNameResolver,
};
