//! Reference resolution: foreign-key ids to display names.
//!
//! Cache hits are served without I/O; misses fan out concurrently against
//! the [`CatalogLookup`] collaborator and are joined back in **input id
//! order**, because the joined string is user-facing. Lookup failures are
//! silently degrading: the failed id is omitted from the join rather than
//! poisoning the whole field.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use futures::future::join_all;

use crate::cache::NameCache;
use crate::diag::{DiagnosticEvent, DiagnosticSink};
use crate::errors::LookupError;
use crate::types::{NamedRef, ServiceItem};

/// The entity kinds a foreign-key field can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    AgentGroup,
    RequesterGroup,
    Workspace,
    Category,
}

impl ReferenceKind {
    /// The tag stored on cache entries of this kind. Only workspace
    /// lookups are tagged; the other kinds are cached untagged, matching
    /// the historical behavior that `list_by_kind("workspace")` relies on.
    pub fn cache_tag(&self) -> Option<&'static str> {
        match self {
            ReferenceKind::Workspace => Some("workspace"),
            _ => None,
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceKind::AgentGroup => "agent_group",
            ReferenceKind::RequesterGroup => "requester_group",
            ReferenceKind::Workspace => "workspace",
            ReferenceKind::Category => "category",
        };
        f.write_str(name)
    }
}

/// The helpdesk API surface the core consumes. `deskrep-client` provides
/// the production implementation; tests substitute a recording mock.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    async fn fetch_item(&self, display_id: u64) -> Result<ServiceItem, LookupError>;
    async fn fetch_category(&self, id: u64) -> Result<NamedRef, LookupError>;
    async fn fetch_agent_group(&self, id: u64) -> Result<NamedRef, LookupError>;
    async fn fetch_requester_group(&self, id: u64) -> Result<NamedRef, LookupError>;
    async fn fetch_workspace(&self, id: u64) -> Result<NamedRef, LookupError>;
    async fn list_workspaces(&self) -> Result<Vec<NamedRef>, LookupError>;
}

async fn fetch_named(
    kind: ReferenceKind,
    id: u64,
    lookup: &dyn CatalogLookup,
) -> Result<NamedRef, LookupError> {
    match kind {
        ReferenceKind::AgentGroup => lookup.fetch_agent_group(id).await,
        ReferenceKind::RequesterGroup => lookup.fetch_requester_group(id).await,
        ReferenceKind::Workspace => lookup.fetch_workspace(id).await,
        ReferenceKind::Category => lookup.fetch_category(id).await,
    }
}

/// Resolves `ids` of the given `kind` to display names, in input order.
///
/// Each id is looked up in the cache first; all misses are then issued
/// concurrently (deduplicated per unique id) and awaited together.
/// Successful resolutions are written back to the cache, tagged per
/// [`ReferenceKind::cache_tag`]. A failed lookup yields `None` for that id.
pub async fn resolve_many(
    kind: ReferenceKind,
    ids: &[u64],
    lookup: &dyn CatalogLookup,
    cache: &mut NameCache,
    diag: &dyn DiagnosticSink,
) -> Vec<(u64, Option<String>)> {
    let mut resolved: HashMap<u64, Option<String>> = HashMap::new();
    let mut misses: Vec<u64> = Vec::new();

    for &id in ids {
        if resolved.contains_key(&id) || misses.contains(&id) {
            continue;
        }
        match cache.lookup_by_id(id) {
            Some(entry) => {
                resolved.insert(id, Some(entry.name.clone()));
            }
            None => {
                diag.emit(DiagnosticEvent::CacheMiss { kind, id });
                misses.push(id);
            }
        }
    }

    let fetches = misses.iter().map(|&id| fetch_named(kind, id, lookup));
    let results = join_all(fetches).await;

    for (&id, result) in misses.iter().zip(results) {
        match result {
            Ok(named) => {
                cache.put(id, named.name.as_str(), kind.cache_tag());
                resolved.insert(id, Some(named.name));
            }
            Err(_) => {
                diag.emit(DiagnosticEvent::UnresolvedReference { kind, id });
                resolved.insert(id, None);
            }
        }
    }

    ids.iter()
        .map(|&id| (id, resolved.get(&id).cloned().flatten()))
        .collect()
}

/// [`resolve_many`] joined with `", "`, unresolved ids skipped. An empty
/// string therefore means "nothing resolved", which callers treat as "no
/// companion row".
pub async fn resolve_joined(
    kind: ReferenceKind,
    ids: &[u64],
    lookup: &dyn CatalogLookup,
    cache: &mut NameCache,
    diag: &dyn DiagnosticSink,
) -> String {
    resolve_many(kind, ids, lookup, cache, diag)
        .await
        .into_iter()
        .filter_map(|(_, name)| name)
        .collect::<Vec<_>>()
        .join(", ")
}
