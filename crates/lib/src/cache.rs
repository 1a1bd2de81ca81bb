//! Bounded recency cache for resolved display names.
//!
//! One logical owner per export flow; the cache is not shared across
//! concurrent exports. Capacity is the only eviction pressure.

use std::collections::VecDeque;

const DEFAULT_CAPACITY: usize = 100;

/// A cache key: reference entities are keyed by their numeric id, while a
/// few legacy entries (the item looked up per export) are keyed by a
/// string. Keeping the two as distinct variants rules out collisions
/// between numeric ids and string tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Id(u64),
    Name(String),
}

impl From<u64> for CacheKey {
    fn from(id: u64) -> Self {
        CacheKey::Id(id)
    }
}

impl From<&str> for CacheKey {
    fn from(name: &str) -> Self {
        CacheKey::Name(name.to_string())
    }
}

/// A resolved display name, optionally tagged by entity kind.
///
/// Created on first successful resolution and read-only until evicted.
/// Workspace entries carry `kind = Some("workspace")`; other kinds are
/// stored untagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub name: String,
    pub kind: Option<String>,
}

/// Most-recently-added-first ring of [`CacheEntry`] values, truncated to
/// the newest 100. No time-based expiry.
#[derive(Debug)]
pub struct NameCache {
    entries: VecDeque<CacheEntry>,
    capacity: usize,
}

impl Default for NameCache {
    fn default() -> Self {
        Self::new()
    }
}

impl NameCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    /// Exact-key lookup by numeric id.
    pub fn lookup_by_id(&self, id: u64) -> Option<&CacheEntry> {
        self.lookup(&CacheKey::Id(id))
    }

    /// Exact-key lookup.
    pub fn lookup(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.iter().find(|entry| &entry.key == key)
    }

    /// All entries tagged with `kind`, most-recent first.
    pub fn list_by_kind(&self, kind: &str) -> Vec<&CacheEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.kind.as_deref() == Some(kind))
            .collect()
    }

    /// Inserts an entry at the front. An existing entry with the same key
    /// is replaced rather than duplicated; the oldest entries beyond the
    /// capacity are evicted.
    pub fn put(&mut self, key: impl Into<CacheKey>, name: impl Into<String>, kind: Option<&str>) {
        let key = key.into();
        self.entries.retain(|entry| entry.key != key);
        self.entries.push_front(CacheEntry {
            key,
            name: name.into(),
            kind: kind.map(str::to_string),
        });
        self.entries.truncate(self.capacity);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
