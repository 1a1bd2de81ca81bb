#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use deskrep::diag::{DiagnosticEvent, DiagnosticSink};
use deskrep::{CatalogLookup, LookupError, NamedRef, ServiceItem};

// --- Mock Catalog Lookup ---

/// An in-memory [`CatalogLookup`] that records every call, so tests can
/// assert on how often (and in which order) the network would have been
/// hit. Individual ids can be made slow or failing.
#[derive(Clone, Default)]
pub struct MockCatalog {
    items: Arc<Mutex<HashMap<u64, ServiceItem>>>,
    names: Arc<Mutex<HashMap<(&'static str, u64), String>>>,
    delays_ms: Arc<Mutex<HashMap<u64, u64>>>,
    failing: Arc<Mutex<HashSet<u64>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&self, display_id: u64, item: ServiceItem) {
        self.items.lock().unwrap().insert(display_id, item);
    }

    pub fn add_name(&self, kind: &'static str, id: u64, name: &str) {
        self.names
            .lock()
            .unwrap()
            .insert((kind, id), name.to_string());
    }

    /// Makes every lookup for `id` fail with a server error.
    pub fn fail_id(&self, id: u64) {
        self.failing.lock().unwrap().insert(id);
    }

    /// Adds an artificial delay to lookups for `id`, to shuffle
    /// completion order in concurrency tests.
    pub fn delay_id(&self, id: u64, millis: u64) {
        self.delays_ms.lock().unwrap().insert(id, millis);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, call: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|recorded| recorded.as_str() == call)
            .count()
    }

    async fn lookup_name(&self, kind: &'static str, id: u64) -> Result<NamedRef, LookupError> {
        self.calls.lock().unwrap().push(format!("{kind}/{id}"));

        let delay = self.delays_ms.lock().unwrap().get(&id).copied();
        if let Some(millis) = delay {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }

        if self.failing.lock().unwrap().contains(&id) {
            return Err(LookupError::Api {
                status: 500,
                body: "mock failure".to_string(),
            });
        }

        self.names
            .lock()
            .unwrap()
            .get(&(kind, id))
            .map(|name| NamedRef {
                id,
                name: name.clone(),
            })
            .ok_or(LookupError::Api {
                status: 404,
                body: "not found".to_string(),
            })
    }
}

#[async_trait]
impl CatalogLookup for MockCatalog {
    async fn fetch_item(&self, display_id: u64) -> Result<ServiceItem, LookupError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("item/{display_id}"));
        self.items
            .lock()
            .unwrap()
            .get(&display_id)
            .cloned()
            .ok_or(LookupError::Api {
                status: 404,
                body: "item not found".to_string(),
            })
    }

    async fn fetch_category(&self, id: u64) -> Result<NamedRef, LookupError> {
        self.lookup_name("category", id).await
    }

    async fn fetch_agent_group(&self, id: u64) -> Result<NamedRef, LookupError> {
        self.lookup_name("agent_group", id).await
    }

    async fn fetch_requester_group(&self, id: u64) -> Result<NamedRef, LookupError> {
        self.lookup_name("requester_group", id).await
    }

    async fn fetch_workspace(&self, id: u64) -> Result<NamedRef, LookupError> {
        self.lookup_name("workspace", id).await
    }

    async fn list_workspaces(&self) -> Result<Vec<NamedRef>, LookupError> {
        self.calls.lock().unwrap().push("workspaces".to_string());
        let mut workspaces: Vec<NamedRef> = self
            .names
            .lock()
            .unwrap()
            .iter()
            .filter(|((kind, _), _)| *kind == "workspace")
            .map(|((_, id), name)| NamedRef {
                id: *id,
                name: name.clone(),
            })
            .collect();
        workspaces.sort_by_key(|workspace| workspace.id);
        Ok(workspaces)
    }
}

// --- Collecting Diagnostic Sink ---

/// Collects diagnostic events for assertions.
#[derive(Clone, Default)]
pub struct CollectingSink {
    events: Arc<Mutex<Vec<DiagnosticEvent>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, event: DiagnosticEvent) {
        self.events.lock().unwrap().push(event);
    }
}
