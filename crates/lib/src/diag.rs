//! Structured diagnostics for non-fatal pipeline events.
//!
//! The resolver and the custom-field extractor absorb partial failures
//! instead of propagating them; the sink is how those absorbed events stay
//! observable. Tests inject a collecting sink to assert on them.

use crate::resolver::ReferenceKind;
use tracing::{debug, warn};

/// A non-fatal event emitted somewhere along the flattening pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    /// A reference id was not in the cache and triggers an API lookup.
    CacheMiss { kind: ReferenceKind, id: u64 },
    /// A reference lookup failed after retries; the name is omitted from
    /// the joined output.
    UnresolvedReference { kind: ReferenceKind, id: u64 },
    /// A custom-field node was null or otherwise unusable and was skipped.
    MalformedCustomField { position: usize },
}

pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, event: DiagnosticEvent);
}

/// Default sink: forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::CacheMiss { kind, id } => {
                debug!(kind = %kind, id, "cache miss, calling the API");
            }
            DiagnosticEvent::UnresolvedReference { kind, id } => {
                warn!(kind = %kind, id, "reference lookup failed, name omitted");
            }
            DiagnosticEvent::MalformedCustomField { position } => {
                warn!(position, "custom field is null or malformed, skipping");
            }
        }
    }
}
