//! # `deskrep`: service-catalog report core
//!
//! This crate holds the core pipeline for turning a single service-catalog
//! item from a helpdesk tenant into two flat, ordered tabular views: the
//! default fields (with foreign-key ids resolved to display names) and the
//! custom-field tree (one row per leaf field, with dependency provenance).
//!
//! The crate owns no I/O of its own. The helpdesk API is consumed through
//! the [`CatalogLookup`] trait, credentials through [`auth::CredentialProvider`],
//! and spreadsheet serialization lives in the `deskrep-xlsx` companion crate.

pub mod auth;
pub mod cache;
pub mod custom_fields;
pub mod diag;
pub mod errors;
pub mod flatten;
pub mod report;
pub mod resolver;
pub mod text;
pub mod types;

pub use cache::{CacheEntry, CacheKey, NameCache};
pub use diag::{DiagnosticEvent, DiagnosticSink, TracingSink};
pub use errors::{LookupError, ReportError};
pub use report::{build_report, ItemSummary, Report};
pub use resolver::{CatalogLookup, ReferenceKind};
pub use types::{CustomFieldRow, FieldRow, NamedRef, ServiceItem};
