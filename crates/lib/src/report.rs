//! Report orchestration: one user-initiated export flow.
//!
//! Fetch the record, pre-resolve the category and workspace names that
//! gate naming for the whole record, then run the flattener and the
//! custom-field extractor. Only the record fetch itself is fatal; every
//! secondary lookup degrades to an absent name.

use tracing::info;

use crate::cache::{CacheKey, NameCache};
use crate::custom_fields::extract_custom_fields;
use crate::diag::DiagnosticSink;
use crate::errors::ReportError;
use crate::flatten::flatten_default_fields;
use crate::resolver::{resolve_many, CatalogLookup, ReferenceKind};
use crate::types::{CustomFieldRow, FieldRow};

/// The headline fields shown alongside the tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSummary {
    pub name: String,
    pub display_id: u64,
    pub short_description: String,
    pub description: String,
}

/// The finished report: two ordered row sequences plus the item summary.
#[derive(Debug, Clone)]
pub struct Report {
    pub item: ItemSummary,
    pub default_rows: Vec<FieldRow>,
    pub custom_rows: Vec<CustomFieldRow>,
}

impl Report {
    /// Suggested spreadsheet file name stem: `<item name>_<display id>`.
    pub fn export_file_stem(&self) -> String {
        format!("{}_{}", self.item.name, self.item.display_id)
    }
}

/// Builds the report for one service item.
///
/// The upstream record is never mutated: the resolved
/// `category_name`/`workspace_name` are merged into a copy handed to the
/// flattener. When either pre-resolution fails the copy simply lacks the
/// key and the flattener emits its missing-property sentinel for it.
pub async fn build_report(
    display_id: u64,
    lookup: &dyn CatalogLookup,
    cache: &mut NameCache,
    diag: &dyn DiagnosticSink,
) -> Result<Report, ReportError> {
    let item = lookup
        .fetch_item(display_id)
        .await
        .map_err(|source| ReportError::ItemFetch { display_id, source })?;

    let mut enriched = item.clone();
    if let Some(category_id) = item.u64_field("category_id") {
        if let Some(name) =
            resolve_single(ReferenceKind::Category, category_id, lookup, cache, diag).await
        {
            enriched = enriched.with_derived("category_name", name);
        }
    }
    if let Some(workspace_id) = item.u64_field("workspace_id") {
        if let Some(name) =
            resolve_single(ReferenceKind::Workspace, workspace_id, lookup, cache, diag).await
        {
            enriched = enriched.with_derived("workspace_name", name);
        }
    }

    // The item itself is cached under its string display id, the same way
    // the legacy store kept the last looked-up items around.
    if let Some(name) = item.str_field("name") {
        cache.put(CacheKey::Name(display_id.to_string()), name, None);
    }

    let summary = ItemSummary {
        name: item.str_field("name").unwrap_or_default().to_string(),
        display_id: item.u64_field("display_id").unwrap_or(display_id),
        short_description: item
            .str_field("short_description")
            .unwrap_or_default()
            .to_string(),
        description: item.str_field("description").unwrap_or_default().to_string(),
    };

    let default_rows = flatten_default_fields(&enriched, lookup, cache, diag).await;
    let custom_rows = extract_custom_fields(enriched.custom_fields(), diag);

    info!(
        display_id = summary.display_id,
        default_rows = default_rows.len(),
        custom_rows = custom_rows.len(),
        "report built"
    );

    Ok(Report {
        item: summary,
        default_rows,
        custom_rows,
    })
}

async fn resolve_single(
    kind: ReferenceKind,
    id: u64,
    lookup: &dyn CatalogLookup,
    cache: &mut NameCache,
    diag: &dyn DiagnosticSink,
) -> Option<String> {
    resolve_many(kind, &[id], lookup, cache, diag)
        .await
        .into_iter()
        .next()
        .and_then(|(_, name)| name)
}
