use thiserror::Error;

/// Errors raised by a [`crate::CatalogLookup`] implementation.
///
/// Implementations map their transport-specific failures into these
/// variants so the core can handle them uniformly: a failed item fetch is
/// fatal to the report, while a failed reference lookup only degrades the
/// affected row.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("request to the helpdesk API failed: {0}")]
    Http(String),

    #[error("helpdesk API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to decode a helpdesk API response: {0}")]
    Decode(String),
}

/// Errors that abort a report build.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("session is missing or expired")]
    Unauthorized,

    #[error("failed to fetch service item {display_id}: {source}")]
    ItemFetch {
        display_id: u64,
        #[source]
        source: LookupError,
    },
}
