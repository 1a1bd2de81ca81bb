//! Credential capability consumed by the front end.
//!
//! Credential storage and encryption are outside the core: the pipeline
//! only needs "give me `(domain, api_key)` or tell me the session is gone".

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::NamedRef;

/// How long a stored session stays usable.
pub fn session_ttl() -> Duration {
    Duration::hours(24)
}

/// Plain tenant credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Tenant subdomain, e.g. `acme` for `acme.freshservice.com`.
    pub domain: String,
    pub api_key: String,
}

/// A stored login session. The workspace list fetched at login is kept
/// alongside the credentials so later report runs can seed their name
/// cache without re-fetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub domain: String,
    pub api_key: String,
    pub issued_at: DateTime<Utc>,
    #[serde(default)]
    pub workspaces: Vec<NamedRef>,
}

impl Session {
    pub fn new(domain: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            api_key: api_key.into(),
            issued_at: Utc::now(),
            workspaces: Vec::new(),
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.issued_at + session_ttl()
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            domain: self.domain.clone(),
            api_key: self.api_key.clone(),
        }
    }
}

/// The capability the UI layer hands to the report flow.
pub trait CredentialProvider: Send + Sync {
    fn current_auth(&self) -> Option<Credentials>;
    fn is_session_valid(&self) -> bool;
}
