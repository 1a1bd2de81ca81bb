//! File-backed session store.
//!
//! Persists the login session (credentials, issue time and the workspace
//! list fetched at login) as JSON under the user's config directory, so a
//! later `report` run can gate on validity and seed its name cache
//! without re-fetching.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::debug;

use deskrep::auth::{CredentialProvider, Credentials, Session};

pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Opens the default store under the platform config directory.
    pub fn open_default() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "deskrep")
            .context("could not determine a config directory")?;
        Ok(Self::at(dirs.config_dir().join("session.json")))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Option<Session> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(err) => {
                debug!(path = %self.path.display(), "discarding unreadable session file: {err}");
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        restrict_permissions(&self.path);
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }

    /// The stored session, only if it is still within its validity window.
    pub fn valid_session(&self) -> Option<Session> {
        self.load().filter(Session::is_valid)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &std::path::Path) {
    use std::os::unix::fs::PermissionsExt;
    let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &std::path::Path) {}

impl CredentialProvider for FileSessionStore {
    fn current_auth(&self) -> Option<Credentials> {
        self.valid_session().map(|session| session.credentials())
    }

    fn is_session_valid(&self) -> bool {
        self.valid_session().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::at(dir.path().join("session.json"));

        assert!(store.load().is_none());
        store
            .save(&Session::new("acme", "secret"))
            .expect("save should succeed");

        let session = store.load().expect("session should load");
        assert_eq!(session.domain, "acme");
        assert!(store.is_session_valid());
        assert_eq!(
            store.current_auth().map(|auth| auth.domain),
            Some("acme".to_string())
        );
    }

    #[test]
    fn expired_sessions_are_not_offered() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::at(dir.path().join("session.json"));

        let mut session = Session::new("acme", "secret");
        session.issued_at = Utc::now() - Duration::hours(25);
        store.save(&session).expect("save should succeed");

        assert!(store.load().is_some());
        assert!(store.valid_session().is_none());
        assert!(!store.is_session_valid());
        assert!(store.current_auth().is_none());
    }

    #[test]
    fn clear_removes_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::at(dir.path().join("session.json"));

        store
            .save(&Session::new("acme", "secret"))
            .expect("save should succeed");
        store.clear().expect("clear should succeed");
        assert!(store.load().is_none());
        // Clearing an absent file is fine.
        store.clear().expect("second clear should succeed");
    }
}
