use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::client::ClientError;
use crate::models::user_profile::UserProfile;

/// What the storefront keeps between page loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub user: Option<UserProfile>,
}

/// Shared session handle. Clones see the same session; when built with
/// [`SessionCache::persistent`] every change is written to a JSON file.
#[derive(Debug, Clone, Default)]
pub struct SessionCache {
    inner: Arc<RwLock<Session>>,
    path: Option<Arc<PathBuf>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the session stored at `path`, or start empty if there is none yet.
    pub fn persistent(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref().to_path_buf();
        let session = match fs::read_to_string(&path) {
            Ok(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)
                .map_err(|e| ClientError::Storage(e.to_string()))?,
            Ok(_) => Session::default(),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Session::default(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            inner: Arc::new(RwLock::new(session)),
            path: Some(Arc::new(path)),
        })
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, Session> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Session> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> Session {
        self.read_lock().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read_lock().token.clone()
    }

    pub fn user_id(&self) -> Option<String> {
        self.read_lock().user_id.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.read_lock().user.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.read_lock().token.is_some()
    }

    pub fn login(
        &self,
        token: impl Into<String>,
        user_id: impl Into<String>,
        user: UserProfile,
    ) -> Result<(), ClientError> {
        self.update(|session| {
            session.token = Some(token.into());
            session.user_id = Some(user_id.into());
            session.user = Some(user);
        })
    }

    pub fn update_user(&self, user: UserProfile) -> Result<(), ClientError> {
        self.update(|session| session.user = Some(user))
    }

    pub fn clear(&self) -> Result<(), ClientError> {
        self.update(|session| *session = Session::default())
    }

    fn update(&self, change: impl FnOnce(&mut Session)) -> Result<(), ClientError> {
        let mut session = self.write_lock();
        let mut next = session.clone();
        change(&mut next);

        // Persist first so a failed write leaves memory and file in agreement.
        if let Some(path) = &self.path {
            let json = serde_json::to_vec_pretty(&next)
                .map_err(|e| ClientError::Storage(e.to_string()))?;
            fs::write(path.as_path(), json)?;
        }
        *session = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> UserProfile {
        UserProfile {
            full_name: name.to_string(),
            email: "seller@example.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn clones_share_one_session() {
        let cache = SessionCache::new();
        let other = cache.clone();
        cache.login("tok", "u1", profile("Asha Rao")).unwrap();

        assert_eq!(other.token().as_deref(), Some("tok"));
        other.clear().unwrap();
        assert!(!cache.is_logged_in());
        assert!(cache.user().is_none());
    }

    #[test]
    fn persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let cache = SessionCache::persistent(&path).unwrap();
        assert_eq!(cache.snapshot(), Session::default());
        cache.login("tok", "u1", profile("Asha Rao")).unwrap();
        cache.update_user(profile("Asha R.")).unwrap();

        let reloaded = SessionCache::persistent(&path).unwrap();
        assert_eq!(reloaded.user_id().as_deref(), Some("u1"));
        assert_eq!(reloaded.user().unwrap().full_name, "Asha R.");

        reloaded.clear().unwrap();
        assert!(!SessionCache::persistent(&path).unwrap().is_logged_in());
    }

    #[test]
    fn failed_write_keeps_previous_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("session.json");

        let cache = SessionCache::persistent(&path).unwrap();
        let err = cache.login("tok", "u1", profile("Asha Rao")).unwrap_err();
        assert!(matches!(err, ClientError::Storage(_)));
        assert!(!cache.is_logged_in());
        assert_eq!(cache.snapshot(), Session::default());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(SessionCache::persistent(&path), Err(ClientError::Storage(_))));
    }
}
