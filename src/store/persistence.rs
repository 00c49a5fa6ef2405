//! Persistence backends for the client state subset
//!
//! Only the session and the selected instance survive a restart. Fetched
//! collections are always refetched.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

use super::{AuthSession, SelectedInstance};

/// The part of the store that is written to disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub session: Option<AuthSession>,
    #[serde(default)]
    pub selected_instance: Option<SelectedInstance>,
}

/// Where the persisted state lives
///
/// Implementations must be `Send + Sync` so the store can be shared with
/// async tasks.
#[async_trait]
pub trait StatePersistence: Send + Sync {
    /// Load the last saved state; a missing record is `Ok(None)`
    async fn load(&self) -> StoreResult<Option<PersistedState>>;

    /// Replace the saved state
    async fn save(&self, state: &PersistedState) -> StoreResult<()>;

    /// Remove the saved state entirely
    async fn clear(&self) -> StoreResult<()>;
}

/// JSON file on disk
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StatePersistence for FilePersistence {
    async fn load(&self) -> StoreResult<Option<PersistedState>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("no persisted state at {}", self.path.display());
                return Ok(None);
            }
            Err(err) => return Err(StoreError::Io(err)),
        };

        match serde_json::from_str(&content) {
            Ok(state) => Ok(Some(state)),
            Err(err) => {
                warn!(
                    "ignoring unreadable state file {}: {}",
                    self.path.display(),
                    err
                );
                Ok(None)
            }
        }
    }

    async fn save(&self, state: &PersistedState) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(state)?;

        // write to a sibling file, then swap it in
        let tmp = self.path.with_extension("json.tmp");
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        // the file holds the bearer token
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&tmp).await?;
        #[cfg(unix)]
        {
            // a stale temp file keeps its old mode
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600)).await?;
        }
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;

        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::Io(err)),
        }
    }
}

/// In-memory persistence (no disk access)
#[derive(Default)]
pub struct MemoryPersistence {
    state: Mutex<Option<PersistedState>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the "disk" contents
    pub fn with_state(state: PersistedState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }

    /// Current contents, for assertions
    pub fn snapshot(&self) -> Option<PersistedState> {
        self.state.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl StatePersistence for MemoryPersistence {
    async fn load(&self) -> StoreResult<Option<PersistedState>> {
        Ok(self.state.lock()?.clone())
    }

    async fn save(&self, state: &PersistedState) -> StoreResult<()> {
        *self.state.lock()? = Some(state.clone());
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        *self.state.lock()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::User;
    use tempfile::tempdir;

    fn state() -> PersistedState {
        PersistedState {
            session: Some(AuthSession {
                token: "tok".to_string(),
                user: User {
                    id: "1".to_string(),
                    email: "ops@example.com".to_string(),
                    name: None,
                },
            }),
            selected_instance: None,
        }
    }

    #[tokio::test]
    async fn file_roundtrip_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let persistence = FilePersistence::new(dir.path().join("nested/state.json"));

        assert_eq!(persistence.load().await.unwrap(), None);

        persistence.save(&state()).await.unwrap();
        assert_eq!(persistence.load().await.unwrap(), Some(state()));

        persistence.clear().await.unwrap();
        assert_eq!(persistence.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_file_loads_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();

        let persistence = FilePersistence::new(path);
        assert_eq!(persistence.load().await.unwrap(), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn state_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        // a leftover temp file from an interrupted save
        std::fs::write(path.with_extension("json.tmp"), "{}").unwrap();

        let persistence = FilePersistence::new(&path);
        persistence.save(&state()).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn poisoned_memory_lock_is_an_error() {
        let persistence = std::sync::Arc::new(MemoryPersistence::new());

        let poisoner = persistence.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.state.lock().unwrap();
            panic!("writer died");
        })
        .join();

        assert!(matches!(
            persistence.save(&state()).await,
            Err(StoreError::Poisoned)
        ));
        assert!(matches!(persistence.clear().await, Err(StoreError::Poisoned)));
        assert!(persistence.load().await.is_err());
    }

    #[tokio::test]
    async fn clearing_missing_file_is_ok() {
        let dir = tempdir().unwrap();
        let persistence = FilePersistence::new(dir.path().join("absent.json"));
        assert!(persistence.clear().await.is_ok());
    }
}
