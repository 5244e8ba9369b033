//! File-backed SessionStore implementation

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::stream;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use carbontrace_core::{
    Error, Result,
    session_store::{IdentityStream, SessionStore},
    types::UserId,
};

/// File name of the persisted session document.
const STORE_FILE: &str = "user_session_store.json";

/// On-disk session document: one integer entry under a fixed key.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<UserId>,
}

/// File-backed session store
///
/// Persists the authenticated user's identity as a single JSON document and
/// mirrors it in a watch cell. Writes go through a temp-file-and-rename swap,
/// so readers see either the old or the new document, never a torn one.
/// The watch cell is the source of truth for snapshot reads; the file exists
/// to survive process restarts.
pub struct FileSessionStore {
    path: PathBuf,
    cell: watch::Sender<Option<UserId>>,
}

impl FileSessionStore {
    /// Open the store rooted at `dir`, loading any previously persisted
    /// identity.
    ///
    /// A missing, unreadable, or corrupt document reads as absent — an
    /// unreadable store means "not authenticated", never a hard failure.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = expand_tilde(dir.into())?;
        let path = dir.join(STORE_FILE);
        let initial = load_document(&path);
        let (cell, _) = watch::channel(initial);

        info!("Initialized FileSessionStore at {:?}", path);

        Ok(Self { path, cell })
    }

    /// Persist the document, replacing the previous one atomically.
    fn persist(&self, user_id: Option<UserId>) -> Result<()> {
        let contents = serde_json::to_vec_pretty(&SessionDocument { user_id })?;
        write_atomic(&self.path, &contents).map_err(|e| {
            error!("Failed to persist session document: {}", e);
            e
        })
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn user_id(&self) -> Option<UserId> {
        *self.cell.borrow()
    }

    fn observe(&self) -> IdentityStream<'_> {
        let rx = self.cell.subscribe();
        Box::pin(stream::unfold((rx, true), |(mut rx, first)| async move {
            if first {
                let value = *rx.borrow_and_update();
                return Some((value, (rx, false)));
            }
            match rx.changed().await {
                Ok(()) => {
                    let value = *rx.borrow_and_update();
                    Some((value, (rx, false)))
                }
                // Store dropped; nothing further to observe.
                Err(_) => None,
            }
        }))
    }

    async fn set_user_id(&self, id: UserId) -> Result<()> {
        self.persist(Some(id))?;
        self.cell.send_replace(Some(id));
        debug!(user_id = id, "session identity updated");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.persist(None)?;
        self.cell.send_replace(None);
        debug!("session identity cleared");
        Ok(())
    }

    fn is_authenticated(&self) -> bool {
        self.cell.borrow().is_some()
    }
}

/// Read the persisted document, degrading to absent on any failure.
fn load_document(path: &Path) -> Option<UserId> {
    if !path.exists() {
        return None;
    }
    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str::<SessionDocument>(&contents) {
            Ok(document) => document.user_id,
            Err(e) => {
                warn!("Corrupt session document, treating as signed out: {}", e);
                None
            }
        },
        Err(e) => {
            warn!("Unreadable session document, treating as signed out: {}", e);
            None
        }
    }
}

/// Write `data` to `path` via a temp file and rename, so the document is
/// replaced in one swap or not at all.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    let written = (|| {
        {
            let mut file = File::create(&temp)?;
            file.write_all(data)?;
            file.sync_all()?;
        }
        fs::rename(&temp, path)
    })();

    if written.is_err() {
        let _ = fs::remove_file(&temp);
    }
    written.map_err(Error::Io)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(dir: PathBuf) -> Result<PathBuf> {
    if !dir.starts_with("~") {
        return Ok(dir);
    }
    let home = dirs::home_dir()
        .ok_or_else(|| Error::SessionStore("Could not determine home directory".to_string()))?;
    match dir.strip_prefix("~") {
        Ok(rest) => Ok(home.join(rest)),
        Err(_) => Ok(dir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read_and_observe() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::open(dir.path()).unwrap();

        store.set_user_id(42).await.unwrap();

        assert_eq!(store.user_id().await, Some(42));
        let first = store.observe().next().await;
        assert_eq!(first, Some(Some(42)));
    }

    #[tokio::test]
    async fn test_clear_removes_identity() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::open(dir.path()).unwrap();

        store.set_user_id(42).await.unwrap();
        store.clear().await.unwrap();

        assert_eq!(store.user_id().await, None);
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_is_authenticated_is_a_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::open(dir.path()).unwrap();

        // Must answer immediately on an empty store with no write ever
        // arriving, not wait for a notification.
        assert!(!store.is_authenticated());

        store.set_user_id(7).await.unwrap();
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn test_observe_emits_current_then_changes() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::open(dir.path()).unwrap();

        let mut identities = store.observe();
        assert_eq!(identities.next().await, Some(None));

        store.set_user_id(1).await.unwrap();
        assert_eq!(identities.next().await, Some(Some(1)));

        store.clear().await.unwrap();
        assert_eq!(identities.next().await, Some(None));
    }

    #[tokio::test]
    async fn test_identity_survives_reopen() {
        let dir = TempDir::new().unwrap();

        {
            let store = FileSessionStore::open(dir.path()).unwrap();
            store.set_user_id(42).await.unwrap();
        }

        let reopened = FileSessionStore::open(dir.path()).unwrap();
        assert_eq!(reopened.user_id().await, Some(42));
        assert!(reopened.is_authenticated());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::open(dir.path()).unwrap();

        store.set_user_id(1).await.unwrap();
        store.set_user_id(2).await.unwrap();

        assert_eq!(store.user_id().await, Some(2));
    }

    #[tokio::test]
    async fn test_corrupt_document_reads_as_signed_out() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(STORE_FILE), b"not json").unwrap();

        let store = FileSessionStore::open(dir.path()).unwrap();
        assert_eq!(store.user_id().await, None);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_document_schema() {
        let with_id = serde_json::to_string(&SessionDocument { user_id: Some(42) }).unwrap();
        assert_eq!(with_id, r#"{"user_id":42}"#);

        let absent = serde_json::to_string(&SessionDocument { user_id: None }).unwrap();
        assert_eq!(absent, "{}");
    }
}
