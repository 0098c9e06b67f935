//! Session state that survives restarts.
//!
//! Holds the last URL the user entered. A [`Session`] is loaded once at
//! start-up and written through on every change. [`init_global`] installs
//! one process-wide instance for front-ends that want a single shared
//! session; nothing needs tearing down.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to read session file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write session file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid session file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("session already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct SessionState {
    #[serde(default)]
    nft_url: String,
}

#[derive(Debug)]
pub struct Session {
    path: Option<PathBuf>,
    state: Mutex<SessionState>,
}

impl Session {
    /// Session that is never persisted.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Load the session stored at `path`. A missing file yields an empty
    /// session that will be created on first write.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();
        let state = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => SessionState::default(),
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| SessionError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SessionState::default(),
            Err(source) => return Err(SessionError::Read { path, source }),
        };

        tracing::debug!(
            target: "nft_verify::session",
            path = %path.display(),
            has_url = !state.nft_url.is_empty(),
            "Loaded session"
        );

        Ok(Self {
            path: Some(path),
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn nft_url(&self) -> String {
        self.lock().nft_url.clone()
    }

    /// Store the URL, persisting it if it changed. Memory is only updated
    /// once the write succeeded.
    pub fn set_nft_url(&self, url: &str) -> Result<(), SessionError> {
        let mut state = self.lock();
        if state.nft_url == url {
            return Ok(());
        }
        let next = SessionState {
            nft_url: url.to_string(),
        };
        self.persist(&next)?;
        *state = next;
        Ok(())
    }

    fn persist(&self, state: &SessionState) -> Result<(), SessionError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let write_err = |source| SessionError::Write {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let contents = serde_json::to_string_pretty(state).map_err(|source| SessionError::Parse {
            path: path.clone(),
            source,
        })?;
        std::fs::write(path, contents).map_err(write_err)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

static GLOBAL: OnceLock<Arc<Session>> = OnceLock::new();

/// Load the process-wide session. Fails if called twice.
pub fn init_global(path: impl AsRef<Path>) -> Result<Arc<Session>, SessionError> {
    let session = Arc::new(Session::load(path)?);
    GLOBAL
        .set(session.clone())
        .map_err(|_| SessionError::AlreadyInitialized)?;
    Ok(session)
}

/// The process-wide session, if [`init_global`] has run.
pub fn global() -> Option<Arc<Session>> {
    GLOBAL.get().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::load(dir.path().join("session.json")).unwrap();
        assert_eq!(session.nft_url(), "");
    }

    #[test]
    fn test_url_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let session = Session::load(&path).unwrap();
        session
            .set_nft_url("https://opensea.io/assets/ethereum/0xABC123/42")
            .unwrap();

        let reloaded = Session::load(&path).unwrap();
        assert_eq!(
            reloaded.nft_url(),
            "https://opensea.io/assets/ethereum/0xABC123/42"
        );
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(Session::load(&path), Err(SessionError::Parse { .. })));
    }

    #[test]
    fn test_failed_write_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("sub");
        let path = blocker.join("session.json");
        let session = Session::load(&path).unwrap();

        // A file where the parent directory should be makes the write fail.
        std::fs::write(&blocker, "").unwrap();
        let url = "https://opensea.io/assets/ethereum/0xABC123/42";
        assert!(matches!(session.set_nft_url(url), Err(SessionError::Write { .. })));
        assert_eq!(session.nft_url(), "");
        assert!(matches!(session.set_nft_url(url), Err(SessionError::Write { .. })));

        std::fs::remove_file(&blocker).unwrap();
        session.set_nft_url(url).unwrap();
        assert_eq!(session.nft_url(), url);
        assert_eq!(Session::load(&path).unwrap().nft_url(), url);
    }

    #[test]
    fn test_in_memory() {
        let session = Session::in_memory();
        session.set_nft_url("x").unwrap();
        assert_eq!(session.nft_url(), "x");
        assert!(session.path().is_none());
    }

    #[test]
    fn test_global_init_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        init_global(&path).unwrap();
        assert!(global().is_some());
        assert!(matches!(init_global(&path), Err(SessionError::AlreadyInitialized)));
    }
}
