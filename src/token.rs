//! Token Storage
//!
//! Persistence for the bearer token between runs. The file store is the
//! native counterpart of the browser's `mh_token` local storage key.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Token storage errors
#[derive(Error, Debug)]
pub enum TokenStoreError {
    #[error("Failed to read token from {path:?}: {error}")]
    Read { path: PathBuf, error: String },

    #[error("Failed to write token to {path:?}: {error}")]
    Write { path: PathBuf, error: String },

    #[error("Token store lock poisoned")]
    Poisoned,
}

pub type TokenResult<T> = Result<T, TokenStoreError>;

/// Where the current access token lives
pub trait TokenStore: Send + Sync {
    /// Stored token, `None` when signed out
    fn load(&self) -> TokenResult<Option<String>>;

    fn save(&self, token: &str) -> TokenResult<()>;

    /// Remove the token. Clearing an empty store is not an error.
    fn clear(&self) -> TokenResult<()>;
}

/// Token kept in a single file
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the user's config directory
    pub fn default_location() -> Self {
        let path = dirs::config_dir()
            .map(|p| p.join("haven").join("mh_token"))
            .unwrap_or_else(|| PathBuf::from(".mh_token"));
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> TokenResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok(if token.is_empty() {
                    None
                } else {
                    Some(token.to_string())
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TokenStoreError::Read {
                path: self.path.clone(),
                error: e.to_string(),
            }),
        }
    }

    fn save(&self, token: &str) -> TokenResult<()> {
        let write_err = |e: std::io::Error| TokenStoreError::Write {
            path: self.path.clone(),
            error: e.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_err)?;
            }
        }
        std::fs::write(&self.path, token).map_err(write_err)?;

        tracing::debug!(path = ?self.path, "Token saved");
        Ok(())
    }

    fn clear(&self) -> TokenResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = ?self.path, "Token cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TokenStoreError::Write {
                path: self.path.clone(),
                error: e.to_string(),
            }),
        }
    }
}

/// In-process token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> TokenResult<Option<String>> {
        let guard = self.token.lock().map_err(|_| TokenStoreError::Poisoned)?;
        Ok(guard.clone())
    }

    fn save(&self, token: &str) -> TokenResult<()> {
        let mut guard = self.token.lock().map_err(|_| TokenStoreError::Poisoned)?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> TokenResult<()> {
        let mut guard = self.token.lock().map_err(|_| TokenStoreError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_lifecycle() {
        let dir = tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("mh_token"));

        assert_eq!(store.load().unwrap(), None);
        store.save("abc123").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc123"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_ignores_whitespace() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mh_token");
        std::fs::write(&path, "  \n").unwrap();
        assert_eq!(FileTokenStore::new(&path).load().unwrap(), None);

        std::fs::write(&path, "tok\n").unwrap();
        assert_eq!(FileTokenStore::new(&path).load().unwrap().as_deref(), Some("tok"));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::with_token("t");
        assert_eq!(store.load().unwrap().as_deref(), Some("t"));
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
