//! Session context and token persistence.
//!
//! DESIGN
//! ======
//! The bearer token is the only session state. It lives in a [`Session`]
//! that flows receive explicitly; where it is persisted is decided by the
//! [`TokenStore`] the session was opened with.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

/// Fixed storage key for the bearer token.
pub const TOKEN_KEY: &str = "authToken";

/// Key-value persistence for the bearer token.
pub trait TokenStore: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn load(&self) -> io::Result<Option<String>>;

    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, token: &str) -> io::Result<()>;

    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be cleared.
    fn clear(&self) -> io::Result<()>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-process store. Clones share the same slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self { slot: Arc::new(Mutex::new(Some(token.to_owned()))) }
    }

    /// Current stored value, for inspection.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.slot.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.get())
    }

    fn save(&self, token: &str) -> io::Result<()> {
        let mut slot = self.slot.lock().map_err(|_| io::Error::other("token store poisoned"))?;
        *slot = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        let mut slot = self.slot.lock().map_err(|_| io::Error::other("token store poisoned"))?;
        *slot = None;
        Ok(())
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Stores the token as the sole contents of a file.
#[derive(Clone, Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/linkmark/authToken`, or `./.linkmark/authToken` when the
    /// platform has no config directory.
    #[must_use]
    pub fn default_path() -> PathBuf {
        match dirs::config_dir() {
            Some(dir) => dir.join("linkmark").join(TOKEN_KEY),
            None => PathBuf::from(".linkmark").join(TOKEN_KEY),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_owned()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)?;
        debug!(path = %self.path.display(), "token saved");
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// The client's view of who is logged in: an optional bearer token.
///
/// A present token means "authenticated" as far as the client knows. It is
/// never checked locally; the backend rejects it if it is stale.
pub struct Session {
    token: Option<String>,
    store: Box<dyn TokenStore>,
}

impl Session {
    /// Open a session, reading any token already in `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn open(store: impl TokenStore + 'static) -> io::Result<Self> {
        let token = store.load()?;
        Ok(Self { token, store: Box::new(store) })
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Persist `token` and make it current.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written; the in-memory token
    /// is left unchanged in that case.
    pub fn store_token(&mut self, token: &str) -> io::Result<()> {
        self.store.save(token)?;
        self.token = Some(token.to_owned());
        Ok(())
    }

    /// Forget the token in memory and in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be cleared. The in-memory token
    /// is dropped regardless.
    pub fn clear(&mut self) -> io::Result<()> {
        self.token = None;
        self.store.clear()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
