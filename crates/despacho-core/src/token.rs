// ── Durable token storage seam ──
//
// The session persists its bearer token through `TokenStore` so the
// backing medium (file, OS keyring, memory) is chosen by the front end.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

/// Key under which the bearer token is persisted.
pub const TOKEN_KEY: &str = "@App:token";

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("token storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("token storage backend failed: {0}")]
    Backend(String),
}

/// Durable key-value slot for the session token.
///
/// `load` returns `None` when nothing was stored. `clear` on an empty
/// store succeeds.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, TokenStoreError>;
    fn save(&self, token: &str) -> Result<(), TokenStoreError>;
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Process-local store, used by tests and `--no-persist` runs.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
    writes: AtomicUsize,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of `save` calls that reached the store.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn with_slot<T>(
        &self,
        f: impl FnOnce(&mut Option<String>) -> T,
    ) -> Result<T, TokenStoreError> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|_| TokenStoreError::Backend("token slot poisoned".into()))?;
        Ok(f(&mut guard))
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        self.with_slot(|slot| slot.clone())
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        self.with_slot(|slot| *slot = Some(token.to_owned()))?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        self.with_slot(|slot| *slot = None)
    }
}
