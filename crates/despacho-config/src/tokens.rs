// ── Durable token stores ──
//
// Each profile keeps its own `@App:token` slot, either as a file under
// the data directory or as an OS keyring entry.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use despacho_core::{TOKEN_KEY, TokenStore, TokenStoreError};

use crate::{ConfigError, Profile, TokenStorage};

/// Keyring service name shared by all profiles.
pub const KEYRING_SERVICE: &str = "despacho";

/// Open the token store a profile is configured for.
pub fn token_store(
    data_dir: &Path,
    profile_name: &str,
    profile: &Profile,
) -> Result<Arc<dyn TokenStore>, ConfigError> {
    Ok(match profile.token_storage {
        TokenStorage::File => Arc::new(FileTokenStore::for_profile(data_dir, profile_name)),
        TokenStorage::Keyring => Arc::new(KeyringTokenStore::new(profile_name)?),
    })
}

// ── File ────────────────────────────────────────────────────────────

/// Token kept in `<data_dir>/<profile>/token`, readable by the owner only.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_profile(data_dir: &Path, profile_name: &str) -> Self {
        Self::new(data_dir.join(profile_name).join("token"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents.trim_end().to_owned())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt as _;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        // `mode` only applies on create; narrow an existing file too.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt as _;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(token.as_bytes())?;
        tracing::debug!(path = %self.path.display(), "session token written");
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ── Keyring ─────────────────────────────────────────────────────────

/// Token kept in the OS keyring under `despacho` / `<profile>/@App:token`.
pub struct KeyringTokenStore {
    entry: keyring::Entry,
}

impl KeyringTokenStore {
    pub fn new(profile_name: &str) -> Result<Self, ConfigError> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{TOKEN_KEY}"))?;
        Ok(Self { entry })
    }
}

impl std::fmt::Debug for KeyringTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyringTokenStore").finish_non_exhaustive()
    }
}

fn backend(err: &keyring::Error) -> TokenStoreError {
    TokenStoreError::Backend(err.to_string())
}

impl TokenStore for KeyringTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        match self.entry.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(backend(&e)),
        }
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        self.entry.set_password(token).map_err(|e| backend(&e))
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(backend(&e)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn file_store_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::for_profile(dir.path(), "homolog");
        assert_eq!(store.path(), dir.path().join("homolog/token"));

        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();

        store.save("eyJhbGciOi").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("eyJhbGciOi"));

        store.save("segundo").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("segundo"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt as _;

        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::for_profile(dir.path(), "default");
        store.save("abc").unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn file_store_narrows_existing_file() {
        use std::os::unix::fs::PermissionsExt as _;

        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::for_profile(dir.path(), "default");
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "antigo").unwrap();
        std::fs::set_permissions(store.path(), std::fs::Permissions::from_mode(0o644)).unwrap();

        store.save("novo").unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.load().unwrap().as_deref(), Some("novo"));
    }

    #[test]
    fn profiles_do_not_share_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = FileTokenStore::for_profile(dir.path(), "a");
        let b = FileTokenStore::for_profile(dir.path(), "b");

        a.save("token-a").unwrap();
        assert_eq!(b.load().unwrap(), None);
    }

    #[test]
    fn file_profile_opens_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = token_store(dir.path(), "default", &Profile::new("http://localhost")).unwrap();
        store.save("abc").unwrap();
        assert!(dir.path().join("default/token").exists());
    }
}
