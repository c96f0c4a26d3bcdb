use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use keyring::Entry;
use tracing::{debug, warn};

use super::SessionToken;
use crate::config::{TokenStoreKind, APP_NAME};

/// Fixed key the session token is stored under.
pub const TOKEN_KEY: &str = "inout_api_key";

/// Backend holding a single secret value.
pub trait SecretStore: Send + Sync {
    fn save(&self, secret: &str) -> Result<()>;
    fn load(&self) -> Result<Option<String>>;
    fn clear(&self) -> Result<()>;
}

/// OS keychain backend.
pub struct KeyringStore {
    service: String,
    key: String,
}

impl KeyringStore {
    pub fn new(service: &str, key: &str) -> Self {
        Self {
            service: service.to_string(),
            key: key.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, &self.key).context("Failed to create keyring entry")
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new(APP_NAME, TOKEN_KEY)
    }
}

impl SecretStore for KeyringStore {
    fn save(&self, secret: &str) -> Result<()> {
        self.entry()?
            .set_password(secret)
            .context("Failed to store token in keychain")
    }

    fn load(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

/// Process-local backend. Clones share the same slot.
#[derive(Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for MemoryStore {
    fn save(&self, secret: &str) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory store lock poisoned"))?;
        *slot = Some(secret.to_string());
        Ok(())
    }

    fn load(&self) -> Result<Option<String>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory store lock poisoned"))?;
        Ok(slot.clone())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory store lock poisoned"))?;
        *slot = None;
        Ok(())
    }
}

/// Session token persistence that never fails outward.
///
/// A backend error is logged and reported as "nothing stored" (on load) or
/// `false` (on save/clear); losing a cached token only forces a new login.
/// Backend calls run on the blocking pool since keychains may block.
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn SecretStore>,
}

impl CredentialStore {
    pub fn new<S: SecretStore + 'static>(backend: S) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub fn keyring() -> Self {
        Self::new(KeyringStore::default())
    }

    pub fn memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn from_kind(kind: TokenStoreKind) -> Self {
        match kind {
            TokenStoreKind::Keyring => Self::keyring(),
            TokenStoreKind::Memory => Self::memory(),
        }
    }

    async fn run<T, F>(&self, op: &'static str, f: F) -> Option<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn SecretStore) -> Result<T> + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        match tokio::task::spawn_blocking(move || f(backend.as_ref())).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!(op = op, error = %e, "Credential store operation failed");
                None
            }
            Err(e) => {
                warn!(op = op, error = %e, "Credential store task failed");
                None
            }
        }
    }

    pub async fn save(&self, token: &SessionToken) -> bool {
        let secret = token.expose().to_string();
        self.run("save", move |store| store.save(&secret)).await.is_some()
    }

    /// Stored token, if any. Empty values count as absent.
    pub async fn load(&self) -> Option<SessionToken> {
        let loaded = self.run("load", |store| store.load()).await.flatten();
        debug!(found = loaded.is_some(), "Credential store loaded");
        loaded
            .filter(|secret| !secret.is_empty())
            .map(SessionToken::new)
    }

    pub async fn clear(&self) -> bool {
        self.run("clear", |store| store.clear()).await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    impl SecretStore for BrokenStore {
        fn save(&self, _secret: &str) -> Result<()> {
            Err(anyhow::anyhow!("keychain locked"))
        }
        fn load(&self) -> Result<Option<String>> {
            Err(anyhow::anyhow!("entry corrupted"))
        }
        fn clear(&self) -> Result<()> {
            Err(anyhow::anyhow!("keychain locked"))
        }
    }

    #[test]
    fn test_memory_store_clones_share_slot() {
        let a = MemoryStore::new();
        let b = a.clone();
        a.save("tok").expect("save");
        assert_eq!(b.load().expect("load").as_deref(), Some("tok"));
        b.clear().expect("clear");
        assert_eq!(a.load().expect("load"), None);
    }

    #[tokio::test]
    async fn test_credential_store_round_trip() {
        let store = CredentialStore::memory();
        assert!(store.load().await.is_none());
        assert!(store.save(&SessionToken::new("abc")).await);
        assert_eq!(store.load().await, Some(SessionToken::new("abc")));
        assert!(store.clear().await);
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_broken_backend_degrades_to_absent() {
        let store = CredentialStore::new(BrokenStore);
        assert!(!store.save(&SessionToken::new("abc")).await);
        assert!(store.load().await.is_none());
        assert!(!store.clear().await);
    }

    #[tokio::test]
    async fn test_empty_secret_is_absent() {
        let backend = MemoryStore::new();
        backend.save("").expect("save");
        let store = CredentialStore::new(backend);
        assert!(store.load().await.is_none());
    }
}
