//! Integration tests for the session lifecycle across simulated restarts.

use anyhow::Result;
use inout_core::auth::{CredentialStore, MemoryStore, SecretStore};
use inout_core::{SessionManager, SessionState, SessionToken};

/// Backend whose individual operations can be made to fail.
#[derive(Clone, Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_save: bool,
    fail_load: bool,
    fail_clear: bool,
}

impl SecretStore for FlakyStore {
    fn save(&self, secret: &str) -> Result<()> {
        if self.fail_save {
            anyhow::bail!("keychain unavailable");
        }
        self.inner.save(secret)
    }

    fn load(&self) -> Result<Option<String>> {
        if self.fail_load {
            anyhow::bail!("entry corrupted");
        }
        self.inner.load()
    }

    fn clear(&self) -> Result<()> {
        if self.fail_clear {
            anyhow::bail!("keychain unavailable");
        }
        self.inner.clear()
    }
}

#[tokio::test]
async fn login_survives_restart() {
    let backend = MemoryStore::new();

    let mut first_run = SessionManager::new(CredentialStore::new(backend.clone()));
    first_run.restore().await;
    assert_eq!(first_run.state(), &SessionState::Unauthenticated);

    first_run.login(SessionToken::new("T-42")).await;
    assert!(first_run.is_authenticated());
    drop(first_run);

    let mut second_run = SessionManager::new(CredentialStore::new(backend));
    assert!(second_run.is_restoring());
    let state = second_run.restore().await;
    assert_eq!(state, &SessionState::Authenticated(SessionToken::new("T-42")));
    assert_eq!(second_run.token().map(SessionToken::expose), Some("T-42"));
}

#[tokio::test]
async fn logout_then_restart_is_signed_out() {
    let backend = MemoryStore::new();

    let mut manager = SessionManager::new(CredentialStore::new(backend.clone()));
    manager.login(SessionToken::new("T-1")).await;
    manager.logout().await;
    assert_eq!(manager.state(), &SessionState::Unauthenticated);

    let mut restarted = SessionManager::new(CredentialStore::new(backend));
    assert_eq!(restarted.restore().await, &SessionState::Unauthenticated);
}

#[tokio::test]
async fn logout_is_unconditional_when_clear_fails() {
    let backend = FlakyStore {
        fail_clear: true,
        ..Default::default()
    };

    let mut manager = SessionManager::new(CredentialStore::new(backend));
    manager.login(SessionToken::new("T-7")).await;
    assert!(manager.is_authenticated());

    manager.logout().await;
    assert_eq!(manager.state(), &SessionState::Unauthenticated);
    assert!(manager.token().is_none());
}

#[tokio::test]
async fn login_is_best_effort_when_save_fails() {
    let backend = FlakyStore {
        fail_save: true,
        ..Default::default()
    };

    let mut manager = SessionManager::new(CredentialStore::new(backend.clone()));
    manager.login(SessionToken::new("T-9")).await;
    assert_eq!(manager.token(), Some(&SessionToken::new("T-9")));

    // Nothing was persisted, so the next run starts signed out
    let mut restarted = SessionManager::new(CredentialStore::new(backend));
    assert_eq!(restarted.restore().await, &SessionState::Unauthenticated);
}

#[tokio::test]
async fn unreadable_store_restores_signed_out() {
    let backend = FlakyStore {
        fail_load: true,
        ..Default::default()
    };
    backend.inner.save("T-3").expect("seed store");

    let mut manager = SessionManager::new(CredentialStore::new(backend));
    assert_eq!(manager.restore().await, &SessionState::Unauthenticated);
}
