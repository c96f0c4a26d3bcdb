use tracing::{info, warn};

use super::CredentialStore;

/// Opaque credential issued by the gateway at login.
///
/// The client never inspects it; validity is decided by the gateway on each
/// authenticated call. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Startup check against the credential store has not resolved yet.
    Restoring,
    Unauthenticated,
    Authenticated(SessionToken),
}

/// Owns the process-wide session and its transitions.
///
/// There is no expiry or refresh transition: an expired token is only noticed
/// when the gateway rejects a later call.
pub struct SessionManager {
    store: CredentialStore,
    state: SessionState,
}

impl SessionManager {
    pub fn new(store: CredentialStore) -> Self {
        Self {
            store,
            state: SessionState::Restoring,
        }
    }

    /// Look for a token left by a previous run.
    pub async fn restore(&mut self) -> &SessionState {
        self.state = match self.store.load().await {
            Some(token) => {
                info!("Restored saved session");
                SessionState::Authenticated(token)
            }
            None => SessionState::Unauthenticated,
        };
        &self.state
    }

    /// Persist the token, then sign in. A failed write still signs in for
    /// the lifetime of this process.
    pub async fn login(&mut self, token: SessionToken) {
        if !self.store.save(&token).await {
            warn!("Session token not persisted; login will not survive a restart");
        }
        self.state = SessionState::Authenticated(token);
        info!("Session started");
    }

    /// Clear the stored token, then sign out regardless of whether the clear worked.
    pub async fn logout(&mut self) {
        if !self.store.clear().await {
            warn!("Stored session token could not be cleared");
        }
        self.state = SessionState::Unauthenticated;
        info!("Session ended");
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn token(&self) -> Option<&SessionToken> {
        match &self.state {
            SessionState::Authenticated(token) => Some(token),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn is_restoring(&self) -> bool {
        matches!(self.state, SessionState::Restoring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_debug_is_redacted() {
        let token = SessionToken::new("super-secret");
        assert_eq!(format!("{:?}", token), "SessionToken(***)");
        assert!(!format!("{:?}", SessionState::Authenticated(token)).contains("super-secret"));
    }

    #[tokio::test]
    async fn test_starts_restoring() {
        let manager = SessionManager::new(CredentialStore::memory());
        assert!(manager.is_restoring());
        assert!(!manager.is_authenticated());
        assert!(manager.token().is_none());
    }

    #[tokio::test]
    async fn test_restore_with_empty_store() {
        let mut manager = SessionManager::new(CredentialStore::memory());
        assert_eq!(manager.restore().await, &SessionState::Unauthenticated);
    }
}
