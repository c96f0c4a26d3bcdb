//! Authentication module for the session token lifecycle.
//!
//! This module provides:
//! - `SessionManager`: the logged-in/logged-out state machine
//! - `CredentialStore`: on-device token persistence that degrades instead of failing
//! - `SecretStore` backends: OS keychain via keyring, or process memory
//!
//! Tokens carry no client-side expiry; the gateway is the only judge of validity.

pub mod credentials;
pub mod session;

pub use credentials::{CredentialStore, KeyringStore, MemoryStore, SecretStore, TOKEN_KEY};
pub use session::{SessionManager, SessionState, SessionToken};
