//! Gateway client module.
//!
//! The gateway is a set of four HTTP functions that broker between this client
//! and the library system. Login and the location list are anonymous; scans and
//! the entry log carry the session token as a bearer credential. The long-lived
//! library-system credential never reaches this client.

pub mod client;
pub mod error;
pub mod response;

use std::future::Future;

pub use client::GatewayClient;
pub use error::{ErrorKind, GatewayError};

use crate::auth::SessionToken;
use crate::models::{Location, LogEntry, ScanRequest, ScanResult};

/// The four gateway functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login,
    Locations,
    Scan,
    Log,
}

impl Endpoint {
    pub const ALL: [Endpoint; 4] = [
        Endpoint::Login,
        Endpoint::Locations,
        Endpoint::Scan,
        Endpoint::Log,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Login => "Login",
            Endpoint::Locations => "Locations",
            Endpoint::Scan => "Scan",
            Endpoint::Log => "Log",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Operations the screens drive. Implemented over HTTP by [`GatewayClient`].
///
/// Each call is single-shot: no retries, and failures come back classified.
pub trait Gateway: Send + Sync {
    /// Fail with [`GatewayError::NotConfigured`] if the endpoint still has its placeholder URL.
    fn ensure_configured(&self, endpoint: Endpoint) -> Result<(), GatewayError>;

    fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<SessionToken, GatewayError>> + Send;

    fn list_locations(&self) -> impl Future<Output = Result<Vec<Location>, GatewayError>> + Send;

    fn submit_scan(
        &self,
        token: &SessionToken,
        request: &ScanRequest,
    ) -> impl Future<Output = Result<ScanResult, GatewayError>> + Send;

    fn list_entries(
        &self,
        token: &SessionToken,
    ) -> impl Future<Output = Result<Vec<LogEntry>, GatewayError>> + Send;
}
