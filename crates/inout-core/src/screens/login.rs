use tracing::warn;

use super::OpStatus;
use crate::api::{Endpoint, Gateway, GatewayError};
use crate::auth::SessionToken;

/// Credentials captured when a login is started.
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct LoginScreen {
    pub username: String,
    pub password: String,
    pub status: OpStatus<()>,
}

impl LoginScreen {
    pub fn new(username: String, password: String) -> Self {
        Self {
            username,
            password,
            status: OpStatus::Idle,
        }
    }

    /// Sign-in control is disabled while a request is outstanding.
    pub fn can_submit(&self) -> bool {
        !self.status.is_in_flight()
    }

    pub fn begin<G: Gateway>(&mut self, gateway: &G) -> Option<LoginRequest> {
        if !self.can_submit() {
            return None;
        }
        if let Err(e) = gateway.ensure_configured(Endpoint::Login) {
            self.status.fail(e);
            return None;
        }
        self.status.start();
        Some(LoginRequest {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }

    /// Record the outcome. On success the password field is wiped and the token returned.
    pub fn finish(&mut self, result: Result<SessionToken, GatewayError>) -> Option<SessionToken> {
        match result {
            Ok(token) => {
                self.password.clear();
                self.status.settle(Ok(()));
                Some(token)
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.status.fail(e);
                None
            }
        }
    }

    pub async fn submit<G: Gateway>(&mut self, gateway: &G) -> Option<SessionToken> {
        let request = self.begin(gateway)?;
        let result = gateway
            .authenticate(&request.username, &request.password)
            .await;
        self.finish(result)
    }

    pub fn error_message(&self) -> Option<String> {
        self.status.error().map(ToString::to_string)
    }
}
