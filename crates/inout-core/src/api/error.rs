use thiserror::Error;

use super::Endpoint;

/// Coarse failure class, used to decide how a failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Endpoint not provisioned yet; nothing was sent.
    Configuration,
    /// No response at all.
    Network,
    /// A response arrived but the gateway reported failure or sent something unusable.
    Application,
    /// A required local input was missing; nothing was sent.
    Validation,
}

/// Failure of a gateway operation. `Display` is the text shown to staff.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{0} URL is not configured. Set it in config.json or the environment.")]
    NotConfigured(Endpoint),

    #[error("A network error occurred: {0}")]
    Network(String),

    /// Raw fatal-error text from the backend the gateway wraps.
    #[error("{0}")]
    UpstreamFatal(String),

    #[error("{0}")]
    Application(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Validation(String),
}

/// Maximum length for response bodies embedded in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::NotConfigured(_) => ErrorKind::Configuration,
            GatewayError::Network(_) => ErrorKind::Network,
            GatewayError::UpstreamFatal(_)
            | GatewayError::Application(_)
            | GatewayError::InvalidResponse(_) => ErrorKind::Application,
            GatewayError::Validation(_) => ErrorKind::Validation,
        }
    }

    /// Truncate a response body to avoid surfacing excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn invalid_response(reason: &str, body: &str) -> Self {
        GatewayError::InvalidResponse(format!("{} ({})", reason, Self::truncate_body(body)))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Network(err.to_string())
    }
}
