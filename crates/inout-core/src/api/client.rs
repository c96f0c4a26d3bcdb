//! HTTP client for the scanning gateway.
//!
//! This module provides the `GatewayClient` struct, which performs the four
//! gateway calls and hands the raw bodies to [`super::response`] for
//! normalization.

use anyhow::Result;
use reqwest::{header, Client, RequestBuilder};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::auth::SessionToken;
use crate::config::Endpoints;
use crate::models::{Location, LogEntry, ScanRequest, ScanResult};

use super::response;
use super::{Endpoint, Gateway, GatewayError};

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

/// Gateway client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct GatewayClient {
    client: Client,
    endpoints: Endpoints,
}

impl GatewayClient {
    /// Create a new client. No request timeout is set beyond the transport default.
    pub fn new(endpoints: Endpoints) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("inout-scanner/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let unconfigured = endpoints.unconfigured();
        if !unconfigured.is_empty() {
            warn!(?unconfigured, "Gateway endpoints still contain the placeholder URL");
        }

        Ok(Self { client, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn url(&self, endpoint: Endpoint) -> Result<&str, GatewayError> {
        self.ensure_configured(endpoint)?;
        Ok(self.endpoints.url(endpoint))
    }

    fn auth_headers(token: &SessionToken) -> Result<header::HeaderMap, GatewayError> {
        let mut headers = header::HeaderMap::new();
        let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token.expose()))
            .map_err(|_| {
                GatewayError::Validation(
                    "Stored session token cannot be sent. Please log out and sign in again."
                        .to_string(),
                )
            })?;
        value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, value);
        Ok(headers)
    }

    /// Send the request and read the whole body. Any transport failure is a network error.
    async fn send(endpoint: Endpoint, request: RequestBuilder) -> Result<(bool, String), GatewayError> {
        let response = request.send().await.map_err(|e| {
            warn!(endpoint = %endpoint, error = %e, "Gateway request failed");
            GatewayError::from(e)
        })?;

        let status = response.status();
        let body = response.text().await?;
        debug!(endpoint = %endpoint, status = %status, bytes = body.len(), "Gateway response received");

        Ok((status.is_success(), body))
    }
}

impl Gateway for GatewayClient {
    fn ensure_configured(&self, endpoint: Endpoint) -> Result<(), GatewayError> {
        if self.endpoints.is_configured(endpoint) {
            Ok(())
        } else {
            Err(GatewayError::NotConfigured(endpoint))
        }
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<SessionToken, GatewayError> {
        let url = self.url(Endpoint::Login)?;

        let request = self
            .client
            .post(url)
            .json(&Credentials { username, password });

        let (ok, body) = Self::send(Endpoint::Login, request).await?;
        let token = response::parse_login(ok, &body)?;

        info!(username = username, "Authenticated with gateway");
        Ok(token)
    }

    async fn list_locations(&self) -> Result<Vec<Location>, GatewayError> {
        let url = self.url(Endpoint::Locations)?;

        let (_, body) = Self::send(Endpoint::Locations, self.client.get(url)).await?;
        let locations = response::parse_locations(&body)?;

        debug!(count = locations.len(), "Locations loaded");
        Ok(locations)
    }

    async fn submit_scan(&self, token: &SessionToken, request: &ScanRequest) -> Result<ScanResult, GatewayError> {
        let url = self.url(Endpoint::Scan)?;

        let builder = self
            .client
            .post(url)
            .headers(Self::auth_headers(token)?)
            .json(request);

        let (_, body) = Self::send(Endpoint::Scan, builder).await?;
        let result = response::parse_scan(&body)?;

        info!(location = %request.location_id, status = %result.status, "Scan recorded");
        Ok(result)
    }

    async fn list_entries(&self, token: &SessionToken) -> Result<Vec<LogEntry>, GatewayError> {
        let url = self.url(Endpoint::Log)?;

        let builder = self.client.get(url).headers(Self::auth_headers(token)?);

        let (_, body) = Self::send(Endpoint::Log, builder).await?;
        let entries = response::parse_entries(&body)?;

        debug!(count = entries.len(), "Log entries loaded");
        Ok(entries)
    }
}
