//! Normalization of gateway response bodies into typed results.
//!
//! Every gateway function answers with a JSON object carrying a boolean
//! `success` flag. On failure the object may hold `message` or `error`, and
//! the login function may additionally relay a wrapped backend's raw fatal
//! error in `php_error_body`. These functions are pure so they can be tested
//! against literal payloads.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use super::GatewayError;
use crate::auth::SessionToken;
use crate::models::{Location, LogEntry, ScanResult};

pub const UNKNOWN_LOGIN_ERROR: &str = "An unknown error occurred.";
pub const LOCATIONS_FAILED: &str = "Failed to load locations.";
pub const SCAN_FAILED: &str = "Scan failed.";
pub const ENTRIES_FAILED: &str = "Failed to load entries.";

fn parse_body(body: &str) -> Result<Value, GatewayError> {
    serde_json::from_str(body)
        .map_err(|_| GatewayError::invalid_response("response is not JSON", body))
}

fn is_success(value: &Value) -> bool {
    value.get("success").and_then(Value::as_bool).unwrap_or(false)
}

/// A non-empty string field, ignoring fields of any other type.
fn string_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn failure_message(value: &Value, fallback: &str) -> String {
    string_field(value, "message")
        .or_else(|| string_field(value, "error"))
        .unwrap_or(fallback)
        .to_string()
}

fn payload<T: DeserializeOwned>(value: &Value, key: &str, body: &str) -> Result<T, GatewayError> {
    let field = value
        .get(key)
        .ok_or_else(|| GatewayError::invalid_response(&format!("missing `{}`", key), body))?;
    serde_json::from_value(field.clone()).map_err(|e| {
        GatewayError::invalid_response(&format!("malformed `{}`: {}", key, e), body)
    })
}

/// Login succeeds only with an HTTP success status, `success: true`, and an
/// issued `api_key`. Anything else is reported with the upstream fatal text
/// first, then the gateway's own message, then a generic fallback.
pub fn parse_login(http_success: bool, body: &str) -> Result<SessionToken, GatewayError> {
    let value = parse_body(body)?;

    if http_success && is_success(&value) {
        if let Some(token) = string_field(&value, "api_key") {
            return Ok(SessionToken::new(token));
        }
    }

    if let Some(fatal) = string_field(&value, "php_error_body") {
        return Err(GatewayError::UpstreamFatal(fatal.to_string()));
    }

    Err(GatewayError::Application(failure_message(
        &value,
        UNKNOWN_LOGIN_ERROR,
    )))
}

pub fn parse_locations(body: &str) -> Result<Vec<Location>, GatewayError> {
    let value = parse_body(body)?;
    if !is_success(&value) {
        return Err(GatewayError::Application(failure_message(
            &value,
            LOCATIONS_FAILED,
        )));
    }
    payload(&value, "data", body)
}

/// A successful scan response is itself the result; its fields sit next to `success`.
pub fn parse_scan(body: &str) -> Result<ScanResult, GatewayError> {
    let value = parse_body(body)?;
    if !is_success(&value) {
        return Err(GatewayError::Application(failure_message(&value, SCAN_FAILED)));
    }
    serde_json::from_value(value)
        .map_err(|e| GatewayError::invalid_response(&format!("malformed scan result: {}", e), body))
}

pub fn parse_entries(body: &str) -> Result<Vec<LogEntry>, GatewayError> {
    let value = parse_body(body)?;
    if !is_success(&value) {
        return Err(GatewayError::Application(failure_message(
            &value,
            ENTRIES_FAILED,
        )));
    }

    let entries: Vec<LogEntry> = payload(&value, "data", body)?;

    let mut seen = HashSet::new();
    for entry in &entries {
        if !seen.insert(&entry.sequence_id) {
            warn!(sequence_id = %entry.sequence_id, "Duplicate log entry id in batch");
        }
    }

    Ok(entries)
}
