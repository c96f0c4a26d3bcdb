//! Core library for the library entry/exit scanner.
//!
//! Staff sign in against a remote gateway, pick a physical location, submit
//! patron card numbers, and review the day's entry/exit log. This crate holds
//! everything below the presentation layer:
//!
//! - `auth`: on-device token storage and the session lifecycle
//! - `api`: the gateway client and its error taxonomy
//! - `models`: wire types for locations, scan results, and log entries
//! - `screens`: framework-free per-view state (loading flags, inline errors)
//! - `config`: endpoint URLs and user preferences

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod screens;

pub use api::{Endpoint, ErrorKind, Gateway, GatewayClient, GatewayError};
pub use auth::{CredentialStore, SessionManager, SessionState, SessionToken};
pub use config::Config;
