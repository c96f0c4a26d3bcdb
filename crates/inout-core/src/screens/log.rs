use chrono::{DateTime, Utc};
use tracing::warn;

use super::OpStatus;
use crate::api::{Endpoint, Gateway, GatewayError};
use crate::auth::SessionToken;
use crate::models::LogEntry;

pub const NO_ENTRIES: &str = "No entries found for today.";

/// State behind the day's log view.
///
/// `entries` always holds the last successful batch. A successful fetch
/// replaces it wholesale; a failed one leaves it in place next to the error.
#[derive(Debug, Default)]
pub struct LogScreen {
    entries: Vec<LogEntry>,
    pub status: OpStatus<()>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl LogScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Refresh control is disabled while a fetch is outstanding.
    pub fn can_refresh(&self) -> bool {
        !self.status.is_in_flight()
    }

    /// Returns true when the caller should go ahead and fetch.
    pub fn begin_refresh<G: Gateway>(&mut self, gateway: &G) -> bool {
        if !self.can_refresh() {
            return false;
        }
        if let Err(e) = gateway.ensure_configured(Endpoint::Log) {
            self.status.fail(e);
            return false;
        }
        self.status.start()
    }

    pub fn finish_refresh(&mut self, result: Result<Vec<LogEntry>, GatewayError>) {
        match result {
            Ok(entries) => {
                self.entries = entries;
                self.refreshed_at = Some(Utc::now());
                self.status.settle(Ok(()));
            }
            Err(e) => {
                warn!(error = %e, "Log refresh failed");
                self.status.fail(e);
            }
        }
    }

    pub async fn refresh<G: Gateway>(&mut self, gateway: &G, token: &SessionToken) {
        if self.begin_refresh(gateway) {
            let result = gateway.list_entries(token).await;
            self.finish_refresh(result);
        }
    }

    /// The "nothing today" message shows only after a successful fetch of zero rows.
    pub fn show_empty_state(&self) -> bool {
        self.status.is_settled_ok() && self.entries.is_empty()
    }

    /// Spinner shows only while fetching with nothing on screen yet.
    pub fn show_spinner(&self) -> bool {
        self.status.is_in_flight() && self.entries.is_empty()
    }

    pub fn error_message(&self) -> Option<String> {
        self.status.error().map(ToString::to_string)
    }

    pub fn inside_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.has_exited()).count()
    }

    pub fn refreshed_display(&self) -> String {
        match self.refreshed_at {
            Some(at) => age_display(at, Utc::now()),
            None => "never".to_string(),
        }
    }
}

/// Compact relative age, e.g. "just now", "5m ago", "2h ago", "3d ago".
pub fn age_display(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - since).num_minutes();
    if minutes < 1 {
        // Clock skew lands here too
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        // 1d 12h and up rounds to 2d
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}
