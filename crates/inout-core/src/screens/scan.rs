use tracing::{debug, warn};

use super::OpStatus;
use crate::api::{Endpoint, Gateway, GatewayError};
use crate::auth::SessionToken;
use crate::models::{Location, ScanRequest, ScanResult, WireId};

pub const SELECT_LOCATION: &str = "Please select a location.";

/// State behind the scan view: location picker, card input, last outcome.
///
/// `locations` holds the last successful list. A reload that is running or
/// has failed leaves it, and the selection made from it, in place.
#[derive(Debug, Default)]
pub struct ScanScreen {
    locations: Vec<Location>,
    pub locations_status: OpStatus<()>,
    selected: Option<WireId>,
    pub card_id: String,
    pub submission: OpStatus<ScanResult>,
}

impl ScanScreen {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Locations =====

    pub fn location_list(&self) -> &[Location] {
        &self.locations
    }

    /// Returns true when the caller should go ahead and fetch.
    pub fn begin_load_locations<G: Gateway>(&mut self, gateway: &G) -> bool {
        if self.locations_status.is_in_flight() {
            return false;
        }
        if let Err(e) = gateway.ensure_configured(Endpoint::Locations) {
            self.locations_status.fail(e);
            return false;
        }
        self.locations_status.start()
    }

    /// Install a fetched list. The current selection survives only if it is still offered.
    /// A failed fetch keeps the previous list and selection.
    pub fn finish_load_locations(&mut self, result: Result<Vec<Location>, GatewayError>) {
        match result {
            Ok(list) => {
                let still_offered = self
                    .selected
                    .as_ref()
                    .map(|id| list.iter().any(|loc| &loc.id == id))
                    .unwrap_or(false);
                if !still_offered {
                    self.selected = None;
                }
                debug!(count = list.len(), "Location list replaced");
                self.locations = list;
                self.locations_status.settle(Ok(()));
            }
            Err(e) => {
                warn!(error = %e, "Location load failed");
                self.locations_status.fail(e);
            }
        }
    }

    pub async fn load_locations<G: Gateway>(&mut self, gateway: &G) {
        if self.begin_load_locations(gateway) {
            let result = gateway.list_locations().await;
            self.finish_load_locations(result);
        }
    }

    pub fn select_location(&mut self, id: &WireId) -> bool {
        if self.location_list().iter().any(|loc| &loc.id == id) {
            self.selected = Some(id.clone());
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_location(&self) -> Option<&Location> {
        let id = self.selected.as_ref()?;
        self.location_list().iter().find(|loc| &loc.id == id)
    }

    // ===== Submission =====

    pub fn can_submit(&self) -> bool {
        !self.submission.is_in_flight()
    }

    /// Checks run in order: duplicate submission, endpoint configuration, location selected.
    /// A failed check settles the submission locally and nothing is sent.
    pub fn begin_submit<G: Gateway>(&mut self, gateway: &G) -> Option<ScanRequest> {
        if !self.can_submit() {
            return None;
        }
        if let Err(e) = gateway.ensure_configured(Endpoint::Scan) {
            self.submission.fail(e);
            return None;
        }
        let Some(location) = self.selected_location() else {
            self.submission
                .fail(GatewayError::Validation(SELECT_LOCATION.to_string()));
            return None;
        };
        let request = ScanRequest {
            card_number: self.card_id.clone(),
            location_id: location.id.clone(),
        };
        self.submission.start();
        Some(request)
    }

    /// Record the outcome. A recorded scan clears the card input for the next patron.
    pub fn finish_submit(&mut self, result: Result<ScanResult, GatewayError>) {
        match result {
            Ok(scan) => {
                self.card_id.clear();
                self.submission.settle(Ok(scan));
            }
            Err(e) => {
                warn!(error = %e, "Scan failed");
                self.submission.fail(e);
            }
        }
    }

    pub async fn submit<G: Gateway>(&mut self, gateway: &G, token: &SessionToken) {
        if let Some(request) = self.begin_submit(gateway) {
            let result = gateway.submit_scan(token, &request).await;
            self.finish_submit(result);
        }
    }

    pub fn result(&self) -> Option<&ScanResult> {
        self.submission.value()
    }

    /// Inline error text: a submission failure takes precedence over a location failure.
    pub fn error_message(&self) -> Option<String> {
        self.submission
            .error()
            .or_else(|| self.locations_status.error())
            .map(ToString::to_string)
    }
}
