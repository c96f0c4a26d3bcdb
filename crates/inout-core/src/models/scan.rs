use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::WireId;

/// Label shown when the gateway could not resolve a card to a patron name.
pub const UNKNOWN_PATRON: &str = "Unknown Patron";

/// Shown in place of a patron photo when the gateway sends none.
pub const PLACEHOLDER_IMAGE_URI: &str = "https://placehold.co/128x128/e0e0e0/757575?text=?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresenceStatus {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PresenceStatus::In => write!(f, "IN"),
            PresenceStatus::Out => write!(f, "OUT"),
        }
    }
}

/// Body of the create-entry call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanRequest {
    #[serde(rename = "cardnumber")]
    pub card_number: String,
    pub location_id: WireId,
}

/// Outcome of one card submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub status: PresenceStatus,
    #[serde(rename = "name", default)]
    pub patron_name: Option<String>,
    #[serde(rename = "time")]
    pub timestamp: String,
    #[serde(default)]
    pub message: String,
    /// Base64 encoded patron photo
    #[serde(rename = "image", default)]
    pub image_data: Option<String>,
}

impl ScanResult {
    pub fn display_name(&self) -> &str {
        self.patron_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_PATRON)
    }

    fn image_payload(&self) -> Option<&str> {
        self.image_data
            .as_deref()
            .map(str::trim)
            .filter(|data| !data.is_empty())
    }

    pub fn has_image(&self) -> bool {
        self.image_payload().is_some()
    }

    /// Photo as a data URI, or the placeholder when no photo was sent.
    pub fn image_uri(&self) -> String {
        match self.image_payload() {
            Some(data) => format!("data:image/png;base64,{}", data),
            None => PLACEHOLDER_IMAGE_URI.to_string(),
        }
    }

    /// Decoded photo bytes. `None` when absent, `Err` when the payload is not valid base64.
    pub fn image_bytes(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        self.image_payload().map(|data| STANDARD.decode(data))
    }
}
