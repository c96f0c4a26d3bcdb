use serde::{Deserialize, Serialize};

use super::WireId;

/// A physical entrance where scans are recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: WireId,
    #[serde(rename = "loc")]
    pub label: String,
}
