use serde::{Deserialize, Serialize};

use super::{deserialize_time_or_sentinel, not_exited, PresenceStatus, WireId};

/// Exit time the gateway reports for patrons still inside.
pub const NOT_EXITED: &str = "00:00:00";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "sl")]
    pub sequence_id: WireId,
    #[serde(rename = "name")]
    pub patron_name: String,
    #[serde(rename = "loc")]
    pub location: String,
    #[serde(rename = "entry")]
    pub entry_time: String,
    #[serde(rename = "exit", default = "not_exited", deserialize_with = "deserialize_time_or_sentinel")]
    pub exit_time: String,
    pub status: PresenceStatus,
}

impl LogEntry {
    pub fn has_exited(&self) -> bool {
        self.exit_time != NOT_EXITED
    }

    pub fn exit_display(&self) -> &str {
        if self.has_exited() {
            &self.exit_time
        } else {
            "N/A"
        }
    }
}
