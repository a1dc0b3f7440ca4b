//! Output state snapshots as reported by the host automation controller.

use serde::{Deserialize, Serialize};

/// State of a single output. `status` is `1` for on, anything else is off.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputStatus {
    pub id: i64,
    pub status: i64,
}

impl OutputStatus {
    pub const fn is_on(&self) -> bool {
        self.status == 1
    }
}

/// One poll's worth of output states.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputSnapshot {
    pub status: Vec<OutputStatus>,
}

impl OutputSnapshot {
    /// Parse a controller payload.
    ///
    /// Returns `Ok(None)` when the payload has no `status` key, which callers
    /// treat as "no data this tick".
    pub fn from_value(value: serde_json::Value) -> Result<Option<Self>, serde_json::Error> {
        if value.get("status").is_none() {
            return Ok(None);
        }
        serde_json::from_value(value).map(Some)
    }

    /// First entry for `output_id`, if the controller reported it.
    pub fn find(&self, output_id: i64) -> Option<&OutputStatus> {
        self.status.iter().find(|o| o.id == output_id)
    }
}
