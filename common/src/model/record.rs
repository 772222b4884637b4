use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Workflow status carried by every persisted record.
///
/// Records are created as `Pending`; the variants that support a review
/// workflow later move them to `Approved` or `Rejected`. Records are never
/// deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    Pending,
    Approved,
    Rejected,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "Pending",
            RecordStatus::Approved => "Approved",
            RecordStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(RecordStatus::Pending),
            "Approved" => Ok(RecordStatus::Approved),
            "Rejected" => Ok(RecordStatus::Rejected),
            _ => Err(()),
        }
    }
}
