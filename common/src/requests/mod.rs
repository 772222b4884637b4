use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Request payload for the leave submission endpoint.
///
/// Every field defaults to empty so that missing keys surface as per-field
/// validation errors instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeaveRequest {
    pub name: String,
    pub emp_id: String,
    pub email: String,
    pub leave_type: String,
    pub from_date: String,
    pub to_date: String,
    pub from_hour: Option<String>,
    pub to_hour: Option<String>,
    pub reason: String,
}

/// Request payload for the payslip generation endpoint.
///
/// The password is validated but never persisted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PayslipRequest {
    pub employee_name: String,
    pub employee_id: String,
    pub email: String,
    pub password: String,
    pub start_month: String,
    pub end_month: String,
}

/// Request payload for the status update endpoint (approve/reject workflow).
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// Success envelope returned when a submission was persisted.
#[derive(Debug, Serialize)]
pub struct SubmitAccepted {
    pub success: bool,
    /// The database-generated identifier of the new record.
    pub id: String,
    pub message: String,
}

impl SubmitAccepted {
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        SubmitAccepted {
            success: true,
            id: id.into(),
            message: message.into(),
        }
    }
}

/// Error envelope shared by every failure class.
///
/// `details` carries the field-to-message map for validation failures and is
/// omitted for conflict, unavailable and internal errors.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorBody {
            success: false,
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: BTreeMap<String, String>) -> Self {
        ErrorBody {
            success: false,
            error: error.into(),
            details: Some(details),
        }
    }
}
