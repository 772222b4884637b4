use crate::error::SubmitError;
use crate::forms::validate::{self, ValidationErrors};
use crate::store::{collections, DocumentKeys, RecordStore};
use actix_web::{web, HttpResponse, Responder};
use chrono::{NaiveDate, SecondsFormat, Utc};
use common::model::record::RecordStatus;
use common::requests::{LeaveRequest, SubmitAccepted};
use log::info;
use serde_json::json;

/// Handler for `POST /api/leaves`.
///
/// Returns `201` with the generated identifier, `400` with the collected
/// field errors, `409` on an approved-range overlap, or `503` when the
/// store is unreachable.
pub async fn process(
    store: web::Data<RecordStore>,
    payload: web::Json<LeaveRequest>,
) -> impl Responder {
    match submit_leave(&store, payload.into_inner()) {
        Ok(id) => {
            HttpResponse::Created().json(SubmitAccepted::new(id, "Leave submitted successfully!"))
        }
        Err(e) => e.into_response("submit leave"),
    }
}

fn submit_leave(store: &RecordStore, request: LeaveRequest) -> Result<String, SubmitError> {
    store.ping()?;

    let (errors, dates, hours) = validate_leave(&request);
    if !errors.is_empty() {
        return Err(SubmitError::Validation(errors));
    }
    let (from, to) = dates.ok_or_else(|| {
        SubmitError::Internal("leave validation passed without a date range".to_string())
    })?;
    let (from_hour, to_hour) = hours;

    let emp_id = request.emp_id.trim().to_string();
    if store.has_approved_overlap(collections::LEAVES, &emp_id, from, to)? {
        return Err(SubmitError::Conflict(
            "Leave request overlaps with an existing approved leave.".to_string(),
        ));
    }

    let submitted_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let body = json!({
        "name": request.name.trim(),
        "empId": emp_id,
        "email": request.email.trim().to_lowercase(),
        "leaveType": request.leave_type,
        "fromDate": from.to_string(),
        "toDate": to.to_string(),
        "fromHour": from_hour,
        "toHour": to_hour,
        "reason": request.reason.trim(),
        "status": RecordStatus::Pending.as_str(),
        "submittedAt": submitted_at,
    });
    let keys = DocumentKeys {
        subject_id: Some(emp_id.clone()),
        from_date: Some(from),
        to_date: Some(to),
        ..DocumentKeys::default()
    };
    let id = store.insert(
        collections::LEAVES,
        RecordStatus::Pending,
        &submitted_at,
        &keys,
        &body,
    )?;
    info!("Inserted leave request {} for {}", id, emp_id);
    Ok(id)
}

type Hours = (Option<String>, Option<String>);

/// Applies every field rule, collecting all failures instead of stopping at
/// the first. Hours only apply to single-day requests and are dropped
/// otherwise.
fn validate_leave(
    request: &LeaveRequest,
) -> (ValidationErrors, Option<(NaiveDate, NaiveDate)>, Hours) {
    let mut errors = ValidationErrors::new();

    let required = [
        ("name", request.name.as_str(), "Name"),
        ("empId", request.emp_id.as_str(), "Employee ID"),
        ("email", request.email.as_str(), "Email"),
        ("leaveType", request.leave_type.as_str(), "Leave type"),
        ("fromDate", request.from_date.as_str(), "From date"),
        ("toDate", request.to_date.as_str(), "To date"),
        ("reason", request.reason.as_str(), "Reason"),
    ];
    for (field, value, label) in required {
        if value.trim().is_empty() {
            errors.add(field, format!("{} is required.", label));
        }
    }

    let name = request.name.trim();
    if !name.is_empty() && !(3..=50).contains(&name.chars().count()) {
        errors.add("name", "Name must be 3-50 characters.");
    }
    let emp_id = request.emp_id.trim();
    if !emp_id.is_empty() && !validate::valid_employee_id(emp_id) {
        errors.add(
            "empId",
            "Employee ID format: 3 Caps, '0', 3 digits (e.g., ABC0123).",
        );
    }
    let email = request.email.trim();
    if !email.is_empty() && !validate::valid_email(email) {
        errors.add("email", "Invalid email format.");
    }
    let reason = request.reason.trim();
    if !reason.is_empty() && !(5..=100).contains(&reason.chars().count()) {
        errors.add("reason", "Reason must be 5-100 characters.");
    }

    let from = match request.from_date.trim() {
        "" => None,
        raw => {
            let parsed = validate::parse_date(raw);
            if parsed.is_none() {
                errors.add("fromDate", "Invalid From Date.");
            }
            parsed
        }
    };
    let to = match request.to_date.trim() {
        "" => None,
        raw => {
            let parsed = validate::parse_date(raw);
            if parsed.is_none() {
                errors.add("toDate", "Invalid To Date.");
            }
            parsed
        }
    };
    let dates = match (from, to) {
        (Some(from), Some(to)) if to < from => {
            errors.add("toDate", "To Date cannot be before From Date.");
            None
        }
        (Some(from), Some(to)) => Some((from, to)),
        _ => None,
    };

    // Hour bounds only make sense for a single-day request.
    let mut hours: Hours = (None, None);
    if let Some((from, to)) = dates {
        if from == to {
            let from_hour = request.from_hour.as_deref().unwrap_or("");
            let to_hour = request.to_hour.as_deref().unwrap_or("");
            if !from_hour.is_empty() && !to_hour.is_empty() {
                match (validate::parse_hour(from_hour), validate::parse_hour(to_hour)) {
                    (Some(t1), Some(t2)) => {
                        if t1 >= t2 {
                            errors.add("fromHour", "From Hour must be before To Hour.");
                        } else if (t2 - t1).num_minutes() < 30 {
                            errors.add("toHour", "Minimum duration is 30 minutes.");
                        } else {
                            hours = (
                                Some(from_hour.to_string()),
                                Some(to_hour.to_string()),
                            );
                        }
                    }
                    (t1, t2) => {
                        if t1.is_none() {
                            errors.add("fromHour", "Invalid time format.");
                        }
                        if t2.is_none() {
                            errors.add("toHour", "Invalid time format.");
                        }
                    }
                }
            }
        }
    }

    let dates = if errors.is_empty() { dates } else { None };
    (errors, dates, hours)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> LeaveRequest {
        LeaveRequest {
            name: "Jane Doe".to_string(),
            emp_id: "ABC0123".to_string(),
            email: "jane@example.com".to_string(),
            leave_type: "Casual".to_string(),
            from_date: "2025-04-24".to_string(),
            to_date: "2025-04-24".to_string(),
            from_hour: None,
            to_hour: None,
            reason: "Family function".to_string(),
        }
    }

    #[test]
    fn valid_request_passes() {
        let (errors, dates, _) = validate_leave(&valid_request());
        assert!(errors.is_empty());
        assert!(dates.is_some());
    }

    #[test]
    fn every_failure_is_collected_not_just_the_first() {
        let (errors, dates, _) = validate_leave(&LeaveRequest::default());
        assert!(dates.is_none());
        for field in ["name", "empId", "email", "leaveType", "fromDate", "toDate", "reason"] {
            assert!(errors.contains(field), "missing error for {}", field);
        }
    }

    #[test]
    fn reversed_range_is_rejected() {
        let mut request = valid_request();
        request.from_date = "2025-04-25".to_string();
        request.to_date = "2025-04-24".to_string();
        let (errors, dates, _) = validate_leave(&request);
        assert!(errors.contains("toDate"));
        assert!(dates.is_none());
    }

    #[test]
    fn single_day_hours_need_half_an_hour() {
        let mut request = valid_request();
        request.from_hour = Some("10:00".to_string());
        request.to_hour = Some("10:15".to_string());
        let (errors, _, hours) = validate_leave(&request);
        assert!(errors.contains("toHour"));
        assert_eq!(hours, (None, None));

        request.to_hour = Some("10:45".to_string());
        let (errors, _, hours) = validate_leave(&request);
        assert!(errors.is_empty());
        assert_eq!(
            hours,
            (Some("10:00".to_string()), Some("10:45".to_string()))
        );
    }

    #[test]
    fn hours_are_dropped_for_multi_day_requests() {
        let mut request = valid_request();
        request.to_date = "2025-04-26".to_string();
        request.from_hour = Some("10:00".to_string());
        request.to_hour = Some("09:00".to_string()); // would be invalid for one day
        let (errors, dates, hours) = validate_leave(&request);
        assert!(errors.is_empty());
        assert!(dates.is_some());
        assert_eq!(hours, (None, None));
    }
}
