use crate::error::SubmitError;
use crate::forms::validate::{self, ValidationErrors};
use crate::store::{collections, DocumentKeys, RecordStore};
use actix_web::{web, HttpResponse, Responder};
use chrono::{Datelike, NaiveDate, SecondsFormat, Utc};
use common::model::record::RecordStatus;
use common::requests::{PayslipRequest, SubmitAccepted};
use log::info;
use serde_json::json;

/// Earliest month a payslip can be requested for.
const MIN_YEAR: i32 = 2022;

/// Handler for `POST /api/payslips`.
pub async fn process(
    store: web::Data<RecordStore>,
    payload: web::Json<PayslipRequest>,
) -> impl Responder {
    match submit_payslip(&store, payload.into_inner()) {
        Ok(id) => HttpResponse::Created().json(SubmitAccepted::new(
            id,
            "Payslip request submitted successfully!",
        )),
        Err(e) => e.into_response("submit payslip"),
    }
}

fn submit_payslip(store: &RecordStore, request: PayslipRequest) -> Result<String, SubmitError> {
    store.ping()?;

    let (errors, months) = validate_payslip(&request);
    if !errors.is_empty() {
        return Err(SubmitError::Validation(errors));
    }
    let (start, end) = months.ok_or_else(|| {
        SubmitError::Internal("payslip validation passed without a start month".to_string())
    })?;

    let pay_period = match end {
        Some(end) => format!("{} - {}", start.format("%b %Y"), end.format("%b %Y")),
        None => start.format("%b %Y").to_string(),
    };

    let employee_id = request.employee_id.trim().to_string();
    let submitted_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    // The password was checked above and is deliberately absent here.
    let body = json!({
        "employeeName": request.employee_name.trim(),
        "employeeId": employee_id,
        "email": request.email.trim().to_lowercase(),
        "startMonth": request.start_month.trim(),
        "endMonth": match request.end_month.trim() {
            "" => serde_json::Value::Null,
            raw => serde_json::Value::String(raw.to_string()),
        },
        "calculatedPayPeriod": pay_period,
        "status": RecordStatus::Pending.as_str(),
        "submittedAt": submitted_at,
    });
    let keys = DocumentKeys {
        subject_id: Some(employee_id.clone()),
        from_date: Some(start),
        to_date: end.or(Some(start)),
        ..DocumentKeys::default()
    };
    let id = store.insert(
        collections::PAYSLIPS,
        RecordStatus::Pending,
        &submitted_at,
        &keys,
        &body,
    )?;
    info!("Inserted payslip request {} for {}", id, employee_id);
    Ok(id)
}

type Months = Option<(NaiveDate, Option<NaiveDate>)>;

/// Validates identity fields and the month range, collecting every failure.
/// The end month is optional; when present it must come after the start.
fn validate_payslip(request: &PayslipRequest) -> (ValidationErrors, Months) {
    let mut errors = ValidationErrors::new();

    let name = request.employee_name.trim();
    if name.is_empty() || !validate::valid_full_name(name) {
        errors.add(
            "employeeName",
            "Invalid Employee Name format. Check spacing and allowed characters.",
        );
    }
    let employee_id = request.employee_id.trim();
    if employee_id.is_empty() || !validate::valid_employee_id(employee_id) {
        errors.add(
            "employeeId",
            "Invalid Employee ID format (e.g., ABC0123: 3 capital letters, '0', then 001-999).",
        );
    }
    let email = request.email.trim();
    if email.is_empty() || !validate::valid_email(email) {
        errors.add("email", "Invalid Email Address format.");
    }
    if !validate::valid_password(&request.password) {
        errors.add(
            "password",
            "Password must be at least 5 characters and include 1 letter, 1 number, and 1 symbol.",
        );
    }

    let current_month_start = current_month_start();

    let start = match validate::parse_month(request.start_month.trim()) {
        Ok(start) => {
            if start > current_month_start {
                errors.add("startMonth", "Start month cannot be in the future.");
            }
            if start.year() < MIN_YEAR {
                errors.add(
                    "startMonth",
                    format!("Start month must be from January {} onwards.", MIN_YEAR),
                );
            }
            Some(start)
        }
        Err(detail) => {
            errors.add("startMonth", format!("Invalid start month: {}", detail));
            None
        }
    };

    let end = match request.end_month.trim() {
        "" => None,
        raw => match validate::parse_month(raw) {
            Ok(end) => {
                if end > current_month_start {
                    errors.add("endMonth", "End month cannot be in the future.");
                }
                if end.year() < MIN_YEAR {
                    errors.add(
                        "endMonth",
                        format!("End month must be from January {} onwards.", MIN_YEAR),
                    );
                }
                if let Some(start) = start {
                    if end <= start {
                        errors.add("endMonth", "End month must be after the start month.");
                    }
                }
                Some(end)
            }
            Err(detail) => {
                errors.add("endMonth", format!("Invalid end month: {}", detail));
                None
            }
        },
    };

    if errors.is_empty() {
        (errors, start.map(|s| (s, end)))
    } else {
        (errors, None)
    }
}

fn current_month_start() -> NaiveDate {
    let today = Utc::now().date_naive();
    today.with_day(1).unwrap_or(today)
}
