use crate::config::Config;
use crate::error::SubmitError;
use crate::forms::files::FileStore;
use crate::forms::multipart::{read_form, ReadFormError};
use crate::forms::parser::{parse_submission, RawForm};
use crate::forms::validate::{self, ValidationErrors};
use crate::store::{collections, DocumentKeys, RecordStore};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use chrono::{Datelike, SecondsFormat, Utc};
use common::model::form::{FormValue, ParsedSubmission};
use common::model::record::RecordStatus;
use common::requests::{ErrorBody, SubmitAccepted};
use log::{info, warn};

/// Text fields every application must carry.
const REQUIRED_FIELDS: &[(&str, &str)] = &[
    ("fullName", "Full name"),
    ("email", "Email"),
    ("mobileNumber", "Mobile number"),
    ("department", "Department"),
    ("jobRole", "Job role"),
    ("expectedSalary", "Expected salary"),
];

/// Certificates that must resolve to a stored file. `Additionalfiles`
/// deliberately stays optional.
const REQUIRED_FILES: &[(&str, &str)] = &[
    ("sscDoc", "SSC certificate"),
    ("intermediateDoc", "Intermediate certificate"),
    ("graduationDoc", "Graduation certificate"),
];

/// Handler for `POST /api/applications/submit`.
pub async fn process(
    config: web::Data<Config>,
    store: web::Data<RecordStore>,
    files: web::Data<FileStore>,
    payload: Multipart,
) -> impl Responder {
    let (form, uploads) = match read_form(payload, config.max_payload_bytes).await {
        Ok(parts) => parts,
        Err(e @ ReadFormError::TooLarge(_)) => {
            warn!("submit application: {}", e);
            return HttpResponse::PayloadTooLarge()
                .json(ErrorBody::new("Uploaded data exceeds the size limit."));
        }
        Err(e) => {
            warn!("submit application: unreadable multipart payload: {}", e);
            return HttpResponse::BadRequest()
                .json(ErrorBody::new("Could not read the submitted form data."));
        }
    };
    match submit_application(&store, &files, form, uploads) {
        Ok(id) => HttpResponse::Created().json(SubmitAccepted::new(
            id,
            "Application submitted successfully!",
        )),
        Err(e) => e.into_response("submit application"),
    }
}

fn submit_application(
    store: &RecordStore,
    files: &FileStore,
    form: RawForm,
    uploads: Vec<crate::forms::parser::UploadedFile>,
) -> Result<String, SubmitError> {
    store.ping()?;

    let outcome = parse_submission(&form, uploads, files);
    let mut tree = outcome.tree;

    let mut errors = ValidationErrors::new();
    errors.merge(outcome.file_errors);
    validate_fields(&tree, &mut errors);
    for (field, label) in REQUIRED_FILES {
        if !tree.get(*field).is_some_and(FormValue::is_file) {
            errors.add(*field, format!("{} is required.", label));
        }
    }
    if !errors.is_empty() {
        return Err(SubmitError::Validation(errors));
    }

    let email = normalized_email(&tree).ok_or_else(|| {
        SubmitError::Internal("application validation passed without an email".to_string())
    })?;

    // Friendly pre-check; the unique index remains the authority for the
    // race window between this check and the insert.
    if store
        .find_id_by_email(collections::JOB_APPLICATIONS, &email)?
        .is_some()
    {
        return Err(SubmitError::Conflict(format!(
            "An application with the email address '{}' already exists.",
            email
        )));
    }

    tree.insert("email".to_string(), FormValue::Text(email.clone()));
    let submitted_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let mut body = serde_json::to_value(&tree)
        .map_err(|e| SubmitError::Internal(format!("could not serialize submission: {}", e)))?;
    if let serde_json::Value::Object(ref mut map) = body {
        map.insert(
            "status".to_string(),
            RecordStatus::Pending.as_str().into(),
        );
        map.insert("submittedAt".to_string(), submitted_at.clone().into());
    }

    let keys = DocumentKeys {
        email: Some(email.clone()),
        ..DocumentKeys::default()
    };
    let id = store.insert(
        collections::JOB_APPLICATIONS,
        RecordStatus::Pending,
        &submitted_at,
        &keys,
        &body,
    )?;
    info!("Inserted application {} for '{}'", id, email);
    Ok(id)
}

fn validate_fields(tree: &ParsedSubmission, errors: &mut ValidationErrors) {
    for (field, label) in REQUIRED_FIELDS {
        let missing = tree
            .get(*field)
            .and_then(FormValue::as_text)
            .map(|v| v.trim().is_empty())
            .unwrap_or(true);
        if missing {
            errors.add(*field, format!("{} is required.", label));
        }
    }

    if let Some(email) = tree.get("email").and_then(FormValue::as_text) {
        let email = email.trim();
        if !email.is_empty() && !validate::valid_email(email) {
            errors.add("email", "Invalid email format.");
        }
    }
    if let Some(salary) = tree.get("expectedSalary").and_then(FormValue::as_text) {
        let salary = salary.trim();
        if !salary.is_empty() {
            match salary.parse::<f64>() {
                Ok(amount) if amount > 0.0 => {}
                _ => errors.add("expectedSalary", "Expected salary must be a positive number."),
            }
        }
    }
    if let Some(year) = tree.get("graduationYear").and_then(FormValue::as_text) {
        let year = year.trim();
        if !year.is_empty() {
            let current = Utc::now().year();
            match year.parse::<i32>() {
                Ok(value) if (1950..=current).contains(&value) => {}
                _ => errors.add(
                    "graduationYear",
                    format!("Graduation year must be between 1950 and {}.", current),
                ),
            }
        }
    }
}

fn normalized_email(tree: &ParsedSubmission) -> Option<String> {
    tree.get("email")
        .and_then(FormValue::as_text)
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}
