use crate::config::Config;
use crate::error::SubmitError;
use crate::forms::files::FileStore;
use crate::forms::multipart::{read_form, ReadFormError};
use crate::forms::parser::{parse_submission, RawForm, UploadedFile};
use crate::forms::validate::{self, ValidationErrors};
use crate::store::{collections, DocumentKeys, RecordStore};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use chrono::{SecondsFormat, Utc};
use common::model::form::{FormValue, ParsedSubmission};
use common::model::record::RecordStatus;
use common::requests::{ErrorBody, SubmitAccepted};
use log::{info, warn};
use std::collections::BTreeMap;

/// Top-level uploads every onboarding submission must carry.
const REQUIRED_FILES: &[(&str, &str)] = &[
    ("idProof", "ID proof"),
    ("resume", "Resume"),
    ("signedDocument", "Signed agreement"),
];

/// Checkbox fields coerced to booleans before persistence. An HTML checkbox
/// submits its key only when checked.
const CHECKBOX_FIELDS: &[&str] = &[
    "sameAsPermanent",
    "hasExperience",
    "hasInsurance",
    "agreeTerms",
    "agreePrivacy",
];

/// Marker key in the raw form data per education sub-section; its presence
/// means the section was filled in and its certificate becomes required.
const EDUCATION_MARKERS: &[(&str, &str, &str)] = &[
    ("ssc", "education[ssc][school]", "Education certificate (SSC)"),
    ("inter", "education[inter][college]", "Education certificate (Inter/Diploma)"),
    ("grad", "education[grad][college]", "Education certificate (Graduation)"),
];

/// Handler for `POST /api/onboarding/submit`.
pub async fn process(
    config: web::Data<Config>,
    store: web::Data<RecordStore>,
    files: web::Data<FileStore>,
    payload: Multipart,
) -> impl Responder {
    let (form, uploads) = match read_form(payload, config.max_payload_bytes).await {
        Ok(parts) => parts,
        Err(e @ ReadFormError::TooLarge(_)) => {
            warn!("submit onboarding: {}", e);
            return HttpResponse::PayloadTooLarge()
                .json(ErrorBody::new("Uploaded data exceeds the size limit."));
        }
        Err(e) => {
            warn!("submit onboarding: unreadable multipart payload: {}", e);
            return HttpResponse::BadRequest()
                .json(ErrorBody::new("Could not read the multipart payload."));
        }
    };
    match submit_onboarding(&store, &files, form, uploads) {
        Ok(id) => {
            HttpResponse::Ok().json(SubmitAccepted::new(id, "Form submitted successfully!"))
        }
        Err(e) => e.into_response("submit onboarding"),
    }
}

fn submit_onboarding(
    store: &RecordStore,
    files: &FileStore,
    form: RawForm,
    uploads: Vec<UploadedFile>,
) -> Result<String, SubmitError> {
    store.ping()?;

    let outcome = parse_submission(&form, uploads, files);
    let mut tree = outcome.tree;

    let mut errors = ValidationErrors::new();
    errors.merge(outcome.file_errors);
    errors.merge(format_errors(&tree));
    errors.merge(required_file_errors(&form, &tree));
    if !errors.is_empty() {
        return Err(SubmitError::Validation(errors));
    }

    coerce_checkboxes(&form, &mut tree);
    if let Some(email) = tree.get("email").and_then(FormValue::as_text) {
        let normalized = email.trim().to_lowercase();
        tree.insert("email".to_string(), FormValue::Text(normalized));
    }

    let submitted_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let mut body = serde_json::to_value(&tree)
        .map_err(|e| SubmitError::Internal(format!("could not serialize submission: {}", e)))?;
    if let serde_json::Value::Object(ref mut map) = body {
        map.insert("status".to_string(), RecordStatus::Pending.as_str().into());
        map.insert("submittedAt".to_string(), submitted_at.clone().into());
    }

    let keys = DocumentKeys {
        email: tree
            .get("email")
            .and_then(FormValue::as_text)
            .map(str::to_string),
        ..DocumentKeys::default()
    };
    let id = store.insert(
        collections::ONBOARDING,
        RecordStatus::Pending,
        &submitted_at,
        &keys,
        &body,
    )?;
    info!("Inserted onboarding submission {}", id);
    Ok(id)
}

/// Per-field format and cross-field date checks on the parsed tree.
fn format_errors(tree: &ParsedSubmission) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if let Some(email) = tree.get("email").and_then(FormValue::as_text) {
        if !validate::valid_email(email.trim()) {
            errors.add("email", "Invalid email format.");
        }
    } else {
        errors.add("email", "Email is required.");
    }

    for field in ["dateOfBirth", "signatureDate"] {
        if let Some(raw) = tree.get(field).and_then(FormValue::as_text) {
            if validate::parse_date(raw).is_none() {
                errors.add(field, "Invalid date format (expected YYYY-MM-DD).");
            }
        }
    }

    if let Some(entries) = tree.get("experience").and_then(FormValue::as_list) {
        for (i, entry) in entries.iter().enumerate() {
            let start = checked_date(&mut errors, entry, i, "startDate");
            let end = checked_date(&mut errors, entry, i, "endDate");
            if let (Some(start), Some(end)) = (start, end) {
                if end < start {
                    errors.add(
                        format!("experience[{}][endDate]", i),
                        "End date cannot be before start date.",
                    );
                }
            }
        }
    }

    if let Some(entries) = tree.get("insurance").and_then(FormValue::as_list) {
        for (i, entry) in entries.iter().enumerate() {
            if let Some(raw) = entry.get("expirationDate").and_then(FormValue::as_text) {
                if validate::parse_date(raw).is_none() {
                    errors.add(
                        format!("insurance[{}][expirationDate]", i),
                        "Invalid date format (expected YYYY-MM-DD).",
                    );
                }
            }
        }
    }

    errors
}

/// Parses an optional date field of one experience entry, recording a
/// format error when present but unparseable.
fn checked_date(
    errors: &mut ValidationErrors,
    entry: &BTreeMap<String, FormValue>,
    index: usize,
    field: &str,
) -> Option<chrono::NaiveDate> {
    let raw = entry.get(field).and_then(FormValue::as_text)?;
    let parsed = validate::parse_date(raw);
    if parsed.is_none() {
        errors.add(
            format!("experience[{}][{}]", index, field),
            "Invalid date format (expected YYYY-MM-DD).",
        );
    }
    parsed
}

/// The conditional-required-file rules. Sections are considered "filled in"
/// based on the raw form data, not the parsed tree: a section whose files
/// all failed to save would otherwise be invisible here.
fn required_file_errors(form: &RawForm, tree: &ParsedSubmission) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    for (field, label) in REQUIRED_FILES {
        if !tree.get(*field).is_some_and(FormValue::is_file) {
            errors.add(*field, format!("{} is required.", label));
        }
    }

    let education = tree.get("education").and_then(FormValue::as_map);
    for (section, marker, label) in EDUCATION_MARKERS {
        if !form.contains(marker) {
            continue;
        }
        let has_certificate = education
            .and_then(|e| e.get(*section))
            .and_then(FormValue::as_map)
            .and_then(|s| s.get("certificate"))
            .is_some_and(FormValue::is_file);
        if !has_certificate {
            errors.add(
                format!("education[{}][certificate]", section),
                format!("{} is required.", label),
            );
        }
    }

    if let Some(entries) = tree.get("additionalEducation").and_then(FormValue::as_list) {
        for (i, entry) in entries.iter().enumerate() {
            if !entry.get("certificate").is_some_and(FormValue::is_file) {
                errors.add(
                    format!("additionalEducation[{}][certificate]", i),
                    format!("Additional education certificate {} is required.", i + 1),
                );
            }
        }
    }

    // Repeatable sections require their files only when the matching
    // checkbox was ticked in the submitted form.
    if form.contains("hasExperience") {
        if let Some(entries) = tree.get("experience").and_then(FormValue::as_list) {
            for (i, entry) in entries.iter().enumerate() {
                if !entry.get("certificate").is_some_and(FormValue::is_file) {
                    errors.add(
                        format!("experience[{}][certificate]", i),
                        format!("Experience certificate {} is required.", i + 1),
                    );
                }
            }
        }
    }
    if form.contains("hasInsurance") {
        if let Some(entries) = tree.get("insurance").and_then(FormValue::as_list) {
            for (i, entry) in entries.iter().enumerate() {
                if !entry.get("document").is_some_and(FormValue::is_file) {
                    errors.add(
                        format!("insurance[{}][document]", i),
                        format!("Insurance document {} is required.", i + 1),
                    );
                }
            }
        }
    }

    errors
}

/// Replaces checkbox markers with real booleans, including the per-entry
/// `currentJob` toggle inside the experience list.
fn coerce_checkboxes(form: &RawForm, tree: &mut ParsedSubmission) {
    for field in CHECKBOX_FIELDS {
        tree.insert(field.to_string(), FormValue::Bool(form.contains(field)));
    }
    if let Some(FormValue::List(entries)) = tree.get_mut("experience") {
        for (i, entry) in entries.iter_mut().enumerate() {
            let key = format!("experience[{}][currentJob]", i);
            entry.insert("currentJob".to_string(), FormValue::Bool(form.contains(&key)));
        }
    }
}
