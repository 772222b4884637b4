//! # Employee Onboarding Service
//!
//! The richest variant: a multipart form whose field names use bracket
//! notation (`education[ssc][school]`, `experience[0][company]`) and whose
//! uploads are spread across every file category. Submission runs the full
//! pipeline: nested-form parsing with file storage, per-field format checks,
//! cross-field date checks, and the conditional-required-file rules.
//!
//! A file is required only when its section was actually filled in, detected
//! from marker keys in the *raw* form data: a school/college name key for an
//! education sub-section, the `hasExperience`/`hasInsurance` checkboxes for
//! the repeatable sections. An unchecked checkbox therefore never produces a
//! missing-certificate error, even when no entries exist at all.
//!
//! ## Registered routes
//!
//! *   **`POST /api/onboarding/submit`** (`submit::process`): parse,
//!     validate, persist; responds with the generated identifier.
//! *   **`GET /api/onboarding/{id}`** (`get::process`): confirmation
//!     re-read of one stored submission.

mod get;
mod submit;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/onboarding";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/submit", post().to(submit::process))
        .route("/{id}", get().to(get::process))
}
