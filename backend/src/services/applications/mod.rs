//! # Job Application Service
//!
//! Multipart API for job applications. Each submission carries the
//! applicant's details plus three required certificate uploads (SSC,
//! intermediate, graduation) and an optional additional document.
//!
//! The service enforces one application per normalized email address with
//! two layers: an application-level pre-check gives a friendly early
//! conflict, and the store's partial unique index is the authoritative
//! backstop for the check-then-insert race window. An insert rejected by
//! the index is reported as a *concurrent* duplicate, distinct from the
//! pre-check message.
//!
//! ## Registered routes
//!
//! *   **`POST /api/applications/submit`** (`submit::process`)
//! *   **`GET /api/applications/{id}`** (`get::process`)

mod get;
mod submit;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/applications";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/submit", post().to(submit::process))
        .route("/{id}", get().to(get::process))
}
