//! # Leave Request Service
//!
//! JSON API for submitting and reviewing leave applications. This variant
//! has no file uploads; its distinguishing rule is the overlap check: a new
//! request whose inclusive date range intersects an existing *Approved*
//! request of the same employee is rejected with a conflict.
//!
//! ## Registered routes
//!
//! *   **`POST /api/leaves`** (`submit::process`): validates the payload
//!     field by field, collecting every failure; checks the approved-range
//!     overlap; persists the record with status `Pending` and returns the
//!     generated identifier.
//! *   **`GET /api/leaves`** (`list::process`): all leave records, newest
//!     submission first.
//! *   **`PATCH /api/leaves/{id}/status`** (`update_status::process`): moves
//!     a record through the approve/reject workflow. A missing record is a
//!     `404`; a record already carrying the requested status reports
//!     `modified: false`.

mod list;
mod submit;
mod update_status;

use actix_web::web::{get, patch, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/leaves";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(submit::process))
        .route("", get().to(list::process))
        .route("/{id}/status", patch().to(update_status::process))
}
