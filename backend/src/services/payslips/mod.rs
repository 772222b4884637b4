//! # Payslip Request Service
//!
//! JSON API for payslip generation requests. The payload carries the
//! employee's identity plus a strict `YYYY-MM` month range; months must be
//! real calendar months, not in the future, and no earlier than January
//! 2022. The password is verified for strength but never persisted.
//!
//! ## Registered routes
//!
//! *   **`POST /api/payslips`** (`submit::process`): validates every field,
//!     computes the human-readable pay period (e.g. `Apr 2025 - Jun 2025`)
//!     and persists the request with status `Pending`.
//! *   **`GET /api/payslips/{id}`** (`get::process`): confirmation re-read
//!     of one stored request.

mod get;
mod submit;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/payslips";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(submit::process))
        .route("/{id}", get().to(get::process))
}
