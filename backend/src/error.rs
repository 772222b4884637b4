//! Failure taxonomy for the submission pipelines, mapped to HTTP responses
//! once at the handler boundary.
//!
//! - Validation: user-correctable, `400` with the full field-to-message map.
//! - Conflict: duplicate or overlapping record, `409`.
//! - Unavailable: store unreachable, `503`, checked before any write.
//! - Everything else: logged with context and converted to a generic `500`;
//!   internals never leak to the client.

use crate::forms::validate::ValidationErrors;
use crate::store::StoreError;
use actix_web::HttpResponse;
use common::requests::ErrorBody;
use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("validation failed")]
    Validation(ValidationErrors),
    #[error("{0}")]
    Conflict(String),
    #[error("database unavailable")]
    Unavailable,
    #[error(transparent)]
    Store(StoreError),
    #[error("{0}")]
    Internal(String),
}

impl From<StoreError> for SubmitError {
    fn from(e: StoreError) -> Self {
        match e {
            // The unique-index backstop fired after the pre-check passed:
            // report it as a concurrent duplicate, not a generic failure.
            StoreError::Duplicate => SubmitError::Conflict(
                "A record with this email address was registered just before your \
                 submission completed."
                    .to_string(),
            ),
            StoreError::Unavailable(_) => SubmitError::Unavailable,
            other => SubmitError::Store(other),
        }
    }
}

impl SubmitError {
    /// Converts the failure into its HTTP response. `context` names the
    /// operation for the server-side log line.
    pub fn into_response(self, context: &str) -> HttpResponse {
        match self {
            SubmitError::Validation(errors) => HttpResponse::BadRequest().json(
                ErrorBody::with_details("Validation failed", errors.into_map()),
            ),
            SubmitError::Conflict(message) => {
                HttpResponse::Conflict().json(ErrorBody::new(message))
            }
            SubmitError::Unavailable => {
                error!("{}: database unavailable", context);
                HttpResponse::ServiceUnavailable().json(ErrorBody::new(
                    "Database not available. Please try again later.",
                ))
            }
            SubmitError::Store(e) => {
                error!("{}: storage failure: {}", context, e);
                HttpResponse::InternalServerError().json(ErrorBody::new(
                    "An internal server error occurred. Please contact support.",
                ))
            }
            SubmitError::Internal(detail) => {
                error!("{}: {}", context, detail);
                HttpResponse::InternalServerError().json(ErrorBody::new(
                    "An internal server error occurred. Please contact support.",
                ))
            }
        }
    }
}
