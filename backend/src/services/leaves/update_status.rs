use crate::store::{collections, RecordStore, UpdateOutcome};
use actix_web::{web, HttpResponse, Responder};
use common::model::record::RecordStatus;
use common::requests::{ErrorBody, StatusUpdateRequest};
use log::{error, info};
use serde_json::json;

/// Handler for `PATCH /api/leaves/{id}/status`.
///
/// The body names the target status (`Approved`, `Rejected` or back to
/// `Pending`). A missing record is reported distinctly from one that
/// already carried the requested status.
pub async fn process(
    store: web::Data<RecordStore>,
    id: web::Path<String>,
    payload: web::Json<StatusUpdateRequest>,
) -> impl Responder {
    let Ok(status) = payload.status.parse::<RecordStatus>() else {
        return HttpResponse::BadRequest().json(ErrorBody::new(
            "Status must be one of: Pending, Approved, Rejected.",
        ));
    };
    match store.update_status(collections::LEAVES, &id, status) {
        Ok(UpdateOutcome::Missing) => {
            HttpResponse::NotFound().json(ErrorBody::new("Leave request not found."))
        }
        Ok(outcome) => {
            info!("Leave {} status -> {} ({:?})", id, status, outcome);
            HttpResponse::Ok().json(json!({
                "id": id.as_str(),
                "status": status.as_str(),
                "modified": outcome == UpdateOutcome::Updated,
            }))
        }
        Err(e) => {
            error!("update leave status: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorBody::new("Failed to update leave status."))
        }
    }
}
