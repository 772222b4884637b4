use crate::store::{collections, RecordStore};
use actix_web::{web, HttpResponse, Responder};
use common::requests::ErrorBody;
use log::error;

/// Handler for `GET /api/onboarding/{id}`: confirmation re-read.
pub async fn process(store: web::Data<RecordStore>, id: web::Path<String>) -> impl Responder {
    match store.find_by_id(collections::ONBOARDING, &id) {
        Ok(Some(record)) => HttpResponse::Ok().json(record),
        Ok(None) => HttpResponse::NotFound().json(ErrorBody::new("Submission not found.")),
        Err(e) => {
            error!("get onboarding {}: {}", id, e);
            HttpResponse::InternalServerError()
                .json(ErrorBody::new("Failed to fetch submission."))
        }
    }
}
