use crate::store::{collections, RecordStore};
use actix_web::{web, HttpResponse, Responder};
use common::requests::ErrorBody;
use log::error;

/// Handler for `GET /api/applications/{id}`: confirmation re-read.
pub async fn process(store: web::Data<RecordStore>, id: web::Path<String>) -> impl Responder {
    match store.find_by_id(collections::JOB_APPLICATIONS, &id) {
        Ok(Some(record)) => HttpResponse::Ok().json(record),
        Ok(None) => HttpResponse::NotFound().json(ErrorBody::new("Application not found.")),
        Err(e) => {
            error!("get application {}: {}", id, e);
            HttpResponse::InternalServerError()
                .json(ErrorBody::new("Failed to fetch application."))
        }
    }
}
