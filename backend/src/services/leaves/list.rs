use crate::store::{collections, RecordStore};
use actix_web::{web, HttpResponse, Responder};
use common::requests::ErrorBody;
use log::error;

/// Handler for `GET /api/leaves`: every leave record, newest first.
pub async fn process(store: web::Data<RecordStore>) -> impl Responder {
    if store.ping().is_err() {
        return HttpResponse::ServiceUnavailable()
            .json(ErrorBody::new("Database not available. Please try again later."));
    }
    match store.find_all(collections::LEAVES) {
        Ok(leaves) => HttpResponse::Ok().json(leaves),
        Err(e) => {
            error!("list leaves: {}", e);
            HttpResponse::InternalServerError().json(ErrorBody::new("Failed to fetch leave data."))
        }
    }
}
