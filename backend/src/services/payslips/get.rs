use crate::store::{collections, RecordStore};
use actix_web::{web, HttpResponse, Responder};
use common::requests::ErrorBody;
use log::error;

/// Handler for `GET /api/payslips/{id}`: confirmation re-read by identifier.
pub async fn process(store: web::Data<RecordStore>, id: web::Path<String>) -> impl Responder {
    match store.find_by_id(collections::PAYSLIPS, &id) {
        Ok(Some(record)) => HttpResponse::Ok().json(record),
        Ok(None) => HttpResponse::NotFound().json(ErrorBody::new("Payslip request not found.")),
        Err(e) => {
            error!("get payslip {}: {}", id, e);
            HttpResponse::InternalServerError()
                .json(ErrorBody::new("Failed to fetch payslip request."))
        }
    }
}
