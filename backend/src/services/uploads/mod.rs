//! Serves stored uploads back to the client, keyed by category and
//! filename. The category must be one of the fixed enumeration and the
//! filename is rejected outright if it carries path separators or `..`;
//! everything else resolves inside the category directory.

use crate::forms::files::{FileCategory, FileStore};
use actix_files::NamedFile;
use actix_web::web::{get, scope};
use actix_web::{web, HttpRequest, HttpResponse, Responder, Scope};
use log::warn;

const API_PATH: &str = "/uploads";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/{category}/{filename}", get().to(serve))
}

async fn serve(
    request: HttpRequest,
    files: web::Data<FileStore>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (category, filename) = path.into_inner();
    let Some(category) = FileCategory::from_dir(&category) else {
        return HttpResponse::NotFound().body("Not Found");
    };
    let Some(path) = files.resolve(category, &filename) else {
        warn!("Rejected upload path '{}/{}'", category.dir(), filename);
        return HttpResponse::NotFound().body("Not Found");
    };
    match NamedFile::open(path) {
        Ok(file) => file.into_response(&request),
        Err(_) => HttpResponse::NotFound().body("Not Found"),
    }
}
