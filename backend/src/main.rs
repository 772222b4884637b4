mod config;
mod error;
mod forms;
mod services;
mod store;
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::forms::files::FileStore;
use crate::store::RecordStore;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = Config::from_env();

    let files = FileStore::new(&config.upload_dir);
    files.ensure_directories()?;

    let store = RecordStore::open(&config.database_path)
        .map_err(|e| std::io::Error::other(format!("opening {}: {}", config.database_path, e)))?;

    let files = web::Data::new(files);
    let store = web::Data::new(store);
    let max_payload = config.max_payload_bytes;
    let bind_addr = (config.host.clone(), config.port);
    let config = web::Data::new(config);

    info!("Server running at http://{}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(max_payload))
            .app_data(web::PayloadConfig::new(max_payload))
            .app_data(config.clone())
            .app_data(files.clone())
            .app_data(store.clone())
            .service(services::onboarding::configure_routes())
            .service(services::applications::configure_routes())
            .service(services::leaves::configure_routes())
            .service(services::payslips::configure_routes())
            .service(services::uploads::configure_routes())
    })
    .bind(bind_addr)?
    .run()
    .await
}
