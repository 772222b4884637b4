//! Process configuration read once at startup from environment variables.
//!
//! Every setting has a working default so the server can be started with no
//! environment at all during development. Unparsable values fall back to the
//! default with a warning instead of aborting.

use log::warn;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_PATH: &str = "employee_forms.sqlite";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_MAX_PAYLOAD_BYTES: usize = 30 * 1024 * 1024; // 30 MB

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Path of the SQLite file backing the record store.
    pub database_path: String,
    /// Base directory under which category subdirectories are created.
    pub upload_dir: String,
    /// Upper bound for JSON and multipart request bodies.
    pub max_payload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Config {
        Config {
            host: std::env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: parsed_env("PORT", DEFAULT_PORT),
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string()),
            upload_dir: std::env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| DEFAULT_UPLOAD_DIR.to_string()),
            max_payload_bytes: parsed_env("MAX_PAYLOAD_BYTES", DEFAULT_MAX_PAYLOAD_BYTES),
        }
    }
}

fn parsed_env<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring unparsable {} value '{}'", name, raw);
                default
            }
        },
        Err(_) => default,
    }
}
