pub mod generation_handler;
pub mod health_handler;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::errors::AppError;

pub use generation_handler::{generate_mcq, generate_mcq_batch, generation_stats};
pub use health_handler::{health_check, health_check_live, health_check_ready};

/// Registers every route. Shared by the server and handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(generate_mcq)
        .service(generate_mcq_batch)
        .service(generation_stats)
        .service(health_check)
        .service(health_check_live)
        .service(health_check_ready);
}

/// Malformed bodies are reported like any other input error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        AppError::InputError(err.to_string()).into()
    })
}
