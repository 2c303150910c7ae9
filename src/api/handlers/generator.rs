// src/api/handlers/generator.rs

use actix_web::error::BlockingError;
use actix_web::{web, HttpResponse};
use log::{error, warn};
use crate::core::config::Config;
use crate::generators::{GeneratorError, PasswordGenerator};
use crate::models::PasswordGenerationOptions;
use crate::api::types::{
    ErrorResponse, PasswordGenerationRequest, PasswordGenerationResponse,
};

/// Generate a password with the default settings
///
/// Uses the character classes and counts configured for the service.
#[utoipa::path(
    get,
    path = "/passwords",
    tag = "Generator",
    responses(
        (status = 200, description = "Generated password", body = PasswordGenerationResponse),
        (status = 500, description = "Server misconfiguration", body = ErrorResponse)
    )
)]
pub async fn default_password(config: web::Data<Config>) -> HttpResponse {
    let generator = PasswordGenerator::new(config.charsets());

    match run_generator(generator, config.default_options).await {
        Ok(Ok(password)) => HttpResponse::Ok().json(PasswordGenerationResponse { password }),
        Ok(Err(e)) => {
            // The defaults come from our own configuration, not the caller.
            error!("Default password settings are unusable: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: format!("Failed to generate password: {}", e),
            })
        }
        Err(e) => blocking_failed(e),
    }
}

/// Generate a password
///
/// Every field is optional; missing fields use the service defaults.
#[utoipa::path(
    post,
    path = "/passwords",
    tag = "Generator",
    request_body = PasswordGenerationRequest,
    responses(
        (status = 200, description = "Generated password", body = PasswordGenerationResponse),
        (status = 400, description = "Unsatisfiable constraints", body = ErrorResponse)
    )
)]
pub async fn generate_password(
    config: web::Data<Config>,
    generation_req: web::Json<PasswordGenerationRequest>,
) -> HttpResponse {
    let options = generation_req.options(&config.default_options);

    if options.length > config.max_password_length {
        warn!(
            "Rejected password length {} (max {})",
            options.length, config.max_password_length
        );
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: format!(
                "Password length must be at most {} characters",
                config.max_password_length
            ),
        });
    }

    let generator = PasswordGenerator::new(generation_req.charsets(&config));

    match run_generator(generator, options).await {
        Ok(Ok(password)) => HttpResponse::Ok().json(PasswordGenerationResponse { password }),
        Ok(Err(e)) => {
            warn!("Password request rejected: {}", e);
            HttpResponse::BadRequest().json(ErrorResponse {
                error: e.to_string(),
            })
        }
        Err(e) => blocking_failed(e),
    }
}

// Generation is CPU-bound, so keep it off the actix worker threads.
async fn run_generator(
    generator: PasswordGenerator,
    options: PasswordGenerationOptions,
) -> Result<Result<String, GeneratorError>, BlockingError> {
    web::block(move || generator.generate_password(&options)).await
}

fn blocking_failed(e: BlockingError) -> HttpResponse {
    error!("Password generation task failed: {}", e);
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: "Failed to generate password".to_string(),
    })
}
