// src/api/mod.rs
use actix_web::{middleware, web, App, HttpServer};
use actix_cors::Cors;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use utoipa_redoc::{Redoc, Servable};
use crate::core::config::Config;

// This will hold our API documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::system::index,

        // Generator endpoints
        crate::api::handlers::generator::default_password,
        crate::api::handlers::generator::generate_password
    ),
    components(
        schemas(
            crate::api::types::PasswordGenerationRequest,
            crate::api::types::PasswordGenerationResponse,
            crate::api::types::ErrorResponse
        )
    ),
    tags(
        (name = "Generator", description = "Password generation endpoints"),
        (name = "System", description = "Service status")
    ),
    info(
        title = "Password Generator API",
        version = "0.1.0",
        description = "Generates random passwords from caller-supplied constraints",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

pub async fn start_server(config: Config) -> std::io::Result<()> {
    let (address, port) = config.bind_address();
    log::info!("Starting password generator API on {}:{}", address, port);

    let config_data = web::Data::new(config);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec!["Content-Type", "Accept"])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(config_data.clone())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi())
            )
            .service(Redoc::with_url("/redoc", ApiDoc::openapi()))
            .configure(routes::configure_routes)
    })
    .bind((address, port))?
    .run()
    .await
}

pub mod types;
pub mod routes;
pub mod handlers;
