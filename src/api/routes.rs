// src/api/routes.rs
use super::handlers;
use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::system::index));

    // Password generator
    cfg.service(
        web::resource("/passwords")
            .route(web::get().to(handlers::generator::default_password))
            .route(web::post().to(handlers::generator::generate_password))
    );
}
