//! # tv-api
//!
//! The web routing layer for threadview. Parses query parameters, hands them
//! to the tv-core pipeline and answers with JSON.

pub mod error;
pub mod handlers;
pub mod middleware;

use actix_web::web;

pub use error::ApiError;
pub use handlers::AppState;

/// Configures the routes.
///
/// # Developer Note
/// We use a scoped configuration to allow the main binary to mount
/// the API under different paths if needed (e.g., /api/v1/).
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            .route("/", web::get().to(handlers::index))
            // A thread, starting from any of its posts (e.g., /thread/123)
            .route("/thread/{post_id}", web::get().to(handlers::view_thread))
            // Author search (e.g., /search?by_user=alice&page=2&sort_by=lol)
            .route("/search", web::get().to(handlers::search)),
    );
}
