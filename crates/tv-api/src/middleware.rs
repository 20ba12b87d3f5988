//! threadview/crates/tv-api/src/middleware.rs Middleware
//!
//! Access logging and CORS for the read-only API.

use actix_cors::Cors;
use actix_web::middleware::Logger;

// Returns the access logger for the threadview API.
pub fn standard_middleware() -> Logger {
    // remote-ip "request-line" status-code response-size time-taken
    Logger::new(r#"%a "%r" %s %b %Dms"#)
}

// Configures CORS (Cross-Origin Resource Sharing)
// The API only serves reads, so only GET is let through.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET"])
        .max_age(3600)
}
