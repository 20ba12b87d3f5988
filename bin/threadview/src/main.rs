//! # threadview Binary
//!
//! The entry point that assembles the application based on compile-time
//! features and runtime settings.

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use secrecy::ExposeSecret;
use tv_api::{configure_routes, middleware, AppState};
use tv_config::Settings;
use tv_core::{PostRepo, Sanitizer, SearchSettings};

#[cfg(feature = "db-sqlite")]
use tv_db_sqlite::SqlitePostRepo;

#[cfg(not(feature = "db-sqlite"))]
compile_error!("threadview needs a storage backend; enable the `db-sqlite` feature");

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let settings = Settings::load()?;

    // 1. Initialize Database Implementation
    #[cfg(feature = "db-sqlite")]
    let repo: Arc<dyn PostRepo> = Arc::new(
        SqlitePostRepo::connect(
            settings.database.url.expose_secret(),
            settings.database.max_connections,
            settings.database.acquire_timeout(),
        )
        .await?,
    );

    // 2. Build the read pipeline once; workers share it
    let search = SearchSettings {
        max_page_size: settings.search.max_page_size,
        preview_chars: settings.search.preview_chars,
    };
    let state = web::Data::new(AppState::new(
        repo,
        Arc::new(Sanitizer::default()),
        search,
        settings.search.default_page_size,
    ));

    let (host, port) = (settings.server.host.clone(), settings.server.port);
    log::info!("threadview starting on http://{host}:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::standard_middleware())
            .wrap(middleware::cors_policy())
            .configure(configure_routes)
    })
    .bind((host, port))?
    .run()
    .await?;

    Ok(())
}
