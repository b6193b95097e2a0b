//! # Shad Manager billing service
//!
//! Main entry point for the subscription billing backend: PIX charges,
//! invoice lifecycle, collections and financial reports for every
//! organization. Configures logging, the Postgres pool, SSL and routes.

#![recursion_limit = "256"]

pub mod api;
pub mod config;
pub mod consts;
pub mod front;
pub mod logger;
pub mod metric;
pub mod models;
pub mod pix;
pub mod qr;
pub mod repo;
pub mod services;
pub mod templates;
pub mod utils;

use std::sync::Arc;

use logfire::config::MetricsOptions;
use ntex::web;
use ntex_cors::Cors;
use openssl::ssl::{SslAcceptor, SslFiletype, SslMethod};
use sqlx::postgres::PgPoolOptions;

#[ntex::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::init_config()?;

    // Initialize logging and metrics, plain stdout without a logfire token
    let shutdown_handler = if app_config.logfire_token.is_empty() {
        logger::setup_simple_logger()?;
        None
    } else {
        Some(
            logfire::configure()
                .install_panic_handler()
                .with_metrics(Some(MetricsOptions::default()))
                .send_to_logfire(logfire::config::SendToLogfire::Yes)
                .with_token(&app_config.logfire_token)
                .finish()?,
        )
    };

    // Initialize database connection pool
    let pg_repo = repo::postgres::PgRepo {
        db_pool: PgPoolOptions::new()
            .max_connections(app_config.database_max_connections)
            .connect(&app_config.database_url)
            .await?,
    };

    let notification_service = services::notification::NotificationHandler::from_config(app_config);
    let membership_cache = Arc::new(api::membership::MembershipCache::with_system_clock(
        app_config.membership_cache_ttl_secs,
    ));

    configure_and_run_server(app_config, pg_repo, notification_service, membership_cache).await?;

    if let Some(shutdown_handler) = shutdown_handler {
        shutdown_handler.shutdown()?;
    }

    Ok(())
}

/// Configures SSL acceptor for production environments
fn setup_ssl_acceptor(
    app_config: &config::AppConfig,
) -> anyhow::Result<openssl::ssl::SslAcceptorBuilder> {
    let mut ssl_acceptor = SslAcceptor::mozilla_intermediate(SslMethod::tls_server())
        .map_err(|e| anyhow::anyhow!("Failed to create SSL acceptor: {}", e))?;

    ssl_acceptor
        .set_private_key_file(&app_config.private_key_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load private key from {}: {}",
                app_config.private_key_path,
                e
            )
        })?;

    ssl_acceptor
        .set_certificate_file(&app_config.certificate_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load certificate from {}: {}",
                app_config.certificate_path,
                e
            )
        })?;

    Ok(ssl_acceptor)
}

/// Creates application state from the provided services
fn create_app_state(
    pg_repo: repo::postgres::PgRepo,
    notification_service: services::notification::NotificationHandler,
    membership_cache: Arc<api::membership::MembershipCache>,
    internal_api_secret: String,
) -> front::AppState {
    front::AppState {
        repo: Box::new(pg_repo),
        notification_service: Box::new(notification_service),
        membership_cache,
        internal_api_secret,
    }
}

/// Configures and starts the web server with appropriate SSL settings
async fn configure_and_run_server(
    app_config: &'static config::AppConfig,
    pg_repo: repo::postgres::PgRepo,
    notification_service: services::notification::NotificationHandler,
    membership_cache: Arc<api::membership::MembershipCache>,
) -> anyhow::Result<()> {
    let server_addr = (app_config.web_server_host.as_str(), app_config.web_server_port);
    let public_origin = app_config.base_url();

    let server = web::server(move || {
        web::App::new()
            .wrap(
                Cors::new()
                    .allowed_methods(vec!["GET", "HEAD", "POST", "OPTIONS"])
                    .allowed_origin("http://localhost:8080")
                    .allowed_origin(&public_origin)
                    .finish(),
            )
            .wrap(web::middleware::Logger::default())
            .wrap(web::middleware::Compress::default())
            .state(create_app_state(
                pg_repo.clone(),
                notification_service.clone(),
                membership_cache.clone(),
                app_config.internal_api_secret.clone(),
            ))
            .configure(front::routes::pix_tools)
            .configure(front::routes::organization)
            .configure(front::routes::internal)
            .service((front::server::health,))
            .default_service(web::route().to(front::server::serve_not_found))
    });

    let bound_server = if app_config.is_prod() {
        let ssl_acceptor = setup_ssl_acceptor(app_config)?;
        server.bind_openssl(server_addr, ssl_acceptor)?
    } else {
        server.bind(server_addr)?
    };

    bound_server
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
