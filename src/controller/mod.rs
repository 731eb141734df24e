use std::net::SocketAddr;
use anyhow::Context;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::Router;
use bb8_postgres::bb8::Pool;
use bb8_postgres::PostgresConnectionManager;
use bb8_postgres::tokio_postgres::NoTls;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use crate::config::Config;
use crate::helpers::handler_404::page_not_found_handler;

pub mod customer_controller;
pub mod health_check;
pub mod reservation_controller;

#[derive(Clone)]
pub struct AppState {
    pub postgres_connection: Pool<PostgresConnectionManager<NoTls>>,
}

pub async fn serve(
    app_state: AppState,
    config: &Config,
) -> anyhow::Result<()> {
    let origins = config
        .origin_urls
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<HeaderValue>().with_context(|| format!("Invalid origin url: {}", s)))
        .collect::<anyhow::Result<Vec<HeaderValue>>>()?;

    let application = router_endpoints(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(ConcurrencyLimitLayer::new(config.concurrency_limit))
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::OPTIONS
                        ])
                        .allow_origin(origins)
                        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                )
        );

    let address = SocketAddr::new(config.host, config.port);
    info!("API server listening on: {} ({})", address, config.environment);
    axum::Server::bind(&address)
        .serve(application.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Error spinning up the API server")
}

pub fn router_endpoints(app_state: AppState) -> Router {
    Router::new()
        .merge(health_check::router())
        .nest("/customers", customer_controller::router(app_state.clone()))
        .nest("/reservations", reservation_controller::router(app_state))
        .fallback(page_not_found_handler)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, draining in-flight requests"),
        Err(e) => {
            warn!("Unable to listen for shutdown signal due to: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
