use std::sync::Arc;

use axum::{Json, Router, routing::get};
use color_eyre::eyre::{Context, eyre};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{
    database::Database,
    http_server::{
        error::not_found,
        http_routes::{artists, shows, venues},
        state::AppState,
    },
};

pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    pub database: Database,
}

async fn root() -> Json<Value> {
    Json(json!({
        "venues": "/venues",
        "artists": "/artists",
        "shows": "/shows",
    }))
}

pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/venues", get(venues::list_venues))
        .route(
            "/venues/search",
            get(venues::search_venues_by_query).post(venues::search_venues),
        )
        .route(
            "/venues/create",
            get(venues::create_venue_form).post(venues::create_venue_submission),
        )
        .route(
            "/venues/{venue_id}",
            get(venues::show_venue).delete(venues::delete_venue),
        )
        .route(
            "/venues/{venue_id}/edit",
            get(venues::edit_venue).post(venues::edit_venue_submission),
        )
        .route("/artists", get(artists::list_artists))
        .route(
            "/artists/search",
            get(artists::search_artists_by_query).post(artists::search_artists),
        )
        .route(
            "/artists/create",
            get(artists::create_artist_form).post(artists::create_artist_submission),
        )
        .route("/artists/{artist_id}", get(artists::show_artist))
        .route(
            "/artists/{artist_id}/edit",
            get(artists::edit_artist).post(artists::edit_artist_submission),
        )
        .route("/shows", get(shows::list_shows))
        .route(
            "/shows/create",
            get(shows::create_show_form).post(shows::create_show_submission),
        )
        .fallback(not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state)
}

pub async fn start(config: HttpServerConfig) -> color_eyre::Result<()> {
    let app_state = Arc::new(AppState {
        db: Arc::new(config.database),
    });
    let app = router(app_state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| eyre!("Failed to bind to {}", addr))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Failed to start HTTP server")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down HTTP server");
}
