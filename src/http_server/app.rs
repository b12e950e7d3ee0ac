use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::Response,
    routing::{get, post},
};
use color_eyre::eyre::{Context, eyre};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{
    database::Database,
    http_server::{
        error::internal_error_response,
        http_routes::{self, artists, shows, venues},
        state::AppState,
    },
};

pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    pub database: Database,
    pub static_dir: PathBuf,
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    log::error!("Request handler panicked: {}", details);
    internal_error_response()
}

pub fn router(app_state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(http_routes::index))
        // Venues
        .route("/venues", get(venues::venues))
        .route("/venues/search", post(venues::search_venues))
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
        // Artists
        .route("/artists", get(artists::artists))
        .route("/artists/search", post(artists::search_artists))
        .route(
            "/artists/create",
            get(artists::create_artist_form).post(artists::create_artist_submission),
        )
        .route(
            "/artists/{artist_id}",
            get(artists::show_artist).delete(artists::delete_artist),
        )
        .route(
            "/artists/{artist_id}/edit",
            get(artists::edit_artist).post(artists::edit_artist_submission),
        )
        // Shows
        .route("/shows", get(shows::shows))
        .route(
            "/shows/create",
            get(shows::create_show_form).post(shows::create_show_submission),
        )
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(http_routes::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                        .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
                )
                .layer(CatchPanicLayer::custom(handle_panic)),
        )
        .with_state(app_state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    log::info!("Shutting down HTTP server");
}

pub async fn start(config: HttpServerConfig) -> color_eyre::Result<()> {
    let HttpServerConfig {
        host,
        port,
        database,
        static_dir,
    } = config;

    if !static_dir.is_dir() {
        log::warn!(
            "Static directory {} does not exist, stylesheets will be missing",
            static_dir.display()
        );
    }

    let app_state = Arc::new(AppState {
        db: Arc::new(database),
    });
    let app = router(app_state, &static_dir);

    let address = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .wrap_err_with(|| eyre!("Failed to bind to {}", address))?;
    log::info!("Listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Failed to start HTTP server")?;

    Ok(())
}
