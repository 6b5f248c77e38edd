//! DKGPedia Web Server
//!
//! Axum-based proxy between the browser and the services behind DKGPedia.

pub mod error;
pub mod routes;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use dkgpedia_core::Config;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    let api_routes = Router::new()
        // Analysis engine
        .route("/analyze-lite", post(routes::analyze::analyze_lite))
        .route("/progress", get(routes::analyze::progress))
        // Correction
        .route("/answer", post(routes::answer::answer))
        // Article and topic lookup
        .route("/grokipedia", post(routes::lookup::grokipedia))
        .route("/suggestions", post(routes::lookup::suggestions))
        .route("/search", get(routes::lookup::search))
        // Knowledge graph
        .route("/dkgpedia/search", get(routes::dkgpedia::search))
        .route("/dkgpedia/query/{topic_id}", get(routes::dkgpedia::query))
        .route("/dkgpedia/publish", post(routes::dkgpedia::publish))
        .with_state(state);

    Router::new()
        .route("/health", get(routes::health))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Run the web server.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    let state = AppState::new(config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
