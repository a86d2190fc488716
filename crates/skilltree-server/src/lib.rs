pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use std::path::Path;
use std::time::Duration;

use axum::routing::{get, post, put};
use axum::Router;
use skilltree_core::engine::Engine;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(engine: Engine) -> Router {
    let timeout = Duration::from_secs(engine.config().server.request_timeout_secs.max(1));
    let app_state = state::AppState::new(engine);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(routes::health::health))
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Containers
        .route(
            "/api/containers",
            get(routes::containers::list_containers).post(routes::containers::create_container),
        )
        .route(
            "/api/containers/{id}",
            get(routes::containers::get_container).delete(routes::containers::delete_container),
        )
        .route(
            "/api/containers/{id}/reconcile",
            post(routes::containers::reconcile),
        )
        .route("/api/containers/{id}/check", get(routes::containers::check))
        // Skills
        .route(
            "/api/containers/{id}/skills",
            get(routes::skills::list_skills).post(routes::skills::create_skill),
        )
        .route(
            "/api/skills/{id}",
            axum::routing::patch(routes::skills::update_skill).delete(routes::skills::delete_skill),
        )
        .route("/api/skills/{id}/toggle", post(routes::skills::toggle))
        .route("/api/skills/{id}/move", post(routes::skills::move_skill))
        .route(
            "/api/skills/{id}/insert-below",
            post(routes::skills::insert_below),
        )
        // Levels
        .route(
            "/api/containers/{id}/levels",
            post(routes::levels::generate_level),
        )
        .route(
            "/api/containers/{id}/levels/{level}/subtitle",
            put(routes::levels::set_subtitle),
        )
        .layer(axum::middleware::from_fn(auth::identity_middleware))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Open the engine under `root` and serve the API on `port`.
pub async fn serve(root: &Path, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(root, listener).await
}

/// Serve on a pre-bound listener, so the caller can read the actual port
/// first (useful when `port = 0`).
pub async fn serve_on(root: &Path, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let engine = Engine::open(root)?;
    let actual_port = listener.local_addr()?.port();
    let app = build_router(engine);

    tracing::info!("skilltree API listening on http://localhost:{actual_port}");
    axum::serve(listener, app).await?;
    Ok(())
}
