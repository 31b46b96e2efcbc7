use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Json, Router,
};
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::paper::routes as paper_routes;
use crate::state::AppState;
use crate::upload::service as upload_service;

/// Build the full axum Router with all routes and middleware.
///
/// The rate limiter keys on the peer address, so the router must be served
/// with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn build_router(state: AppState) -> Router {
    let mut upload_routes = Router::new()
        .route(
            "/api/irys/upload",
            post(upload_service::upload).fallback(upload_service::method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(state.json_body_limit_bytes));

    if state.upload_rate_limit_per_minute > 0 {
        let per_minute = state.upload_rate_limit_per_minute;
        let governor_config = GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_millisecond(replenish_interval_ms(per_minute))
            .burst_size(per_minute)
            .finish();

        match governor_config {
            Some(governor_config) => {
                let governor_config = Arc::new(governor_config);
                let limiter = governor_config.limiter().clone();
                tokio::spawn(async move {
                    loop {
                        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
                        limiter.retain_recent();
                    }
                });
                upload_routes = upload_routes.layer(GovernorLayer {
                    config: governor_config,
                });
            }
            None => tracing::warn!(
                "Invalid upload rate limit {}/min, uploads are not rate limited",
                per_minute
            ),
        }
    }

    let paper_routes = Router::new().route(
        "/api/paper-info",
        get(paper_routes::paper_info).fallback(paper_routes::method_not_allowed),
    );

    let health = Router::new()
        .route("/health", get(health_check))
        .route("/api/health", get(health_check));

    let mut app = Router::new()
        .merge(upload_routes)
        .merge(paper_routes)
        .merge(health);

    if let Some(dir) = &state.static_dir {
        let index = Path::new(dir).join("index.html");
        app = app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
        tracing::info!("Serving frontend from {}", dir);
    }

    app.layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// One token every `60_000 / per_minute` ms; bursts are capped at `per_minute`.
fn replenish_interval_ms(per_minute: u32) -> u64 {
    u64::from(60_000 / per_minute.max(1)).max(1)
}

/// Any origin may call the API; the browser app is hosted separately.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Basic health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Irys upload server is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
