pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod media;
pub mod models;
pub mod schema;
pub mod telemetry;
pub mod users;

use std::sync::Arc;

use axum::extract::{FromRef, MatchedPath};
use axum::http::Request;
use axum::middleware;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::Span;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::db::{DbError, DbPool};
use crate::media::MediaStorage;

/// Application state shared across all handlers
#[derive(Clone, FromRef)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
    pub media: MediaStorage,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> Self {
        let media = MediaStorage::new(config.media_root.clone(), config.media_url.clone());
        Self {
            pool,
            config: Arc::new(config),
            media,
        }
    }

    /// Open (and migrate) the configured database and build the state around it.
    pub fn from_config(config: Config) -> Result<Self, DbError> {
        let pool = db::create_pool(&config.database_url, config.db_pool_size)?;
        Ok(Self::new(pool, config))
    }
}

/// Assemble the full HTTP application.
pub fn build_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_router = api::user::public_router();

    // Protected routes (auth required)
    let recipe_app = api::recipes::router(state.config.max_upload_bytes)
        .merge(api::tags::router())
        .merge(api::ingredients::router());
    let protected_router = Router::new()
        .merge(api::user::router())
        .nest("/recipe_app", recipe_app)
        .layer(middleware::from_fn_with_state(
            state.pool.clone(),
            auth::require_auth,
        ));

    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::openapi());

    let mut app = Router::new()
        .merge(public_router)
        .merge(protected_router)
        .merge(swagger_ui);

    if let Some(mount) = state.config.media_mount_path() {
        app = app.nest_service(mount, ServeDir::new(state.media.root()));
    }

    app.with_state(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str)
                    .unwrap_or(request.uri().path());

                // Static assets are noisy; keep them out of the info logs
                if matched_path.starts_with("/swagger-ui") {
                    tracing::trace_span!("http_request")
                } else {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %matched_path,
                    )
                }
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(
                |response: &axum::http::Response<_>, latency: std::time::Duration, span: &Span| {
                    if span.metadata().map(|m| m.level()) == Some(&tracing::Level::TRACE) {
                        return;
                    }
                    let status = response.status().as_u16();
                    if status >= 500 {
                        tracing::error!(
                            status = %status,
                            latency_ms = %latency.as_millis(),
                            "request failed with server error"
                        );
                    } else {
                        tracing::info!(
                            status = %status,
                            latency_ms = %latency.as_millis(),
                            "request completed"
                        );
                    }
                },
            )
            .on_failure(
                |error: tower_http::classify::ServerErrorsFailureClass,
                 latency: std::time::Duration,
                 _span: &Span| {
                    tracing::error!(
                        error = %error,
                        latency_ms = %latency.as_millis(),
                        "request failed"
                    );
                },
            ),
    )
}
