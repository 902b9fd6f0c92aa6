use crate::db::DbPool;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::extractor::resolve_user;

/// Middleware that requires a valid auth token for all requests.
/// Apply this to routes that should be protected by default.
///
/// The resolved user is stored in the request extensions for `AuthUser`.
pub async fn require_auth(
    State(pool): State<DbPool>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match resolve_user(&pool, request.headers()).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
