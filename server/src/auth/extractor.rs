use crate::api::ErrorResponse;
use crate::db::DbPool;
use crate::models::User;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::db::get_user_from_token;

/// Extractor that validates the Authorization header and provides the authenticated user.
///
/// Use this in any handler that requires authentication:
/// ```ignore
/// async fn my_handler(AuthUser(user): AuthUser) -> impl IntoResponse {
///     // user is the authenticated User
/// }
/// ```
///
/// When `require_auth` already resolved the user for this request, the
/// extractor reuses it instead of hitting the database again.
pub struct AuthUser(pub User);

#[derive(Debug)]
pub enum AuthError {
    MissingHeader,
    InvalidHeader,
    InvalidFormat,
    InvalidToken,
    Unavailable,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingHeader => (StatusCode::UNAUTHORIZED, "Missing Authorization header"),
            AuthError::InvalidHeader => (StatusCode::UNAUTHORIZED, "Invalid Authorization header"),
            AuthError::InvalidFormat => (
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header format",
            ),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            AuthError::Unavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication backend unavailable",
            ),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Pull the token out of `Authorization: Bearer <token>`. The
/// `Token <token>` scheme is accepted as an alias.
pub(super) fn token_from_headers(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?;

    let auth_str = auth_header.to_str().map_err(|_| AuthError::InvalidHeader)?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .or_else(|| auth_str.strip_prefix("Token "))
        .map(str::trim)
        .ok_or(AuthError::InvalidFormat)?;

    if token.is_empty() {
        return Err(AuthError::InvalidFormat);
    }

    Ok(token)
}

pub(super) async fn resolve_user(pool: &DbPool, headers: &HeaderMap) -> Result<User, AuthError> {
    let token = token_from_headers(headers)?;

    match get_user_from_token(pool, token).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(AuthError::InvalidToken),
        Err(e) => {
            tracing::error!("Failed to resolve session: {}", e);
            Err(AuthError::Unavailable)
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    DbPool: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<User>() {
            return Ok(AuthUser(user.clone()));
        }

        let pool = DbPool::from_ref(state);
        let user = resolve_user(&pool, &parts.headers).await?;

        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_and_token_schemes() {
        assert_eq!(token_from_headers(&headers_with("Bearer abc")).unwrap(), "abc");
        assert_eq!(token_from_headers(&headers_with("Token abc")).unwrap(), "abc");
    }

    #[test]
    fn test_rejects_malformed_headers() {
        assert!(matches!(
            token_from_headers(&HeaderMap::new()),
            Err(AuthError::MissingHeader)
        ));
        assert!(matches!(
            token_from_headers(&headers_with("Basic abc")),
            Err(AuthError::InvalidFormat)
        ));
        assert!(matches!(
            token_from_headers(&headers_with("Bearer ")),
            Err(AuthError::InvalidFormat)
        ));
    }
}
