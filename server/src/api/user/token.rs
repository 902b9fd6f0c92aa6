use crate::api::error::{FieldErrors, BLANK, REQUIRED};
use crate::api::{ApiError, ErrorResponse, Payload};
use crate::auth::create_session;
use crate::config::Config;
use crate::db::DbPool;
use crate::users;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TokenRequest {
    #[schema(example = "cook@example.com")]
    pub email: Option<String>,
    #[schema(example = "testpass123")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

const BAD_CREDENTIALS: &str = "Unable to authenticate with provided credentials.";

#[utoipa::path(
    post,
    path = "/user/token/",
    tag = "user",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Missing fields or bad credentials", body = ErrorResponse)
    )
)]
pub async fn create_token(
    State(pool): State<DbPool>,
    State(config): State<Arc<Config>>,
    Payload(request): Payload<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let mut errors = FieldErrors::new();
    let email = present(&mut errors, "email", request.email.as_deref().map(str::trim));
    let password = present(&mut errors, "password", request.password.as_deref());

    let (Some(email), Some(password)) = (email, password) else {
        return Err(ApiError::Validation(errors));
    };

    let mut conn = pool.get()?;
    let Some(user) = users::authenticate(&mut conn, email, password)? else {
        tracing::info!("Rejected token request");
        return Err(ApiError::Validation(FieldErrors::single(
            "non_field_errors",
            BAD_CREDENTIALS,
        )));
    };

    let token = create_session(&mut conn, user.id, config.session_ttl)?;
    users::record_login(&mut conn, user.id)?;

    tracing::info!(user_id = user.id, "Issued token");

    Ok(Json(TokenResponse { token }))
}

fn present<'a>(errors: &mut FieldErrors, field: &str, value: Option<&'a str>) -> Option<&'a str> {
    match value {
        None => {
            errors.add(field, REQUIRED);
            None
        }
        Some(v) if v.trim().is_empty() => {
            errors.add(field, BLANK);
            None
        }
        Some(v) => Some(v),
    }
}
