use crate::api::{ApiError, ErrorResponse, Payload};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::users::{self, ProfileChanges};
use axum::{extract::State, Json};

use super::fields::{UserRequest, UserResponse};

#[utoipa::path(
    get,
    path = "/user/me/",
    tag = "user",
    responses(
        (status = 200, description = "The authenticated user", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = []),
        ("token_auth" = [])
    )
)]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(user.into())
}

#[utoipa::path(
    put,
    path = "/user/me/",
    tag = "user",
    request_body = UserRequest,
    responses(
        (status = 200, description = "Profile replaced", body = UserResponse),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = []),
        ("token_auth" = [])
    )
)]
pub async fn replace_me(
    AuthUser(user): AuthUser,
    State(pool): State<DbPool>,
    Payload(request): Payload<UserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    apply(user, &pool, &request, false)
}

#[utoipa::path(
    patch,
    path = "/user/me/",
    tag = "user",
    request_body = UserRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = []),
        ("token_auth" = [])
    )
)]
pub async fn patch_me(
    AuthUser(user): AuthUser,
    State(pool): State<DbPool>,
    Payload(request): Payload<UserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    apply(user, &pool, &request, true)
}

fn apply(
    user: crate::models::User,
    pool: &DbPool,
    request: &UserRequest,
    partial: bool,
) -> Result<Json<UserResponse>, ApiError> {
    let fields = request.clean(partial)?;

    let mut conn = pool.get()?;
    let updated = users::update_profile(
        &mut conn,
        &user,
        ProfileChanges {
            email: fields.email.as_deref(),
            name: fields.name.as_deref(),
            password: fields.password.as_deref(),
        },
    )?;

    tracing::info!(user_id = updated.id, "Updated profile");

    Ok(Json(updated.into()))
}
