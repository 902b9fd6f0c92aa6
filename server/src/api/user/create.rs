use crate::api::{ApiError, ErrorResponse, Payload};
use crate::db::DbPool;
use crate::users;
use axum::{extract::State, http::StatusCode, Json};

use super::fields::{UserFields, UserRequest, UserResponse};

#[utoipa::path(
    post,
    path = "/user/create/",
    tag = "user",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid fields or email already registered", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(pool): State<DbPool>,
    Payload(request): Payload<UserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let UserFields {
        email: Some(email),
        password: Some(password),
        name: Some(name),
    } = request.clean(false)?
    else {
        return Err(ApiError::Internal(
            "validated signup is missing a field".to_string(),
        ));
    };

    let mut conn = pool.get()?;
    let user = users::create_user(&mut conn, &email, &password, &name)?;

    Ok((StatusCode::CREATED, Json(user.into())))
}
