use crate::api::{ApiError, ErrorResponse, IdPath};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::schema::tags;
use axum::{
    extract::State,
    http::StatusCode,
};
use diesel::prelude::*;

#[utoipa::path(
    delete,
    path = "/recipe_app/tags/{id}/",
    tag = "tags",
    params(
        ("id" = i32, Path, description = "Tag ID")
    ),
    responses(
        (status = 204, description = "Tag deleted and detached from its recipes"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Tag not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = []),
        ("token_auth" = [])
    )
)]
pub async fn delete_tag(
    AuthUser(user): AuthUser,
    State(pool): State<DbPool>,
    IdPath(id): IdPath<i32>,
) -> Result<StatusCode, ApiError> {
    let mut conn = pool.get()?;

    let deleted = diesel::delete(
        tags::table
            .filter(tags::id.eq(id))
            .filter(tags::user_id.eq(user.id)),
    )
    .execute(&mut conn)?;

    if deleted == 0 {
        return Err(ApiError::NotFound("Tag"));
    }

    tracing::info!(tag_id = id, user_id = user.id, "Deleted tag");

    Ok(StatusCode::NO_CONTENT)
}
