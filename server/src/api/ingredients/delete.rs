use crate::api::{ApiError, ErrorResponse, IdPath};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::schema::ingredients;
use axum::{
    extract::State,
    http::StatusCode,
};
use diesel::prelude::*;

#[utoipa::path(
    delete,
    path = "/recipe_app/ingredients/{id}/",
    tag = "ingredients",
    params(
        ("id" = i32, Path, description = "Ingredient ID")
    ),
    responses(
        (status = 204, description = "Ingredient deleted and detached from its recipes"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Ingredient not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = []),
        ("token_auth" = [])
    )
)]
pub async fn delete_ingredient(
    AuthUser(user): AuthUser,
    State(pool): State<DbPool>,
    IdPath(id): IdPath<i32>,
) -> Result<StatusCode, ApiError> {
    let mut conn = pool.get()?;

    let deleted = diesel::delete(
        ingredients::table
            .filter(ingredients::id.eq(id))
            .filter(ingredients::user_id.eq(user.id)),
    )
    .execute(&mut conn)?;

    if deleted == 0 {
        return Err(ApiError::NotFound("Ingredient"));
    }

    tracing::info!(ingredient_id = id, user_id = user.id, "Deleted ingredient");

    Ok(StatusCode::NO_CONTENT)
}
