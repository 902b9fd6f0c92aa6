use crate::api::{ApiError, ErrorResponse, IdPath};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::media::MediaStorage;
use crate::schema::recipes;
use axum::{
    extract::State,
    http::StatusCode,
};
use diesel::prelude::*;

use super::store::find_owned_recipe;

#[utoipa::path(
    delete,
    path = "/recipe_app/recipes/{id}/",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = []),
        ("token_auth" = [])
    )
)]
pub async fn delete_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<DbPool>,
    State(media): State<MediaStorage>,
    IdPath(id): IdPath<i32>,
) -> Result<StatusCode, ApiError> {
    let recipe = {
        let mut conn = pool.get()?;
        let recipe = find_owned_recipe(&mut conn, user.id, id)?;
        // Associations go with it via ON DELETE CASCADE
        diesel::delete(recipes::table.find(recipe.id)).execute(&mut conn)?;
        recipe
    };

    tracing::info!(recipe_id = recipe.id, user_id = user.id, "Deleted recipe");

    if let Some(image) = &recipe.image {
        if let Err(e) = media.delete(image).await {
            tracing::warn!(recipe_id = recipe.id, "Failed to remove image {}: {}", image, e);
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
