use crate::api::{ApiError, ErrorResponse, IdPath};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::media::MediaStorage;
use axum::{
    extract::State,
    Json,
};

use super::serializer::RecipeDetail;
use super::store::find_owned_recipe;

#[utoipa::path(
    get,
    path = "/recipe_app/recipes/{id}/",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details", body = RecipeDetail),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = []),
        ("token_auth" = [])
    )
)]
pub async fn get_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<DbPool>,
    State(media): State<MediaStorage>,
    IdPath(id): IdPath<i32>,
) -> Result<Json<RecipeDetail>, ApiError> {
    let mut conn = pool.get()?;
    let recipe = find_owned_recipe(&mut conn, user.id, id)?;
    Ok(Json(RecipeDetail::load(&mut conn, recipe, &media)?))
}
