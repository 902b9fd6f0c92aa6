use crate::api::{ApiError, ErrorResponse, IdPath, Payload};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::media::MediaStorage;
use crate::models::User;
use axum::{
    extract::State,
    Json,
};
use diesel::prelude::*;

use super::serializer::{RecipeDetail, RecipePayload, WriteMode};
use super::store::{find_owned_recipe, update_recipe};

#[utoipa::path(
    put,
    path = "/recipe_app/recipes/{id}/",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body = RecipePayload,
    responses(
        (status = 200, description = "Recipe replaced", body = RecipeDetail),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = []),
        ("token_auth" = [])
    )
)]
pub async fn replace_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<DbPool>,
    State(media): State<MediaStorage>,
    IdPath(id): IdPath<i32>,
    Payload(payload): Payload<RecipePayload>,
) -> Result<Json<RecipeDetail>, ApiError> {
    apply(&user, &pool, &media, id, payload, WriteMode::Full)
}

#[utoipa::path(
    patch,
    path = "/recipe_app/recipes/{id}/",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body = RecipePayload,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeDetail),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = []),
        ("token_auth" = [])
    )
)]
pub async fn patch_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<DbPool>,
    State(media): State<MediaStorage>,
    IdPath(id): IdPath<i32>,
    Payload(payload): Payload<RecipePayload>,
) -> Result<Json<RecipeDetail>, ApiError> {
    apply(&user, &pool, &media, id, payload, WriteMode::Partial)
}

fn apply(
    user: &User,
    pool: &DbPool,
    media: &MediaStorage,
    id: i32,
    payload: RecipePayload,
    mode: WriteMode,
) -> Result<Json<RecipeDetail>, ApiError> {
    let mut conn = pool.get()?;
    let existing = find_owned_recipe(&mut conn, user.id, id)?;
    let fields = payload.validate(mode)?;

    let recipe = conn.transaction(|conn| update_recipe(conn, &existing, &fields))?;

    tracing::info!(recipe_id = recipe.id, user_id = user.id, "Updated recipe");

    Ok(Json(RecipeDetail::load(&mut conn, recipe, media)?))
}
