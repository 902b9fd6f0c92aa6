use crate::api::{ApiError, ErrorResponse, Payload};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::media::MediaStorage;
use axum::{extract::State, http::StatusCode, Json};
use diesel::prelude::*;

use super::serializer::{RecipeDetail, RecipePayload, WriteMode};
use super::store::insert_recipe;

#[utoipa::path(
    post,
    path = "/recipe_app/recipes/",
    tag = "recipes",
    request_body(content = RecipePayload, example = json!({
        "title": "Thai Prawn Curry",
        "time_minutes": 30,
        "price": "7.00",
        "tags": [{"name": "Thai"}, {"name": "Dinner"}],
        "ingredients": [{"name": "Prawns"}]
    })),
    responses(
        (status = 201, description = "Recipe created", body = RecipeDetail),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = []),
        ("token_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<DbPool>,
    State(media): State<MediaStorage>,
    Payload(payload): Payload<RecipePayload>,
) -> Result<(StatusCode, Json<RecipeDetail>), ApiError> {
    let fields = payload.validate(WriteMode::Full)?;

    let mut conn = pool.get()?;
    let recipe = conn.transaction(|conn| insert_recipe(conn, user.id, &fields))?;

    tracing::info!(recipe_id = recipe.id, user_id = user.id, "Created recipe");

    let detail = RecipeDetail::load(&mut conn, recipe, &media)?;
    Ok((StatusCode::CREATED, Json(detail)))
}
