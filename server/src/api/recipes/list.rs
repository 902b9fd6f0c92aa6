use crate::api::filters::parse_id_list;
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::models::Recipe;
use crate::schema::{recipe_ingredients, recipe_tags, recipes};
use axum::{
    extract::{Query, State},
    Json,
};
use diesel::prelude::*;
use serde::Deserialize;
use utoipa::IntoParams;

use super::serializer::{RecipeSummary, Related};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeFilterParams {
    /// Comma-separated tag IDs, e.g. `1,2`. Recipes carrying any of them match.
    pub tags: Option<String>,
    /// Comma-separated ingredient IDs
    pub ingredients: Option<String>,
}

#[utoipa::path(
    get,
    path = "/recipe_app/recipes/",
    tag = "recipes",
    params(RecipeFilterParams),
    responses(
        (status = 200, description = "The user's recipes, newest first", body = [RecipeSummary]),
        (status = 400, description = "Malformed filter", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = []),
        ("token_auth" = [])
    )
)]
pub async fn list_recipes(
    AuthUser(user): AuthUser,
    State(pool): State<DbPool>,
    Query(params): Query<RecipeFilterParams>,
) -> Result<Json<Vec<RecipeSummary>>, ApiError> {
    // `?tags=` with nothing in it filters nothing
    let tag_ids = params
        .tags
        .as_deref()
        .map(|raw| parse_id_list("tags", raw))
        .transpose()?
        .filter(|ids| !ids.is_empty());
    let ingredient_ids = params
        .ingredients
        .as_deref()
        .map(|raw| parse_id_list("ingredients", raw))
        .transpose()?
        .filter(|ids| !ids.is_empty());

    let mut conn = pool.get()?;

    let mut query = recipes::table
        .filter(recipes::user_id.eq(user.id))
        .select(Recipe::as_select())
        .order(recipes::id.desc())
        .into_boxed();

    // Subselects rather than joins so a recipe matching several IDs is
    // still returned once
    if let Some(ids) = tag_ids {
        query = query.filter(
            recipes::id.eq_any(
                recipe_tags::table
                    .filter(recipe_tags::tag_id.eq_any(ids))
                    .select(recipe_tags::recipe_id),
            ),
        );
    }
    if let Some(ids) = ingredient_ids {
        query = query.filter(
            recipes::id.eq_any(
                recipe_ingredients::table
                    .filter(recipe_ingredients::ingredient_id.eq_any(ids))
                    .select(recipe_ingredients::recipe_id),
            ),
        );
    }

    let rows: Vec<Recipe> = query.load(&mut conn)?;

    let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
    let mut related = Related::load(&mut conn, &ids)?;

    Ok(Json(
        rows.into_iter()
            .map(|recipe| RecipeSummary::render(recipe, &mut related))
            .collect(),
    ))
}
