use crate::api::named::{AssignedOnlyParams, NamedItem};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::models::Ingredient;
use crate::schema::{ingredients, recipe_ingredients, recipes};
use axum::{
    extract::{Query, State},
    Json,
};
use diesel::prelude::*;

#[utoipa::path(
    get,
    path = "/recipe_app/ingredients/",
    tag = "ingredients",
    params(AssignedOnlyParams),
    responses(
        (status = 200, description = "The user's ingredients, by name descending", body = [NamedItem]),
        (status = 400, description = "Malformed filter", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = []),
        ("token_auth" = [])
    )
)]
pub async fn list_ingredients(
    AuthUser(user): AuthUser,
    State(pool): State<DbPool>,
    Query(params): Query<AssignedOnlyParams>,
) -> Result<Json<Vec<NamedItem>>, ApiError> {
    let assigned_only = params.assigned_only()?;

    let mut conn = pool.get()?;

    let mut query = ingredients::table
        .filter(ingredients::user_id.eq(user.id))
        .select(Ingredient::as_select())
        .order(ingredients::name.desc())
        .into_boxed();

    // IN (subselect) keeps each ingredient once no matter how many recipes use it
    if assigned_only {
        query = query.filter(
            ingredients::id.eq_any(
                recipe_ingredients::table
                    .inner_join(recipes::table)
                    .filter(recipes::user_id.eq(user.id))
                    .select(recipe_ingredients::ingredient_id),
            ),
        );
    }

    let rows: Vec<Ingredient> = query.load(&mut conn)?;

    Ok(Json(rows.into_iter().map(NamedItem::from).collect()))
}
