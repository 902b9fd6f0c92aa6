use crate::api::named::{AssignedOnlyParams, NamedItem};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::models::Tag;
use crate::schema::{recipe_tags, recipes, tags};
use axum::{
    extract::{Query, State},
    Json,
};
use diesel::prelude::*;

#[utoipa::path(
    get,
    path = "/recipe_app/tags/",
    tag = "tags",
    params(AssignedOnlyParams),
    responses(
        (status = 200, description = "The user's tags, by name descending", body = [NamedItem]),
        (status = 400, description = "Malformed filter", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = []),
        ("token_auth" = [])
    )
)]
pub async fn list_tags(
    AuthUser(user): AuthUser,
    State(pool): State<DbPool>,
    Query(params): Query<AssignedOnlyParams>,
) -> Result<Json<Vec<NamedItem>>, ApiError> {
    let assigned_only = params.assigned_only()?;

    let mut conn = pool.get()?;

    let mut query = tags::table
        .filter(tags::user_id.eq(user.id))
        .select(Tag::as_select())
        .order(tags::name.desc())
        .into_boxed();

    // IN (subselect) keeps each tag once no matter how many recipes use it
    if assigned_only {
        query = query.filter(
            tags::id.eq_any(
                recipe_tags::table
                    .inner_join(recipes::table)
                    .filter(recipes::user_id.eq(user.id))
                    .select(recipe_tags::tag_id),
            ),
        );
    }

    let rows: Vec<Tag> = query.load(&mut conn)?;

    Ok(Json(rows.into_iter().map(NamedItem::from).collect()))
}
