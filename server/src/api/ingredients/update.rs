use crate::api::error::FieldErrors;
use crate::api::named::{clean_name, NamePayload, NamedItem};
use crate::api::{ApiError, ErrorResponse, IdPath, Payload};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::models::Ingredient;
use crate::schema::ingredients;
use axum::{
    extract::State,
    Json,
};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

#[utoipa::path(
    put,
    path = "/recipe_app/ingredients/{id}/",
    tag = "ingredients",
    params(
        ("id" = i32, Path, description = "Ingredient ID")
    ),
    request_body = NamePayload,
    responses(
        (status = 200, description = "Ingredient renamed", body = NamedItem),
        (status = 400, description = "Missing, blank or duplicate name", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Ingredient not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = []),
        ("token_auth" = [])
    )
)]
pub async fn replace_ingredient(
    AuthUser(user): AuthUser,
    State(pool): State<DbPool>,
    IdPath(id): IdPath<i32>,
    Payload(payload): Payload<NamePayload>,
) -> Result<Json<NamedItem>, ApiError> {
    rename(&pool, user.id, id, &payload, false)
}

#[utoipa::path(
    patch,
    path = "/recipe_app/ingredients/{id}/",
    tag = "ingredients",
    params(
        ("id" = i32, Path, description = "Ingredient ID")
    ),
    request_body = NamePayload,
    responses(
        (status = 200, description = "Ingredient updated", body = NamedItem),
        (status = 400, description = "Blank or duplicate name", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Ingredient not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = []),
        ("token_auth" = [])
    )
)]
pub async fn patch_ingredient(
    AuthUser(user): AuthUser,
    State(pool): State<DbPool>,
    IdPath(id): IdPath<i32>,
    Payload(payload): Payload<NamePayload>,
) -> Result<Json<NamedItem>, ApiError> {
    rename(&pool, user.id, id, &payload, true)
}

fn rename(
    pool: &DbPool,
    user_id: i32,
    id: i32,
    payload: &NamePayload,
    partial: bool,
) -> Result<Json<NamedItem>, ApiError> {
    let mut conn = pool.get()?;

    let ingredient: Ingredient = ingredients::table
        .filter(ingredients::id.eq(id))
        .filter(ingredients::user_id.eq(user_id))
        .select(Ingredient::as_select())
        .first(&mut conn)
        .optional()?
        .ok_or(ApiError::NotFound("Ingredient"))?;

    if partial && payload.name.is_none() {
        return Ok(Json(ingredient.into()));
    }

    let mut errors = FieldErrors::new();
    let name = clean_name("name", payload.name.as_deref(), &mut errors);
    let Some(name) = name else {
        return Err(ApiError::Validation(errors));
    };

    let updated: Ingredient = match diesel::update(ingredients::table.find(ingredient.id))
        .set(ingredients::name.eq(&name))
        .returning(Ingredient::as_returning())
        .get_result(&mut conn)
    {
        Ok(updated) => updated,
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(ApiError::Validation(FieldErrors::single(
                "name",
                "An ingredient with this name already exists.",
            )))
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(ingredient_id = updated.id, user_id, "Renamed ingredient");

    Ok(Json(updated.into()))
}
