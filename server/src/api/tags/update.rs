use crate::api::error::FieldErrors;
use crate::api::named::{clean_name, NamePayload, NamedItem};
use crate::api::{ApiError, ErrorResponse, IdPath, Payload};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::models::Tag;
use crate::schema::tags;
use axum::{
    extract::State,
    Json,
};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

#[utoipa::path(
    put,
    path = "/recipe_app/tags/{id}/",
    tag = "tags",
    params(
        ("id" = i32, Path, description = "Tag ID")
    ),
    request_body = NamePayload,
    responses(
        (status = 200, description = "Tag renamed", body = NamedItem),
        (status = 400, description = "Missing, blank or duplicate name", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Tag not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = []),
        ("token_auth" = [])
    )
)]
pub async fn replace_tag(
    AuthUser(user): AuthUser,
    State(pool): State<DbPool>,
    IdPath(id): IdPath<i32>,
    Payload(payload): Payload<NamePayload>,
) -> Result<Json<NamedItem>, ApiError> {
    rename(&pool, user.id, id, &payload, false)
}

#[utoipa::path(
    patch,
    path = "/recipe_app/tags/{id}/",
    tag = "tags",
    params(
        ("id" = i32, Path, description = "Tag ID")
    ),
    request_body = NamePayload,
    responses(
        (status = 200, description = "Tag updated", body = NamedItem),
        (status = 400, description = "Blank or duplicate name", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Tag not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = []),
        ("token_auth" = [])
    )
)]
pub async fn patch_tag(
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

    let tag: Tag = tags::table
        .filter(tags::id.eq(id))
        .filter(tags::user_id.eq(user_id))
        .select(Tag::as_select())
        .first(&mut conn)
        .optional()?
        .ok_or(ApiError::NotFound("Tag"))?;

    if partial && payload.name.is_none() {
        return Ok(Json(tag.into()));
    }

    let mut errors = FieldErrors::new();
    let name = clean_name("name", payload.name.as_deref(), &mut errors);
    let Some(name) = name else {
        return Err(ApiError::Validation(errors));
    };

    let updated: Tag = match diesel::update(tags::table.find(tag.id))
        .set(tags::name.eq(&name))
        .returning(Tag::as_returning())
        .get_result(&mut conn)
    {
        Ok(updated) => updated,
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(ApiError::Validation(FieldErrors::single(
                "name",
                "A tag with this name already exists.",
            )))
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(tag_id = updated.id, user_id, "Renamed tag");

    Ok(Json(updated.into()))
}
