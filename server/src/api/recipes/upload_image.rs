use crate::api::error::FieldErrors;
use crate::api::{ApiError, ErrorResponse, IdPath};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::media::{inspect_image, recipe_image_path, MediaStorage};
use crate::schema::recipes;
use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use chrono::Utc;
use diesel::prelude::*;
use utoipa::ToSchema;

use super::serializer::RecipeImageResponse;
use super::store::find_owned_recipe;

/// Form field carrying the file
const IMAGE_FIELD: &str = "image";

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadImageRequest {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/recipe_app/recipes/{id}/upload-image/",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body(content_type = "multipart/form-data", content = UploadImageRequest),
    responses(
        (status = 200, description = "Image stored", body = RecipeImageResponse),
        (status = 400, description = "Missing or invalid image", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 413, description = "Upload too large", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = []),
        ("token_auth" = [])
    )
)]
pub async fn upload_image(
    AuthUser(user): AuthUser,
    State(pool): State<DbPool>,
    State(media): State<MediaStorage>,
    IdPath(id): IdPath<i32>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<RecipeImageResponse>, ApiError> {
    let recipe = {
        let mut conn = pool.get()?;
        find_owned_recipe(&mut conn, user.id, id)?
    };

    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let data = read_image_field(&mut multipart).await?;

    // Decodes the whole image; the detected format decides the extension,
    // whatever the client called the file
    let detected = inspect_image(&data)?;
    let relative = recipe_image_path(detected.extension);
    media.save(&relative, &data).await?;

    let stored = {
        let mut conn = pool.get()?;
        diesel::update(recipes::table.find(recipe.id))
            .set((
                recipes::image.eq(Some(relative.as_str())),
                recipes::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(&mut conn)
    };
    if let Err(e) = stored {
        // Don't leave an orphan behind
        if let Err(cleanup) = media.delete(&relative).await {
            tracing::warn!("Failed to remove orphaned upload {}: {}", relative, cleanup);
        }
        return Err(e.into());
    }

    if let Some(previous) = recipe.image.as_deref() {
        if let Err(e) = media.delete(previous).await {
            tracing::warn!(recipe_id = recipe.id, "Failed to remove old image {}: {}", previous, e);
        }
    }

    tracing::info!(
        recipe_id = recipe.id,
        content_type = detected.content_type,
        bytes = data.len(),
        "Stored recipe image"
    );

    Ok(Json(RecipeImageResponse {
        id: recipe.id,
        image: media.url(&relative),
    }))
}

/// Pull the `image` field out of the form, skipping anything else.
async fn read_image_field(multipart: &mut Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let data = field.bytes().await.map_err(multipart_error)?;
        if data.is_empty() {
            return Err(ApiError::Validation(FieldErrors::single(
                IMAGE_FIELD,
                "The submitted file is empty.",
            )));
        }
        return Ok(data);
    }

    Err(ApiError::Validation(FieldErrors::single(
        IMAGE_FIELD,
        "No file was submitted.",
    )))
}

fn multipart_error(e: MultipartError) -> ApiError {
    tracing::warn!("Multipart read error: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge("File too large".to_string())
    } else {
        ApiError::BadRequest(format!("Failed to read multipart data: {}", e.body_text()))
    }
}
