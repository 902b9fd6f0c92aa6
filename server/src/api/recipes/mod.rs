pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod serializer;
pub mod store;
pub mod update;
pub mod upload_image;

use crate::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /recipes endpoints (mounted under /recipe_app)
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/recipes/",
            get(list::list_recipes).post(create::create_recipe),
        )
        .route(
            "/recipes/{id}/",
            get(get::get_recipe)
                .put(update::replace_recipe)
                .patch(update::patch_recipe)
                .delete(delete::delete_recipe),
        )
        .route(
            "/recipes/{id}/upload-image/",
            post(upload_image::upload_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_recipes,
        create::create_recipe,
        get::get_recipe,
        update::replace_recipe,
        update::patch_recipe,
        delete::delete_recipe,
        upload_image::upload_image,
    ),
    components(schemas(
        serializer::RecipePayload,
        serializer::RecipeSummary,
        serializer::RecipeDetail,
        serializer::RecipeImageResponse,
        upload_image::UploadImageRequest,
    ))
)]
pub struct ApiDoc;
