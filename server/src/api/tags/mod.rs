pub mod delete;
pub mod list;
pub mod update;

use crate::AppState;
use axum::routing::{get, put};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /tags endpoints (mounted under /recipe_app).
/// Tags are created implicitly through recipe writes, so there is no POST.
pub fn router() -> Router<AppState> {
    Router::new().route("/tags/", get(list::list_tags)).route(
        "/tags/{id}/",
        put(update::replace_tag)
            .patch(update::patch_tag)
            .delete(delete::delete_tag),
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_tags,
        update::replace_tag,
        update::patch_tag,
        delete::delete_tag,
    ),
    components(schemas(crate::api::named::NamePayload))
)]
pub struct ApiDoc;
