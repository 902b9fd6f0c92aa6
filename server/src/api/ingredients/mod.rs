pub mod delete;
pub mod list;
pub mod update;

use crate::AppState;
use axum::routing::{get, put};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /ingredients endpoints (mounted under /recipe_app).
/// Ingredients are created implicitly through recipe writes, so there is no POST.
pub fn router() -> Router<AppState> {
    Router::new().route("/ingredients/", get(list::list_ingredients)).route(
        "/ingredients/{id}/",
        put(update::replace_ingredient)
            .patch(update::patch_ingredient)
            .delete(delete::delete_ingredient),
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_ingredients,
        update::replace_ingredient,
        update::patch_ingredient,
        delete::delete_ingredient,
    ),
    components(schemas(crate::api::named::NamePayload))
)]
pub struct ApiDoc;
