pub mod create;
pub mod fields;
pub mod me;
pub mod token;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Signup and token endpoints (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/user/create/", post(create::create_user))
        .route("/user/token/", post(token::create_token))
}

/// The authenticated user's own profile
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/user/me/",
        get(me::get_me).put(me::replace_me).patch(me::patch_me),
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_user,
        token::create_token,
        me::get_me,
        me::replace_me,
        me::patch_me,
    ),
    components(schemas(
        fields::UserRequest,
        fields::UserResponse,
        token::TokenRequest,
        token::TokenResponse,
    ))
)]
pub struct ApiDoc;
