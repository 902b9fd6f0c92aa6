use axum::extract::{FromRequest, FromRequestParts};

use super::error::ApiError;

/// `Json` with rejections rendered as our 400 error body instead of axum's
/// plain-text 415/422 responses.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Payload<T>(pub T);

/// `Path` whose rejection is a 404. An id that can't even be parsed names no
/// row, same as one that doesn't exist.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct IdPath<T>(pub T);
