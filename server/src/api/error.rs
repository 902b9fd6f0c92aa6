use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::r2d2::PoolError;
use thiserror::Error;

use super::ErrorResponse;
use crate::media::MediaError;
use crate::users::UserError;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";

pub fn too_long(max: usize) -> String {
    format!("Ensure this field has no more than {} characters.", max)
}

/// Validation messages keyed by field name. Nested entries use paths such
/// as `tags[1].name`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` if nothing was recorded, otherwise a validation error.
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request")]
    Validation(FieldErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Database connection failed: {0}")]
    Pool(#[from] PoolError),

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Invalid request".to_string(),
                    fields: Some(fields.0),
                },
            ),
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new(message))
            }
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new(format!("{} not found", what)),
            ),
            ApiError::Database(diesel::NotFound) => {
                (StatusCode::NOT_FOUND, ErrorResponse::new("Not found"))
            }
            ApiError::PayloadTooLarge(message) => {
                (StatusCode::PAYLOAD_TOO_LARGE, ErrorResponse::new(message))
            }
            ApiError::Pool(e) => {
                tracing::error!("Database connection failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Database connection failed"),
                )
            }
            ApiError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error"),
                )
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

const DESERIALIZE_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if let JsonRejection::JsonDataError(e) = &rejection {
            if let Some(fields) = field_error_from_serde(&e.body_text()) {
                return ApiError::Validation(fields);
            }
        }
        ApiError::BadRequest(rejection.body_text())
    }
}

/// axum reports a mistyped field as `<path>: <serde message>`. Pull the path
/// out so the failure lands in `fields` like any other validation error.
fn field_error_from_serde(text: &str) -> Option<FieldErrors> {
    let detail = text.strip_prefix(DESERIALIZE_PREFIX).unwrap_or(text);
    let (path, message) = detail.split_once(": ")?;

    let starts_like_field = path
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let is_path = path
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
    if !starts_like_field || !is_path {
        return None;
    }

    Some(FieldErrors::single(path, type_message(message)))
}

fn type_message(serde_message: &str) -> String {
    let message = serde_message
        .rsplit_once(" at line ")
        .map_or(serde_message, |(head, _)| head);

    if message.contains("expected a Decimal") || message.contains("expected f64") {
        "A valid number is required.".to_string()
    } else if message.contains("expected i32") || message.contains("expected i64") {
        "A valid integer is required.".to_string()
    } else if message.contains("expected a string") {
        "Not a valid string.".to_string()
    } else if message.contains("expected a sequence") {
        "Expected a list of items.".to_string()
    } else {
        message.to_string()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(e) => {
                tracing::debug!("Unparseable path parameter: {}", e.body_text());
                ApiError::NotFound("Resource")
            }
            other => ApiError::Internal(other.body_text()),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::EmptyEmail => {
                ApiError::Validation(FieldErrors::single("email", e.to_string()))
            }
            UserError::DuplicateEmail => ApiError::Validation(FieldErrors::single(
                "email",
                "user with this email already exists.",
            )),
            UserError::PasswordHash(e) => ApiError::Internal(format!("password hashing: {}", e)),
            UserError::Database(e) => ApiError::Database(e),
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::InvalidImage(reason) => {
                tracing::debug!("Rejected upload: {}", reason);
                ApiError::Validation(FieldErrors::single(
                    "image",
                    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.",
                ))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}
