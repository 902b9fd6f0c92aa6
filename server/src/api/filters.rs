//! Query-string parsing shared by the list endpoints.

use super::error::{ApiError, FieldErrors};

/// Parse `"1,2,3"` into IDs. Whitespace around entries and empty entries
/// (e.g. a trailing comma) are ignored.
pub fn parse_id_list(field: &str, raw: &str) -> Result<Vec<i32>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i32>().map_err(|_| {
                ApiError::Validation(FieldErrors::single(
                    field,
                    format!("\"{}\" is not a valid ID.", part),
                ))
            })
        })
        .collect()
}

/// Parse a boolean-ish flag such as `assigned_only=1`.
pub fn parse_flag(field: &str, raw: &str) -> Result<bool, ApiError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        _ => Err(ApiError::Validation(FieldErrors::single(
            field,
            "Must be a valid boolean.",
        ))),
    }
}
