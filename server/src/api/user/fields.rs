use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidateEmail;

use crate::api::error::{too_long, ApiError, FieldErrors, BLANK, REQUIRED};
use crate::api::named::clean_name;
use crate::models::User;

pub const MIN_PASSWORD_LENGTH: usize = 5;
pub const MAX_EMAIL_LENGTH: usize = 255;

/// Account fields accepted by signup and profile updates
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserRequest {
    #[schema(example = "cook@example.com")]
    pub email: Option<String>,
    /// Write-only; at least 5 characters
    #[schema(example = "testpass123")]
    pub password: Option<String>,
    #[schema(example = "Test Cook")]
    pub name: Option<String>,
}

/// Public view of an account. The password never leaves the server.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            name: user.name,
        }
    }
}

#[derive(Debug, Default)]
pub struct UserFields {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

impl UserRequest {
    /// Validate the request. With `partial`, absent fields stay `None`
    /// instead of being reported as required.
    pub fn clean(&self, partial: bool) -> Result<UserFields, ApiError> {
        let mut errors = FieldErrors::new();

        let email = check(partial, self.email.as_deref(), |raw| {
            clean_email(raw, &mut errors)
        });
        let password = check(partial, self.password.as_deref(), |raw| {
            clean_password(raw, &mut errors)
        });
        let name = check(partial, self.name.as_deref(), |raw| {
            clean_name("name", raw, &mut errors)
        });

        errors.into_result()?;

        Ok(UserFields {
            email,
            password,
            name,
        })
    }
}

fn check<F>(partial: bool, raw: Option<&str>, clean: F) -> Option<String>
where
    F: FnOnce(Option<&str>) -> Option<String>,
{
    if partial && raw.is_none() {
        None
    } else {
        clean(raw)
    }
}

pub fn clean_email(raw: Option<&str>, errors: &mut FieldErrors) -> Option<String> {
    let Some(raw) = raw else {
        errors.add("email", REQUIRED);
        return None;
    };

    let email = raw.trim();
    if email.is_empty() {
        errors.add("email", BLANK);
        return None;
    }
    if email.chars().count() > MAX_EMAIL_LENGTH {
        errors.add("email", too_long(MAX_EMAIL_LENGTH));
        return None;
    }
    if !email.validate_email() {
        errors.add("email", "Enter a valid email address.");
        return None;
    }

    Some(email.to_string())
}

/// Passwords are kept byte-for-byte; only an all-whitespace value counts as blank.
pub fn clean_password(raw: Option<&str>, errors: &mut FieldErrors) -> Option<String> {
    let Some(raw) = raw else {
        errors.add("password", REQUIRED);
        return None;
    };

    if raw.trim().is_empty() {
        errors.add("password", BLANK);
        return None;
    }
    if raw.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(
            "password",
            format!(
                "Ensure this field has at least {} characters.",
                MIN_PASSWORD_LENGTH
            ),
        );
        return None;
    }

    Some(raw.to_string())
}
