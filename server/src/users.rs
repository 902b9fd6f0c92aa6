//! Account management: creation, normalization and credential checks.
//!
//! Users are identified by email. The domain part of an address is
//! case-insensitive and gets lower-cased on the way in; the local part is kept
//! exactly as submitted.

use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::auth::{hash_password, verify_password};
use crate::models::{NewUser, User};
use crate::schema::users;

#[derive(Error, Debug)]
pub enum UserError {
    #[error("Users must have an email address")]
    EmptyEmail,

    #[error("A user with this email already exists")]
    DuplicateEmail,

    #[error("Failed to hash password: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),

    #[error("Database error: {0}")]
    Database(DieselError),
}

impl From<DieselError> for UserError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                UserError::DuplicateEmail
            }
            other => UserError::Database(other),
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

pub fn create_user(
    conn: &mut SqliteConnection,
    email: &str,
    password: &str,
    name: &str,
) -> Result<User, UserError> {
    insert_user(conn, email, password, name, false)
}

pub fn create_superuser(
    conn: &mut SqliteConnection,
    email: &str,
    password: &str,
    name: &str,
) -> Result<User, UserError> {
    insert_user(conn, email, password, name, true)
}

fn insert_user(
    conn: &mut SqliteConnection,
    email: &str,
    password: &str,
    name: &str,
    superuser: bool,
) -> Result<User, UserError> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(UserError::EmptyEmail);
    }

    let password_hash = hash_password(password)?;

    let user = diesel::insert_into(users::table)
        .values(NewUser {
            email: &email,
            name,
            password_hash: &password_hash,
            is_staff: superuser,
            is_superuser: superuser,
        })
        .returning(User::as_returning())
        .get_result(conn)?;

    tracing::info!(user_id = user.id, superuser, "created user");

    Ok(user)
}

pub fn find_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<User>, DieselError> {
    users::table
        .filter(users::email.eq(normalize_email(email)))
        .select(User::as_select())
        .first(conn)
        .optional()
}

/// Check credentials. Returns the user only if the password matches and the
/// account is active.
pub fn authenticate(
    conn: &mut SqliteConnection,
    email: &str,
    password: &str,
) -> Result<Option<User>, DieselError> {
    let Some(user) = find_by_email(conn, email)? else {
        return Ok(None);
    };

    if !user.is_active || !verify_password(password, &user.password_hash) {
        return Ok(None);
    }

    Ok(Some(user))
}

pub fn record_login(conn: &mut SqliteConnection, user_id: i32) -> Result<(), DieselError> {
    diesel::update(users::table.find(user_id))
        .set(users::last_login.eq(Some(Utc::now().naive_utc())))
        .execute(conn)?;
    Ok(())
}

/// Profile fields a user may change on their own account.
#[derive(Debug, Default)]
pub struct ProfileChanges<'a> {
    pub email: Option<&'a str>,
    pub name: Option<&'a str>,
    pub password: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = users)]
struct UserChangeset {
    email: Option<String>,
    name: Option<String>,
    password_hash: Option<String>,
}

pub fn update_profile(
    conn: &mut SqliteConnection,
    user: &User,
    changes: ProfileChanges<'_>,
) -> Result<User, UserError> {
    let email = match changes.email {
        Some(email) => {
            let email = normalize_email(email);
            if email.is_empty() {
                return Err(UserError::EmptyEmail);
            }
            Some(email)
        }
        None => None,
    };

    let password_hash = changes.password.map(hash_password).transpose()?;

    let changeset = UserChangeset {
        email,
        name: changes.name.map(str::to_string),
        password_hash,
    };

    if changeset.email.is_none() && changeset.name.is_none() && changeset.password_hash.is_none() {
        return Ok(user.clone());
    }

    let updated = diesel::update(users::table.find(user.id))
        .set(&changeset)
        .returning(User::as_returning())
        .get_result(conn)?;

    Ok(updated)
}
