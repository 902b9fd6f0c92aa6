use crate::db::DbPool;
use crate::models::{NewSession, User};
use crate::schema::{sessions, users};
use chrono::{Datelike, Duration, NaiveDateTime, Utc};
use diesel::prelude::*;

use super::crypto::{generate_token, hash_token};

/// Issue a new bearer token for `user_id`, valid for `ttl`.
pub fn create_session(
    conn: &mut SqliteConnection,
    user_id: i32,
    ttl: Duration,
) -> Result<String, diesel::result::Error> {
    let token = generate_token();
    let token_hash = hash_token(&token);
    let expires_at = expiry_after(ttl);

    let new_session = NewSession {
        user_id,
        token_hash: &token_hash,
        expires_at,
    };

    diesel::insert_into(sessions::table)
        .values(&new_session)
        .execute(conn)?;

    Ok(token)
}

/// `now + ttl`, clamped to year 9999. Timestamps are compared as text in
/// SQLite, so they must keep a four-digit year.
fn expiry_after(ttl: Duration) -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    let latest = now.with_year(9999).unwrap_or(now);
    now.checked_add_signed(ttl)
        .map_or(latest, |expiry| expiry.min(latest))
}

/// Resolve a bearer token to its active user. Expired sessions and
/// deactivated users resolve to `None`.
pub fn find_user_by_token(
    conn: &mut SqliteConnection,
    token: &str,
) -> Result<Option<User>, diesel::result::Error> {
    let token_hash = hash_token(token);

    sessions::table
        .inner_join(users::table)
        .filter(sessions::token_hash.eq(&token_hash))
        .filter(sessions::expires_at.gt(Utc::now().naive_utc()))
        .filter(users::is_active.eq(true))
        .select(User::as_select())
        .first(conn)
        .optional()
}

pub async fn get_user_from_token(pool: &DbPool, token: &str) -> Result<Option<User>, AuthLookupError> {
    let mut conn = pool.get()?;
    Ok(find_user_by_token(&mut conn, token)?)
}

#[derive(Debug, thiserror::Error)]
pub enum AuthLookupError {
    #[error("Database connection failed: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("Session lookup failed: {0}")]
    Query(#[from] diesel::result::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;
    use crate::users::create_user;

    #[test]
    fn test_session_token_resolves_to_user() {
        let mut conn = test_connection();
        let user = create_user(&mut conn, "test@example.com", "testpass123", "Test").unwrap();

        let token = create_session(&mut conn, user.id, Duration::days(1)).unwrap();
        let found = find_user_by_token(&mut conn, &token).unwrap().unwrap();
        assert_eq!(found.id, user.id);

        assert!(find_user_by_token(&mut conn, "bogus").unwrap().is_none());
    }

    #[test]
    fn test_huge_ttl_is_clamped() {
        let mut conn = test_connection();
        let user = create_user(&mut conn, "test@example.com", "testpass123", "Test").unwrap();

        let token = create_session(&mut conn, user.id, Duration::MAX).unwrap();
        assert!(find_user_by_token(&mut conn, &token).unwrap().is_some());
    }

    #[test]
    fn test_expired_session_is_rejected() {
        let mut conn = test_connection();
        let user = create_user(&mut conn, "test@example.com", "testpass123", "Test").unwrap();

        let token = create_session(&mut conn, user.id, Duration::days(-1)).unwrap();
        assert!(find_user_by_token(&mut conn, &token).unwrap().is_none());
    }

    #[test]
    fn test_inactive_user_session_is_rejected() {
        let mut conn = test_connection();
        let user = create_user(&mut conn, "test@example.com", "testpass123", "Test").unwrap();
        let token = create_session(&mut conn, user.id, Duration::days(1)).unwrap();

        diesel::update(users::table.find(user.id))
            .set(users::is_active.eq(false))
            .execute(&mut conn)
            .unwrap();

        assert!(find_user_by_token(&mut conn, &token).unwrap().is_none());
    }
}
