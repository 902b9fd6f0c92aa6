mod crypto;
mod db;
mod extractor;
mod middleware;

pub use crypto::{hash_password, verify_password};
pub use db::{create_session, find_user_by_token};
pub use extractor::{AuthError, AuthUser};
pub use middleware::require_auth;
