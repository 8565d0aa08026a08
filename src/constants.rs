use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Redis key prefixes for revoked tokens.
pub const ACCESS_DENY_PREFIX: &str = "access_deny";
pub const REFRESH_DENY_PREFIX: &str = "refresh_deny";

/// Route prefixes, lowercase because API paths are matched case-insensitively.
pub const ADMIN_PREFIX: &str = "/api/v1/admin";
pub const USERS_PREFIX: &str = "/api/v1/users";
pub const AUTH_PREFIX: &str = "/api/v1/auth";
pub const TESTIMONIALS_PATH: &str = "/api/testimonialsapi";
