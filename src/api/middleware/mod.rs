//! HTTP middleware

mod auth;
mod rate_limit;

pub use auth::{auth_middleware, require_institution, require_student};
pub use rate_limit::{rate_limit_middleware, RateLimitConfig, RateLimiter};
