//! API middleware

pub mod auth;
pub mod rate_limit;
pub mod trace;

pub use auth::bearer_token;
pub use rate_limit::{rate_limit_middleware, RateLimiter};
pub use trace::{trace_id_middleware, TraceId, TRACE_ID_HEADER};
