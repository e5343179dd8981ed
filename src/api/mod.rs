//! HTTP API
//!
//! Thin entry points over the catalog and streaming layers: routes,
//! handlers, request/response models, and the middleware stack.

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use handlers::AppState;
pub use server::ApiServer;
