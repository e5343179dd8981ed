//! Streaming module
//!
//! Session-scoped broadcast topics plus the background job that walks an
//! artist's catalog and publishes one event per page.

pub mod broadcaster;
pub mod job;

pub use broadcaster::{SessionBroadcaster, SessionId, StreamEvent};
pub use job::StreamJobRunner;
