//! Core module
//!
//! This module provides the shared application layer including:
//! - Configuration management
//! - Structured logging system
//! - Error handling and type system

pub mod config;
pub mod error;
pub mod logging;

pub use config::Config;
pub use error::{ErrorResponse, Result, SetlistError};
pub use logging::Logger;
