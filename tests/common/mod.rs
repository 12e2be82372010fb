//! Common test utilities and fixtures
//!
//! This module provides shared test infrastructure including:
//! - Registry fixtures and seeded in-memory stores
//! - Test renderers and app setup
//! - Custom assertions for API error bodies

#![allow(dead_code)]

pub mod fixtures;

// Re-export commonly used items
pub use assertions::*;
pub use fixtures::*;

// Re-export frequently used external types for convenience
pub use axum::body::Body;
pub use axum::http::{Request, StatusCode};
pub use std::sync::Arc;
pub use tower::ServiceExt;
