// File: src/storage/sqlite/mod.rs

mod activity;
mod certificates;
mod config;
mod convert;
mod registry;
mod schema;
mod sequence;
mod store;

// Public exports
pub use config::SqliteConfig;
pub use schema::SCHEMA_VERSION;
pub use store::SqliteStore;
