//! Certificate document rendering

mod config;
mod renderer;
mod service;

pub use config::ArtifactConfig;
pub use renderer::{render_document, FileRenderer};
pub use service::ArtifactService;
