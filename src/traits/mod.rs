//! Trait definitions for storage, registry and side-effect collaborators

pub mod certificates;
pub mod registry;
pub mod renderer;
pub mod sequence;
pub mod sinks;

pub use certificates::CertificateStore;
pub use registry::{Registry, RegistryWriter};
pub use renderer::{ArtifactRenderer, RenderContext};
pub use sequence::SequenceStore;
pub use sinks::{ActivityLog, LogNotifier, Notifier};
