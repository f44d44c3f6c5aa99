//! Converter and artifact-store adapters.
//!
//! The harness core treats converters and stores as black boxes; this
//! crate supplies the concrete ones a deployment actually wires in: an
//! external-command converter and a filesystem artifact store.

pub mod command;
pub mod store;

pub use command::CommandConverter;
pub use store::FsStore;
// Re-export the boundary traits so callers need only this crate.
pub use convbench_core::{ArtifactStore, ConvertError, Converter, StoreError};
