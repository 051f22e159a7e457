//! Seams to external collaborators and pluggable strategies.

pub mod interaction_source;
pub mod module_catalog;
pub mod snapshot_store;
pub mod transform;

pub use interaction_source::InteractionSource;
pub use module_catalog::ModuleCatalog;
pub use snapshot_store::SnapshotStore;
pub use transform::{Compressor, Encryptor, NoopCompressor, NoopEncryptor};
