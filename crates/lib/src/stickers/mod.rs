//! Sticker catalog: walk the sticker root, merge descriptors, and build the action registry.
//!
//! The catalog is built once at startup from a snapshot of the filesystem and never
//! changes afterwards; picking up new stickers requires a restart.

mod catalog;
mod descriptor;
mod error;
mod index;
mod merge;
mod names;
mod walker;

pub use catalog::{ActionDescriptor, Catalog, CatalogBuilder, CollisionPolicy, Registry};
pub use descriptor::{CategoryConfig, ItemConfig};
pub use error::CatalogError;
pub use index::CatalogIndex;
pub use merge::merge;
pub use names::{camel_case, title_case};
pub use walker::{walk_root, CategoryAssets, DESCRIPTOR_EXTENSION, MEDIA_EXTENSIONS};
