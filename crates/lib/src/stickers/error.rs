//! Errors raised while building the sticker catalog. Any of these aborts startup.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{context} {}: {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The descriptor exists but is not a JSON object.
    #[error("malformed descriptor {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
    /// The descriptor is valid JSON but a documented field has the wrong type.
    #[error("invalid descriptor {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(
        "action name {key:?} registered by both {} and {}",
        first.display(),
        second.display()
    )]
    Collision {
        key: String,
        first: PathBuf,
        second: PathBuf,
    },
}
