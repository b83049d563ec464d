//! Overlay an optional JSON descriptor onto a default record.
//!
//! A missing or unreadable descriptor leaves the defaults untouched. A descriptor
//! that exists but does not parse is an error: the catalog must not be built
//! from half-understood configuration.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use super::error::CatalogError;

/// Read `path` and overlay its top-level keys onto `defaults`.
///
/// The overlay is shallow: a key present in the document replaces the default
/// value wholesale (arrays and `null` included). Keys the record does not know
/// are carried through to its `extra` map.
pub fn merge<T>(defaults: &T, path: &Path) -> Result<T, CatalogError>
where
    T: Serialize + DeserializeOwned + Clone,
{
    let content = match std::fs::read(path) {
        Ok(c) => c,
        Err(e) => {
            log::debug!("no descriptor at {} ({}), keeping defaults", path.display(), e);
            return Ok(defaults.clone());
        }
    };
    let document: serde_json::Value =
        serde_json::from_slice(&content).map_err(|e| CatalogError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    let serde_json::Value::Object(overlay) = document else {
        return Err(CatalogError::Malformed {
            path: path.to_path_buf(),
            reason: "expected a JSON object at the top level".to_string(),
        });
    };

    let mut base = match serde_json::to_value(defaults) {
        Ok(serde_json::Value::Object(map)) => map,
        Ok(_) => serde_json::Map::new(),
        Err(source) => {
            return Err(CatalogError::Invalid {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    for (key, value) in overlay {
        base.insert(key, value);
    }
    serde_json::from_value(serde_json::Value::Object(base)).map_err(|source| {
        CatalogError::Invalid {
            path: path.to_path_buf(),
            source,
        }
    })
}
