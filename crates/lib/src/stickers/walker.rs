//! Walk the sticker root: one category per subdirectory, items one level inside.
//!
//! Layout:
//! ```text
//! root/
//!   <category>/               pack directory
//!   <category>.json           optional pack descriptor
//!   <category>.<media-ext>    optional pack thumbnail
//!   <category>/<item>.<ext>   sticker media (or <item>.json descriptor)
//! ```
//! Entries are visited in lexical file-name order so repeated walks of the same
//! tree produce the same output.

use std::path::{Path, PathBuf};

use super::error::CatalogError;

/// Media extensions, in thumbnail lookup order.
pub const MEDIA_EXTENSIONS: [&str; 6] = ["gif", "jpeg", "jpg", "png", "mp4", "webm"];

/// Extension of sidecar descriptor files.
pub const DESCRIPTOR_EXTENSION: &str = "json";

/// Raw files discovered for one category directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryAssets {
    pub dir: PathBuf,
    /// Directory stem; the default category name is derived from it.
    pub stem: String,
    /// `root/<stem>.json`, when it exists.
    pub descriptor: Option<PathBuf>,
    /// First existing `root/<stem>.<ext>` in [`MEDIA_EXTENSIONS`] order.
    pub thumbnail: Option<PathBuf>,
    /// Media and descriptor files directly inside `dir`, sorted by file name.
    pub items: Vec<PathBuf>,
}

pub fn is_media(path: &Path) -> bool {
    extension(path).is_some_and(|ext| MEDIA_EXTENSIONS.contains(&ext))
}

pub fn is_descriptor(path: &Path) -> bool {
    extension(path) == Some(DESCRIPTOR_EXTENSION)
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

/// File stem as UTF-8, or None (with a warning) for names we cannot use as command names.
pub fn stem_of(path: &Path) -> Option<&str> {
    let stem = path.file_stem().and_then(|s| s.to_str());
    if stem.is_none() {
        log::warn!("skipping {}: file name is not valid UTF-8", path.display());
    }
    stem
}

/// Entries of `dir` sorted by file name.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let read_dir = std::fs::read_dir(dir).map_err(|source| CatalogError::Io {
        context: "reading directory",
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths: Vec<PathBuf> = read_dir.flatten().map(|e| e.path()).collect();
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// Enumerate every category under `root`, creating `root` if it does not exist.
pub fn walk_root(root: &Path) -> Result<Vec<CategoryAssets>, CatalogError> {
    if !root.exists() {
        std::fs::create_dir_all(root).map_err(|source| CatalogError::Io {
            context: "creating sticker root",
            path: root.to_path_buf(),
            source,
        })?;
        log::info!("created sticker root at {}", root.display());
    }

    let mut out = Vec::new();
    for path in sorted_entries(root)? {
        if !path.is_dir() {
            continue;
        }
        let Some(stem) = stem_of(&path) else {
            continue;
        };
        let stem = stem.to_string();
        let descriptor = Some(root.join(format!("{}.{}", stem, DESCRIPTOR_EXTENSION)))
            .filter(|p| p.is_file());
        let thumbnail = MEDIA_EXTENSIONS
            .iter()
            .map(|ext| root.join(format!("{}.{}", stem, ext)))
            .find(|p| p.is_file());
        let items = sorted_entries(&path)?
            .into_iter()
            .filter(|p| p.is_file() && (is_media(p) || is_descriptor(p)))
            .collect();
        out.push(CategoryAssets {
            dir: path,
            stem,
            descriptor,
            thumbnail,
            items,
        });
    }
    Ok(out)
}
