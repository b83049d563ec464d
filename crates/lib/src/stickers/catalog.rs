//! Build the action registry from the sticker tree.
//!
//! Each pack directory yields one category action plus one item action per sticker
//! stem. Actions are plain data ([`ActionDescriptor`]); the dispatch module
//! interprets them at invocation time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::descriptor::{CategoryConfig, ItemConfig};
use super::error::CatalogError;
use super::index::CatalogIndex;
use super::merge::merge;
use super::walker::{is_descriptor, is_media, stem_of, walk_root, CategoryAssets};

/// An invocable action: a pack listing or a single sticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ActionDescriptor {
    Category(CategoryConfig),
    Item(ItemConfig),
}

impl ActionDescriptor {
    pub fn name(&self) -> &str {
        match self {
            ActionDescriptor::Category(c) => &c.name,
            ActionDescriptor::Item(i) => &i.name,
        }
    }

    pub fn hidden(&self) -> bool {
        match self {
            ActionDescriptor::Category(c) => c.hidden,
            ActionDescriptor::Item(i) => i.hidden,
        }
    }

    /// One-line description shown in help.
    pub fn help(&self) -> String {
        match self {
            ActionDescriptor::Category(c) => format!("Info about {} sticker category", c.name),
            ActionDescriptor::Item(i) => format!("Send {} sticker", i.name),
        }
    }
}

/// What to do when two actions claim the same name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Log both sources; the later registration replaces the earlier one.
    #[default]
    Warn,
    /// Abort the build.
    Reject,
}

/// Action name (primary name or alias) -> action. Keys are case-sensitive.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    actions: HashMap<String, Arc<ActionDescriptor>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under `key`, returning the replaced action if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        action: Arc<ActionDescriptor>,
    ) -> Option<Arc<ActionDescriptor>> {
        self.actions.insert(key.into(), action)
    }

    pub fn get(&self, key: &str) -> Option<&Arc<ActionDescriptor>> {
        self.actions.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.actions.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Distinct actions reachable under their own primary name, sorted by name.
    pub fn actions(&self) -> Vec<&Arc<ActionDescriptor>> {
        let mut out: Vec<&Arc<ActionDescriptor>> = self
            .actions
            .iter()
            .filter(|(key, action)| key.as_str() == action.name())
            .map(|(_, action)| action)
            .collect();
        out.sort_by(|a, b| a.name().cmp(b.name()));
        out
    }
}

/// The built catalog: registry plus the ordered category index. Read-only after build.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub registry: Registry,
    pub index: CatalogIndex,
}

/// Builds a [`Catalog`] from a sticker root directory.
pub struct CatalogBuilder {
    root: PathBuf,
    policy: CollisionPolicy,
    registry: Registry,
    index: CatalogIndex,
    /// key -> path of the asset that registered it, for collision diagnostics.
    sources: HashMap<String, PathBuf>,
}

/// Files sharing one stem inside a pack.
#[derive(Debug, Default, PartialEq, Eq)]
struct StemGroup {
    stem: String,
    media: Option<PathBuf>,
    descriptor: Option<PathBuf>,
}

impl CatalogBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            policy: CollisionPolicy::default(),
            registry: Registry::new(),
            index: CatalogIndex::new(),
            sources: HashMap::new(),
        }
    }

    pub fn on_collision(mut self, policy: CollisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Walk the root and build every action. Any error aborts the whole build.
    pub fn build(mut self) -> Result<Catalog, CatalogError> {
        let root = self.root.clone();
        for assets in walk_root(&root)? {
            self.add_category(&assets)?;
        }
        log::info!(
            "built sticker catalog: {} categories, {} action names",
            self.index.categories().len(),
            self.registry.len()
        );
        Ok(Catalog {
            registry: self.registry,
            index: self.index,
        })
    }

    fn add_category(&mut self, assets: &CategoryAssets) -> Result<(), CatalogError> {
        let defaults = CategoryConfig::defaults(&assets.stem, assets.thumbnail.clone());
        let mut category = match &assets.descriptor {
            Some(path) => merge(&defaults, path)?,
            None => defaults,
        };
        category.thumbnail = resolve_file(category.thumbnail, &assets.thumbnail, &self.root);

        let mut item_names = Vec::new();
        for group in group_by_stem(&assets.items) {
            let item = build_item(&group, &category.prefix, &assets.dir)?;
            let source = assets.dir.join(&group.stem);
            let name = item.name.clone();
            let keys: Vec<String> = std::iter::once(item.name.clone())
                .chain(item.aliases.iter().cloned())
                .collect();
            let action = Arc::new(ActionDescriptor::Item(item));
            for key in keys {
                self.register(key, action.clone(), &source)?;
            }
            item_names.push(name);
        }
        category.item_names = item_names;

        log::debug!(
            "category {} ({}): {} sticker(s)",
            category.name,
            assets.dir.display(),
            category.item_names.len()
        );
        let name = category.name.clone();
        self.register(
            name.clone(),
            Arc::new(ActionDescriptor::Category(category)),
            &assets.dir,
        )?;
        self.index.push(name);
        Ok(())
    }

    fn register(
        &mut self,
        key: String,
        action: Arc<ActionDescriptor>,
        source: &Path,
    ) -> Result<(), CatalogError> {
        if let Some(first) = self.sources.get(&key) {
            if first != source {
                match self.policy {
                    CollisionPolicy::Reject => {
                        return Err(CatalogError::Collision {
                            key,
                            first: first.clone(),
                            second: source.to_path_buf(),
                        });
                    }
                    CollisionPolicy::Warn => log::warn!(
                        "action name {:?} from {} replaces the one from {}",
                        key,
                        source.display(),
                        first.display()
                    ),
                }
            }
        }
        self.sources.insert(key.clone(), source.to_path_buf());
        self.registry.insert(key, action);
        Ok(())
    }
}

/// Group files by stem, keeping the order in which each stem was first seen.
fn group_by_stem(items: &[PathBuf]) -> Vec<StemGroup> {
    let mut groups: Vec<StemGroup> = Vec::new();
    let mut by_stem: HashMap<String, usize> = HashMap::new();
    for path in items {
        let Some(stem) = stem_of(path) else {
            continue;
        };
        let idx = *by_stem.entry(stem.to_string()).or_insert_with(|| {
            groups.push(StemGroup {
                stem: stem.to_string(),
                ..StemGroup::default()
            });
            groups.len() - 1
        });
        let group = &mut groups[idx];
        if is_media(path) {
            match &group.media {
                Some(kept) => log::warn!(
                    "multiple media files for sticker {:?}: using {}, ignoring {}",
                    group.stem,
                    kept.display(),
                    path.display()
                ),
                None => group.media = Some(path.clone()),
            }
        } else if is_descriptor(path) {
            group.descriptor = Some(path.clone());
        }
    }
    groups
}

/// Defaults, then discovered media, then the descriptor overlay.
fn build_item(group: &StemGroup, prefix: &str, dir: &Path) -> Result<ItemConfig, CatalogError> {
    let mut item = ItemConfig::defaults(&group.stem, prefix);
    item.file = group.media.clone();
    if let Some(path) = &group.descriptor {
        item = merge(&item, path)?;
        item.file = resolve_file(item.file, &group.media, dir);
    }
    Ok(item)
}

/// A relative path supplied by a descriptor is taken relative to `base`.
fn resolve_file(file: Option<PathBuf>, discovered: &Option<PathBuf>, base: &Path) -> Option<PathBuf> {
    match file {
        Some(p) if p.is_relative() && Some(&p) != discovered.as_ref() => Some(base.join(p)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    fn item<'a>(catalog: &'a Catalog, key: &str) -> &'a ItemConfig {
        match catalog.registry.get(key).map(|a| a.as_ref()) {
            Some(ActionDescriptor::Item(i)) => i,
            other => panic!("expected item action for {}, got {:?}", key, other),
        }
    }

    fn category<'a>(catalog: &'a Catalog, key: &str) -> &'a CategoryConfig {
        match catalog.registry.get(key).map(|a| a.as_ref()) {
            Some(ActionDescriptor::Category(c)) => c,
            other => panic!("expected category action for {}, got {:?}", key, other),
        }
    }

    #[test]
    fn single_sticker_pack() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("good_boy/woof.png"), "png");

        let catalog = CatalogBuilder::new(root).build().unwrap();
        let woof = item(&catalog, "Woof");
        assert!(woof.hidden);
        assert_eq!(woof.file, Some(root.join("good_boy/woof.png")));
        assert_eq!(woof.message, "");

        let pack = category(&catalog, "GoodBoy");
        assert!(pack.hidden);
        assert_eq!(pack.item_names, vec!["Woof".to_string()]);
        assert_eq!(catalog.index.categories(), ["GoodBoy".to_string()]);
        assert_eq!(catalog.registry.len(), 2);
    }

    #[test]
    fn category_descriptor_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("good_boy/woof.png"), "png");
        write(
            &root.join("good_boy.json"),
            r#"{"hidden": false, "message": "Pack: {}", "prefix": "Dog"}"#,
        );

        let catalog = CatalogBuilder::new(root).build().unwrap();
        let pack = category(&catalog, "GoodBoy");
        assert!(!pack.hidden);
        assert_eq!(pack.message_template, "Pack: {}");
        assert_eq!(pack.item_names, vec!["DogWoof".to_string()]);
        assert!(catalog.registry.contains_key("DogWoof"));
        assert!(!catalog.registry.contains_key("Woof"));
    }

    #[test]
    fn aliases_map_to_the_same_action() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("good_boy/woof.png"), "png");
        write(&root.join("good_boy/woof.json"), r#"{"aliases": ["bark"]}"#);

        let catalog = CatalogBuilder::new(root).build().unwrap();
        let primary = catalog.registry.get("Woof").unwrap();
        let alias = catalog.registry.get("bark").unwrap();
        assert!(Arc::ptr_eq(primary, alias));
        assert_eq!(category(&catalog, "GoodBoy").item_names, vec!["Woof".to_string()]);
    }

    #[test]
    fn descriptor_file_wins_over_discovered_media() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("pack/woof.png"), "png");
        write(&root.join("pack/woof.json"), r#"{"file": "other.gif"}"#);

        let catalog = CatalogBuilder::new(root).build().unwrap();
        assert_eq!(item(&catalog, "Woof").file, Some(root.join("pack/other.gif")));
    }

    #[test]
    fn descriptor_applies_when_media_sorts_first() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("pack/woof.gif"), "gif");
        write(
            &root.join("pack/woof.json"),
            r#"{"aliases": ["bark"], "file": "other.png"}"#,
        );

        let catalog = CatalogBuilder::new(root).build().unwrap();
        let woof = item(&catalog, "Woof");
        assert_eq!(woof.file, Some(root.join("pack/other.png")));
        assert_eq!(woof.aliases, vec!["bark".to_string()]);
        assert!(Arc::ptr_eq(
            catalog.registry.get("Woof").unwrap(),
            catalog.registry.get("bark").unwrap()
        ));
        assert_eq!(category(&catalog, "Pack").item_names, vec!["Woof".to_string()]);
    }

    #[test]
    fn grouping_ignores_file_order() {
        let media = PathBuf::from("pack/woof.gif");
        let descriptor = PathBuf::from("pack/woof.json");
        let forward = group_by_stem(&[media.clone(), descriptor.clone()]);
        let backward = group_by_stem(&[descriptor.clone(), media.clone()]);
        assert_eq!(forward, backward);
        assert_eq!(
            forward,
            vec![StemGroup {
                stem: "woof".to_string(),
                media: Some(media),
                descriptor: Some(descriptor),
            }]
        );
    }

    #[test]
    fn descriptor_only_sticker_has_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("pack/hello.json"), r#"{"message": "hi there"}"#);

        let catalog = CatalogBuilder::new(root).build().unwrap();
        let hello = item(&catalog, "Hello");
        assert_eq!(hello.message, "hi there");
        assert_eq!(hello.file, None);
    }

    #[test]
    fn first_media_file_wins_for_duplicate_stems() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("pack/woof.gif"), "gif");
        write(&root.join("pack/woof.png"), "png");

        let catalog = CatalogBuilder::new(root).build().unwrap();
        assert_eq!(item(&catalog, "Woof").file, Some(root.join("pack/woof.gif")));
        assert_eq!(category(&catalog, "Pack").item_names.len(), 1);
    }

    #[test]
    fn empty_pack_still_registers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("empty")).unwrap();
        let catalog = CatalogBuilder::new(dir.path()).build().unwrap();
        assert!(category(&catalog, "Empty").item_names.is_empty());
    }

    #[test]
    fn malformed_category_descriptor_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("pack/woof.png"), "png");
        write(&root.join("pack.json"), "{not json");
        let err = CatalogBuilder::new(root).build().unwrap_err();
        assert!(matches!(err, CatalogError::Malformed { .. }));
    }

    #[test]
    fn collisions_last_write_wins_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("alpha/woof.png"), "png");
        write(&root.join("beta/woof.gif"), "gif");

        let catalog = CatalogBuilder::new(root).build().unwrap();
        assert_eq!(item(&catalog, "Woof").file, Some(root.join("beta/woof.gif")));
        assert_eq!(category(&catalog, "Alpha").item_names, vec!["Woof".to_string()]);
    }

    #[test]
    fn collisions_rejected_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("alpha/woof.png"), "png");
        write(&root.join("beta/woof.gif"), "gif");

        let err = CatalogBuilder::new(root)
            .on_collision(CollisionPolicy::Reject)
            .build()
            .unwrap_err();
        match err {
            CatalogError::Collision { key, first, second } => {
                assert_eq!(key, "Woof");
                assert_eq!(first, root.join("alpha/woof"));
                assert_eq!(second, root.join("beta/woof"));
            }
            other => panic!("expected collision, got {:?}", other),
        }
    }

    #[test]
    fn alias_equal_to_own_name_is_not_a_collision() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("pack/woof.png"), "png");
        write(&root.join("pack/woof.json"), r#"{"aliases": ["Woof", "woof"]}"#);

        let catalog = CatalogBuilder::new(root)
            .on_collision(CollisionPolicy::Reject)
            .build()
            .unwrap();
        assert!(catalog.registry.contains_key("woof"));
    }

    #[test]
    fn actions_lists_primary_names_only() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("pack/woof.png"), "png");
        write(&root.join("pack/woof.json"), r#"{"aliases": ["bark"]}"#);

        let catalog = CatalogBuilder::new(root).build().unwrap();
        let names: Vec<&str> = catalog.registry.actions().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["Pack", "Woof"]);
        assert_eq!(catalog.registry.keys(), vec!["Pack", "Woof", "bark"]);
    }

    #[test]
    fn help_lines() {
        let item = ActionDescriptor::Item(ItemConfig::defaults("woof", ""));
        assert_eq!(item.help(), "Send Woof sticker");
        let cat = ActionDescriptor::Category(CategoryConfig::defaults("pack", None));
        assert_eq!(cat.help(), "Info about Pack sticker category");
    }
}
