//! Integration test: build catalogs from temporary sticker trees through the public API.

use lib::commands::{CommandFramework, Resolved};
use lib::dispatch::invoke_category;
use lib::stickers::{ActionDescriptor, CatalogBuilder, CatalogError};
use std::path::Path;
use std::sync::Arc;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
}

fn sample_tree(root: &Path) {
    write(&root.join("good_boy/woof.png"), "png");
    write(&root.join("good_boy/woof.json"), r#"{"aliases": ["bark"]}"#);
    write(&root.join("good_boy/sit.gif"), "gif");
    write(&root.join("good_boy.json"), r#"{"hidden": false, "message": "Pack: {}"}"#);
    write(&root.join("good_boy.png"), "png");
    write(&root.join("cats/meow.webm"), "webm");
}

#[test]
fn repeated_builds_are_identical() {
    let dir = tempfile::tempdir().expect("tempdir");
    sample_tree(dir.path());

    let a = CatalogBuilder::new(dir.path()).build().expect("first build");
    let b = CatalogBuilder::new(dir.path()).build().expect("second build");
    assert_eq!(a.registry.keys(), b.registry.keys());
    assert_eq!(a.index, b.index);
    for key in a.registry.keys() {
        assert_eq!(a.registry.get(key), b.registry.get(key), "action {}", key);
    }
    assert_eq!(a.index.categories(), ["Cats".to_string(), "GoodBoy".to_string()]);
}

#[test]
fn category_listing_uses_descriptor_template() {
    let dir = tempfile::tempdir().expect("tempdir");
    sample_tree(dir.path());
    let catalog = CatalogBuilder::new(dir.path()).build().expect("build");

    let Some(ActionDescriptor::Category(pack)) = catalog.registry.get("GoodBoy").map(|a| a.as_ref())
    else {
        panic!("GoodBoy should be a category action");
    };
    assert!(!pack.hidden);
    let request = invoke_category(pack);
    assert_eq!(request.content, "Pack: Sit Woof");
    assert_eq!(request.file, Some(dir.path().join("good_boy.png")));
}

#[test]
fn commands_reach_aliases() {
    let dir = tempfile::tempdir().expect("tempdir");
    sample_tree(dir.path());
    let catalog = Arc::new(CatalogBuilder::new(dir.path()).build().expect("build"));
    let commands = CommandFramework::new("!", catalog);

    let name = commands.parse("!bark").expect("prefixed");
    let Some(Resolved::Action(action)) = commands.resolve(name) else {
        panic!("bark should resolve to an action");
    };
    assert_eq!(action.name(), "Woof");
    assert!(commands.list_categories().contains("```Cats GoodBoy```"));
}

#[test]
fn invalid_root_descriptor_aborts_the_build() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(&dir.path().join("pack/woof.png"), "png");
    write(&dir.path().join("pack.json"), "this is not json");

    let err = CatalogBuilder::new(dir.path()).build().expect_err("must fail");
    assert!(matches!(err, CatalogError::Malformed { .. }));
    assert!(err.to_string().contains("pack.json"));
}
