//! Category and sticker configuration records.
//!
//! Both records are built from literal defaults and then overlaid with the optional
//! JSON descriptor sitting next to the asset (see the merge module). Field names
//! on the wire are the descriptor keys: `hidden`, `name`, `prefix`, `message`,
//! `file`, `aliases`. Keys that are not documented are kept in `extra`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::names::{camel_case, title_case};

/// Resolved configuration of one sticker pack (a directory under the sticker root).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    pub hidden: bool,
    /// Prepended to the default name of every sticker in the pack.
    pub prefix: String,
    /// Listing text; its single `{}` placeholder receives the space-joined sticker names.
    #[serde(rename = "message")]
    pub message_template: String,
    #[serde(rename = "file")]
    pub thumbnail: Option<PathBuf>,
    /// Filled by the catalog builder once every sticker in the pack is resolved.
    #[serde(skip)]
    pub item_names: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CategoryConfig {
    /// Defaults for a pack directory named `stem`, with an optional discovered thumbnail.
    pub fn defaults(stem: &str, thumbnail: Option<PathBuf>) -> Self {
        Self {
            name: camel_case(stem),
            hidden: true,
            prefix: String::new(),
            message_template: format!("{} stickers\n```{{}}```", title_case(stem)),
            thumbnail,
            item_names: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Resolved configuration of one sticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemConfig {
    pub name: String,
    pub hidden: bool,
    pub aliases: Vec<String>,
    /// Text posted along with the media.
    pub message: String,
    pub file: Option<PathBuf>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ItemConfig {
    pub fn defaults(stem: &str, prefix: &str) -> Self {
        Self {
            name: format!("{}{}", prefix, camel_case(stem)),
            hidden: true,
            aliases: Vec::new(),
            message: String::new(),
            file: None,
            extra: serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_defaults_derive_name_and_template() {
        let c = CategoryConfig::defaults("good_boy", None);
        assert_eq!(c.name, "GoodBoy");
        assert!(c.hidden);
        assert_eq!(c.prefix, "");
        assert_eq!(c.message_template, "Good Boy stickers\n```{}```");
        assert!(c.item_names.is_empty());
    }

    #[test]
    fn item_defaults_apply_prefix() {
        let i = ItemConfig::defaults("woof", "Dog");
        assert_eq!(i.name, "DogWoof");
        assert!(i.hidden);
        assert!(i.aliases.is_empty());
        assert_eq!(i.message, "");
        assert_eq!(i.file, None);
    }

    #[test]
    fn category_serializes_with_descriptor_keys() {
        let c = CategoryConfig::defaults("pack", Some(PathBuf::from("pack.png")));
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["message"], "Pack stickers\n```{}```");
        assert_eq!(v["file"], "pack.png");
        assert!(v.get("item_names").is_none());
    }
}
