//! Ordered list of category names behind the top-level "stickers" command.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogIndex {
    categories: Vec<String>,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, name: String) {
        self.categories.push(name);
    }

    /// Category names in registration order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Help text listing every category; `command_prefix` is shown in the usage hint.
    pub fn list_categories(&self, command_prefix: &str) -> String {
        format!(
            "Here's a list of our sticker packs!\nType `{}[pack-name]` to see a list of the stickers inside of that pack.```{}```",
            command_prefix,
            self.categories.join(" ")
        )
        .trim()
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_categories_in_registration_order() {
        let mut index = CatalogIndex::new();
        index.push("Zebra".to_string());
        index.push("Alpaca".to_string());
        let text = index.list_categories("!");
        assert!(text.starts_with("Here's a list of our sticker packs!"));
        assert!(text.contains("Type `![pack-name]`"));
        assert!(text.ends_with("```Zebra Alpaca```"));
    }
}
