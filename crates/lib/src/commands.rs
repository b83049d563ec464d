//! Prefix commands over the sticker catalog.
//!
//! Every registry key is a command name. Two built-ins sit in front of the catalog:
//! `stickers` lists the packs and `help` lists every visible command.

use std::sync::Arc;

use crate::stickers::{ActionDescriptor, Catalog};

pub const LIST_COMMAND: &str = "stickers";
pub const HELP_COMMAND: &str = "help";

/// What a command name resolves to.
#[derive(Debug, Clone)]
pub enum Resolved {
    ListCategories,
    Help,
    Action(Arc<ActionDescriptor>),
}

/// Resolves prefixed messages to built-ins or catalog actions.
pub struct CommandFramework {
    prefix: String,
    catalog: Arc<Catalog>,
}

impl CommandFramework {
    pub fn new(prefix: impl Into<String>, catalog: Arc<Catalog>) -> Self {
        for builtin in [LIST_COMMAND, HELP_COMMAND] {
            if catalog.registry.contains_key(builtin) {
                log::warn!(
                    "sticker action {:?} is shadowed by the built-in command of the same name",
                    builtin
                );
            }
        }
        Self {
            prefix: prefix.into(),
            catalog,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Command name of a message, when it starts with the prefix.
    pub fn parse<'m>(&self, content: &'m str) -> Option<&'m str> {
        let rest = content.strip_prefix(self.prefix.as_str())?;
        rest.split_whitespace().next()
    }

    pub fn resolve(&self, name: &str) -> Option<Resolved> {
        match name {
            LIST_COMMAND => Some(Resolved::ListCategories),
            HELP_COMMAND => Some(Resolved::Help),
            _ => self
                .catalog
                .registry
                .get(name)
                .map(|a| Resolved::Action(a.clone())),
        }
    }

    /// Text for the `stickers` command.
    pub fn list_categories(&self) -> String {
        self.catalog.index.list_categories(&self.prefix)
    }

    /// Built-ins plus every non-hidden action, one per line.
    pub fn help_text(&self) -> String {
        let mut lines = vec![
            format!("`{}{}` Prints out a list of sticker categories", self.prefix, LIST_COMMAND),
            format!("`{}{}` Shows this message", self.prefix, HELP_COMMAND),
        ];
        for action in self.catalog.registry.actions() {
            if action.hidden() || matches!(action.name(), LIST_COMMAND | HELP_COMMAND) {
                continue;
            }
            lines.push(format!("`{}{}` {}", self.prefix, action.name(), action.help()));
        }
        lines.join("\n")
    }
}
