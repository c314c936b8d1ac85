//! Menu bar structure and item enablement
//!
//! The menu bar is fixed: menus, their items and separators are described by
//! [`Menu::entries`]. Which items can be used depends only on the model state.

use crate::accelerator::{Chord, Modifiers, Trigger};
use crate::error::Result;
use crate::model::ModelState;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Menu {
    File,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Item {
    New,
    NewFromFile,
    Open,
    Reopen,
    Save,
    SaveAs,
    Close,
    Clear,
    Quit,
}

impl Menu {
    pub const ALL: [Menu; 2] = [Menu::File, Menu::Edit];

    pub fn label(self) -> &'static str {
        match self {
            Menu::File => "File",
            Menu::Edit => "Edit",
        }
    }

    /// Items in display order, `None` standing for a separator
    pub fn entries(self) -> &'static [Option<Item>] {
        match self {
            Menu::File => &[
                Some(Item::New),
                Some(Item::NewFromFile),
                None,
                Some(Item::Open),
                Some(Item::Reopen),
                None,
                Some(Item::Save),
                Some(Item::SaveAs),
                None,
                Some(Item::Close),
                None,
                Some(Item::Quit),
            ],
            Menu::Edit => &[Some(Item::Clear)],
        }
    }
}

const ITEM_COUNT: usize = 9;

impl Item {
    pub const ALL: [Item; ITEM_COUNT] = [
        Item::New,
        Item::NewFromFile,
        Item::Open,
        Item::Reopen,
        Item::Save,
        Item::SaveAs,
        Item::Close,
        Item::Clear,
        Item::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Item::New => "New",
            Item::NewFromFile => "New from file...",
            Item::Open => "Open...",
            Item::Reopen => "Reopen",
            Item::Save => "Save",
            Item::SaveAs => "Save As...",
            Item::Close => "Close",
            Item::Clear => "Clear",
            Item::Quit => "Quit",
        }
    }

    /// Key used for this item in the `[shortcuts]` config table
    pub fn config_name(self) -> &'static str {
        match self {
            Item::New => "new",
            Item::NewFromFile => "new_from_file",
            Item::Open => "open",
            Item::Reopen => "reopen",
            Item::Save => "save",
            Item::SaveAs => "save_as",
            Item::Close => "close",
            Item::Clear => "clear",
            Item::Quit => "quit",
        }
    }

    pub fn from_config_name(name: &str) -> Option<Item> {
        Item::ALL.into_iter().find(|item| item.config_name() == name)
    }

    pub fn default_accelerator(self) -> Option<&'static str> {
        match self {
            Item::New => Some("mod+n"),
            Item::Open => Some("mod+o"),
            Item::Save => Some("mod+s"),
            Item::SaveAs => Some("mod+shift+s"),
            Item::Close => Some("mod+w"),
            Item::Quit => Some("mod+q"),
            Item::NewFromFile | Item::Reopen | Item::Clear => None,
        }
    }

    /// Whether the item can be used in the given model state
    pub fn is_enabled(self, state: &ModelState) -> bool {
        let unsaved_file = state.has_document && state.has_file && !state.synchronized;
        match self {
            Item::Clear => state.has_document && state.document_len > 0,
            Item::Reopen | Item::Save => unsaved_file,
            Item::SaveAs | Item::Close => state.has_document,
            Item::New | Item::NewFromFile | Item::Open | Item::Quit => true,
        }
    }
}

/// Enablement of every item for one model state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemStates {
    enabled: [bool; ITEM_COUNT],
}

impl ItemStates {
    pub fn from_state(state: &ModelState) -> Self {
        Self {
            enabled: Item::ALL.map(|item| item.is_enabled(state)),
        }
    }

    pub fn is_enabled(&self, item: Item) -> bool {
        Item::ALL
            .iter()
            .position(|&i| i == item)
            .is_some_and(|idx| self.enabled[idx])
    }
}

/// Accelerator assigned to each item
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    bindings: HashMap<Item, Chord>,
}

impl Keymap {
    /// Default bindings with per-item overrides; an empty override string
    /// removes the binding
    pub fn new(overrides: &HashMap<Item, String>) -> Result<Self> {
        let mut bindings = HashMap::new();
        for item in Item::ALL {
            let spec = match overrides.get(&item) {
                Some(spec) => Some(spec.as_str()),
                None => item.default_accelerator(),
            };
            if let Some(spec) = spec.filter(|s| !s.trim().is_empty()) {
                bindings.insert(item, Chord::parse(spec)?);
            }
        }
        Ok(Self { bindings })
    }

    pub fn chord(&self, item: Item) -> Option<&Chord> {
        self.bindings.get(&item)
    }

    /// Item bound to the given key, if any
    pub fn lookup(&self, modifiers: &Modifiers, trigger: &Trigger) -> Option<Item> {
        Item::ALL.into_iter().find(|item| {
            self.bindings
                .get(item)
                .is_some_and(|chord| chord.matches(modifiers, trigger))
        })
    }
}
