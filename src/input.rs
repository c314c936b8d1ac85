//! Keyboard input translation
//!
//! Winit key events become a [`KeyInput`] (modifiers, trigger, typed text),
//! which [`translate`] maps to an editor [`Command`]. Menu accelerators are
//! checked first, so a bound chord never types into the document.

use crate::accelerator::{Modifiers, Trigger};
use crate::document::Motion;
use crate::menu::{Item, Keymap};
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{Key, ModifiersState};

/// Changes to the document text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    Insert(String),
    Backspace,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Activate(Item),
    Edit(EditCommand),
    Move { motion: Motion, extend: bool },
    /// One screen up or down
    Page { down: bool, extend: bool },
    Copy,
    Cut,
    Paste,
    SelectAll,
    CloseMenu,
}

/// A pressed key, reduced to what the editor cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub modifiers: Modifiers,
    pub trigger: Trigger,
    /// Text the key produces, if any
    pub text: Option<String>,
}

impl KeyInput {
    /// None for releases and keys with no usable identity
    pub fn from_event(event: &KeyEvent, modifiers: ModifiersState) -> Option<Self> {
        if event.state != ElementState::Pressed {
            return None;
        }
        let trigger = match &event.logical_key {
            Key::Character(ch) => Trigger::Char(ch.to_lowercase()),
            Key::Named(named) => Trigger::Named(format!("{named:?}")),
            _ => return None,
        };
        Some(Self {
            modifiers: Modifiers {
                cmd: modifiers.super_key(),
                ctrl: modifiers.control_key(),
                alt: modifiers.alt_key(),
                shift: modifiers.shift_key(),
            },
            trigger,
            text: event.text.as_ref().map(|t| t.to_string()),
        })
    }
}

/// Map a key to a command; None when the key does nothing here
pub fn translate(key: &KeyInput, keymap: &Keymap, has_document: bool) -> Option<Command> {
    if let Some(item) = keymap.lookup(&key.modifiers, &key.trigger) {
        return Some(Command::Activate(item));
    }

    if matches!(&key.trigger, Trigger::Named(name) if name == "Escape") {
        return Some(Command::CloseMenu);
    }

    if !has_document {
        return None;
    }

    let command = key.modifiers.is_command();
    let extend = key.modifiers.shift;

    if command {
        if let Trigger::Char(ch) = &key.trigger {
            return match ch.as_str() {
                "a" => Some(Command::SelectAll),
                "c" => Some(Command::Copy),
                "x" => Some(Command::Cut),
                "v" => Some(Command::Paste),
                _ => None,
            };
        }
    }

    if let Trigger::Named(name) = &key.trigger {
        let motion = match name.as_str() {
            "ArrowLeft" => Some(Motion::Left),
            "ArrowRight" => Some(Motion::Right),
            "ArrowUp" => Some(Motion::Up),
            "ArrowDown" => Some(Motion::Down),
            "Home" if command => Some(Motion::DocStart),
            "End" if command => Some(Motion::DocEnd),
            "Home" => Some(Motion::LineStart),
            "End" => Some(Motion::LineEnd),
            _ => None,
        };
        if let Some(motion) = motion {
            return Some(Command::Move { motion, extend });
        }

        match name.as_str() {
            "PageUp" => return Some(Command::Page { down: false, extend }),
            "PageDown" => return Some(Command::Page { down: true, extend }),
            "Backspace" => return Some(Command::Edit(EditCommand::Backspace)),
            "Delete" => return Some(Command::Edit(EditCommand::Delete)),
            "Enter" => return Some(Command::Edit(EditCommand::Insert("\n".to_string()))),
            "Tab" => return Some(Command::Edit(EditCommand::Insert("\t".to_string()))),
            _ => {}
        }
    }

    // Command chords never type, whatever text the platform attaches
    if key.modifiers.cmd || key.modifiers.ctrl {
        return None;
    }

    let text: String = key
        .text
        .as_deref()?
        .chars()
        .filter(|c| !c.is_control())
        .collect();
    if text.is_empty() {
        return None;
    }
    Some(Command::Edit(EditCommand::Insert(text)))
}
