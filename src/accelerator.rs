//! Accelerator parsing and matching
//!
//! Supports the usual single-chord syntax used in menus:
//! - "ctrl+s" - modifier + key
//! - "ctrl+shift+s" - several modifiers
//! - "f5" - a named key on its own

use crate::error::{PetError, Result};
use std::fmt;

/// Modifier keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub cmd: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    /// Ctrl on most platforms, Cmd on macOS
    pub fn is_command(&self) -> bool {
        if cfg!(target_os = "macos") {
            self.cmd
        } else {
            self.ctrl
        }
    }
}

/// The key that triggers a chord
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Character key, stored lowercase
    Char(String),
    /// Named key (Enter, ArrowUp, F5, ...)
    Named(String),
}

/// A key with its modifiers, e.g. "ctrl+shift+s"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    pub modifiers: Modifiers,
    pub trigger: Trigger,
}

impl Chord {
    /// Parse a chord like "ctrl+s" or "shift+alt+s" or just "f5"
    pub fn parse(input: &str) -> Result<Self> {
        let fail = |reason: &str| PetError::Accelerator {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = input.trim().split('+').map(str::trim).collect();
        let Some((trigger_part, mod_parts)) = parts.split_last() else {
            return Err(fail("empty accelerator"));
        };
        if trigger_part.is_empty() {
            return Err(fail("missing key"));
        }

        let mut modifiers = Modifiers::default();
        for mod_str in mod_parts {
            match mod_str.to_lowercase().as_str() {
                "cmd" | "super" | "meta" => modifiers.cmd = true,
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" | "option" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                // "mod" picks the platform's command key
                "mod" => {
                    if cfg!(target_os = "macos") {
                        modifiers.cmd = true
                    } else {
                        modifiers.ctrl = true
                    }
                }
                other => return Err(fail(&format!("unknown modifier {other:?}"))),
            }
        }

        let lower = trigger_part.to_lowercase();
        let trigger = if lower.chars().count() == 1 {
            Trigger::Char(lower)
        } else {
            let named = match lower.as_str() {
                "enter" | "return" => "Enter",
                "tab" => "Tab",
                "backspace" => "Backspace",
                "delete" | "del" => "Delete",
                "escape" | "esc" => "Escape",
                "space" => "Space",
                "up" | "arrowup" => "ArrowUp",
                "down" | "arrowdown" => "ArrowDown",
                "left" | "arrowleft" => "ArrowLeft",
                "right" | "arrowright" => "ArrowRight",
                "home" => "Home",
                "end" => "End",
                "pageup" => "PageUp",
                "pagedown" => "PageDown",
                f if f.starts_with('f') && f[1..].parse::<u8>().is_ok_and(|n| (1..=24).contains(&n)) => {
                    return Ok(Chord {
                        modifiers,
                        trigger: Trigger::Named(f.to_uppercase()),
                    });
                }
                _ => return Err(fail("unknown key")),
            };
            Trigger::Named(named.to_string())
        };

        Ok(Chord { modifiers, trigger })
    }

    /// Check if this chord matches the given input
    pub fn matches(&self, modifiers: &Modifiers, trigger: &Trigger) -> bool {
        self.modifiers == *modifiers && self.trigger == *trigger
    }
}

impl fmt::Display for Chord {
    /// Menu hint form, e.g. "Ctrl+Shift+S"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.cmd {
            f.write_str("Cmd+")?;
        }
        if self.modifiers.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.modifiers.alt {
            f.write_str("Alt+")?;
        }
        if self.modifiers.shift {
            f.write_str("Shift+")?;
        }
        match &self.trigger {
            Trigger::Char(c) => f.write_str(&c.to_uppercase()),
            Trigger::Named(name) => f.write_str(name),
        }
    }
}
