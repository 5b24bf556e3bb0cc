//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The map lives
//! in Rust so it's shared across WASM and native hosts.

use crate::input::Modifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Confirm,
    Back,
    /// Pick a candidate by display index (0-based).
    PickCandidate(usize),
    ToggleSelectionMode,
    CancelQuery,
    Reset,
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action. Returns `None` if the combo has
    /// no binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if modifiers.command() {
            return match key {
                "r" | "R" => Some(ShortcutAction::Reset),
                _ => None,
            };
        }

        match key {
            "Enter" => Some(ShortcutAction::Confirm),
            "Backspace" | "Escape" => Some(ShortcutAction::Back),
            "m" | "M" => Some(ShortcutAction::ToggleSelectionMode),
            "c" | "C" => Some(ShortcutAction::CancelQuery),
            _ => digit_index(key).map(ShortcutAction::PickCandidate),
        }
    }
}

/// `"1"`..`"9"` → 0..8.
fn digit_index(key: &str) -> Option<usize> {
    let mut chars = key.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    match c.to_digit(10)? {
        0 => None,
        d => Some(d as usize - 1),
    }
}
