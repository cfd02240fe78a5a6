//! Keyboard shortcut map for the widget.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Widget operations reachable from the keyboard.
pub enum WidgetShortcut {
    /// `ArrowUp`.
    Increment,
    /// `ArrowDown`.
    Decrement,
    /// `r` / `R`.
    Reset,
    /// `e` / `E`.
    ToggleEmojis,
}

/// Maps a `KeyboardEvent.key` value to a shortcut. Unrecognized keys map to `None`.
pub fn shortcut_for_key(key: &str) -> Option<WidgetShortcut> {
    match key {
        "ArrowUp" => Some(WidgetShortcut::Increment),
        "ArrowDown" => Some(WidgetShortcut::Decrement),
        "r" | "R" => Some(WidgetShortcut::Reset),
        "e" | "E" => Some(WidgetShortcut::ToggleEmojis),
        _ => None,
    }
}
