//! Keyboard modifier state carried by every input event.

use serde::{Deserialize, Serialize};

/// Keyboard modifier state.
///
/// Snapshotted by the toolkit for each event. Alt is forwarded while dragging
/// a selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    /// Shift key pressed
    #[serde(default)]
    pub shift: bool,
    /// Ctrl key pressed
    #[serde(default)]
    pub ctrl: bool,
    /// Alt key pressed
    #[serde(default)]
    pub alt: bool,
}

impl Modifiers {
    /// Creates a new Modifiers instance with all keys released.
    pub fn new() -> Self {
        Self {
            shift: false,
            ctrl: false,
            alt: false,
        }
    }
}
