use super::events::{EventKind, InputEvent};
use super::host::Canvas;

/// Forwards key events to the canvas; `button` carries the key value.
pub(crate) fn handle_key<C: Canvas + ?Sized>(event: &InputEvent, canvas: &mut C) -> bool {
    match event.kind {
        EventKind::KeyPress => canvas.on_key(true, event.button),
        EventKind::KeyRelease => canvas.on_key(false, event.button),
        _ => false,
    }
}
