//! Page-relative projection of input events.

use kurbo::Point;

use super::events::InputEvent;
use super::host::{Canvas, PageIndex};
use super::modifiers::Modifiers;

/// Pressure value meaning "the device reported none".
pub const NO_PRESSURE: f64 = -1.0;

/// Event position relative to a page, as handed to page callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionInputData {
    pub x: f64,
    pub y: f64,
    /// Filtered pressure or [`NO_PRESSURE`]
    pub pressure: f64,
    pub timestamp: u32,
    pub modifiers: Modifiers,
}

impl PositionInputData {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn has_pressure(&self) -> bool {
        self.pressure != NO_PRESSURE
    }

    pub fn is_alt_down(&self) -> bool {
        self.modifiers.alt
    }
}

/// Page under the event's canvas-local position.
pub fn page_at_position<C: Canvas + ?Sized>(canvas: &C, event: &InputEvent) -> Option<PageIndex> {
    canvas.page_at(event.relative)
}

/// Projects an event onto `page`.
///
/// Hardware pressure is passed through only when pressure sensitivity is
/// enabled; otherwise it is replaced by [`NO_PRESSURE`].
pub fn project_to_page<C: Canvas + ?Sized>(
    canvas: &C,
    page: PageIndex,
    event: &InputEvent,
    pressure_sensitivity: bool,
) -> PositionInputData {
    let origin = canvas.page_bounds(page).origin();
    let pressure = match event.pressure {
        Some(p) if pressure_sensitivity => p,
        _ => NO_PRESSURE,
    };
    PositionInputData {
        x: event.relative.x - origin.x,
        y: event.relative.y - origin.y,
        pressure,
        timestamp: event.timestamp,
        modifiers: event.modifiers,
    }
}
