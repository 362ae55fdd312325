//! Collaborator interfaces the input subsystem drives.
//!
//! The document model, rendering, tool state, zoom and undo all live outside
//! this crate. Handlers talk to them only through the traits below; a host
//! application implements all four and hands itself to
//! [`InputContext`](crate::input::InputContext).

use kurbo::{Point, Rect, Vec2};

use super::position::PositionInputData;
use super::tool::{DrawingType, ToolType};

/// Index of a page inside the canvas layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageIndex(pub usize);

/// Part of an active selection hit by a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionGrip {
    Move,
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Rotate,
}

/// Canvas and page surface.
///
/// Coordinates passed to `page_at` are canvas-local. Page callbacks receive
/// positions relative to the page's top-left corner in display pixels and
/// return whether the page consumed the event.
pub trait Canvas {
    /// Page under a canvas-local position, if any.
    fn page_at(&self, position: Point) -> Option<PageIndex>;
    /// Canvas-local display rectangle of a page.
    fn page_bounds(&self, page: PageIndex) -> Rect;

    fn on_button_press(&mut self, page: PageIndex, pos: &PositionInputData) -> bool;
    fn on_motion(&mut self, page: PageIndex, pos: &PositionInputData) -> bool;
    fn on_button_release(&mut self, page: PageIndex, pos: &PositionInputData) -> bool;
    fn on_tap(&mut self, page: PageIndex, pos: &PositionInputData) -> bool;
    fn on_double_press(&mut self, page: PageIndex, pos: &PositionInputData) -> bool;
    fn on_triple_press(&mut self, page: PageIndex, pos: &PositionInputData) -> bool;
    /// Side-button click of a stylus that is not drawing.
    fn on_button_click(&mut self, page: PageIndex, pos: &PositionInputData) -> bool;
    /// Abandons the input sequence currently running on a page.
    fn on_sequence_cancel(&mut self, page: PageIndex, device: Option<&str>);

    /// Page of the active selection, `None` if nothing is selected.
    fn selection_page(&self) -> Option<PageIndex>;
    /// Hit-tests the active selection at a page-relative position.
    fn selection_grip_at(&self, x: f64, y: f64) -> Option<SelectionGrip>;
    fn selection_grab(&mut self, grip: SelectionGrip, x: f64, y: f64);
    fn selection_is_moving(&self) -> bool;
    fn selection_drag(&mut self, x: f64, y: f64, alt: bool);
    fn selection_release(&mut self);
    fn selection_copy(&mut self);
    fn clear_selection(&mut self);

    /// Scrolls the view by a delta in display pixels.
    fn scroll_relative(&mut self, dx: f64, dy: f64);
    /// Current scroll offset of the view.
    fn scroll_offset(&self) -> Vec2;
    /// Visible size of the canvas widget.
    fn viewport_size(&self) -> (f64, f64);
    /// Enables the toolkit's own kinetic touchscreen scrolling.
    fn set_touchscreen_scrolling(&mut self, enabled: bool);
    fn focus(&mut self);
    /// Key events that reach the keyboard handler.
    fn on_key(&mut self, pressed: bool, keyval: u32) -> bool {
        let _ = (pressed, keyval);
        false
    }
}

/// Tool state owned by the host.
pub trait ToolHandler {
    /// Tool currently driving input (may be a temporary button tool).
    fn tool_type(&self) -> ToolType;
    /// Tool selected in the toolbar.
    fn toolbar_tool_type(&self) -> ToolType;
    fn drawing_type(&self) -> DrawingType {
        DrawingType::Default
    }
    /// Temporarily activates `tool`; returns true if the active tool changed.
    fn activate_button_tool(&mut self, tool: ToolType) -> bool;
    /// Points the active tool back at the toolbar tool; returns true on change.
    fn restore_toolbar_tool(&mut self) -> bool;
    /// Re-selects a tool so its per-activation state is initialised.
    fn select_tool(&mut self, tool: ToolType);
    fn fire_tool_changed(&mut self);

    fn is_single_page_tool(&self) -> bool {
        self.tool_type().is_single_page_tool(self.drawing_type())
    }
}

/// Zoom gesture sink.
pub trait ZoomControl {
    fn start_zoom_sequence(&mut self, center: Point);
    /// `zoom` is relative to the sequence start when `relative` is set.
    fn zoom_sequence_change(&mut self, zoom: f64, relative: bool, scroll: Option<Vec2>);
    fn end_zoom_sequence(&mut self);
    fn is_zoom_fit_mode(&self) -> bool;
    fn set_zoom_fit_mode(&mut self, enabled: bool);
}

/// Undo sink for the two-finger tap gesture.
pub trait UndoControl {
    fn can_undo(&self) -> bool;
    fn undo(&mut self);
}

/// Everything the input subsystem needs from its host.
pub trait InputHost: Canvas + ToolHandler + ZoomControl + UndoControl {}

impl<T> InputHost for T where T: Canvas + ToolHandler + ZoomControl + UndoControl {}
