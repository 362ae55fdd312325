//! Input handling for a paged drawing canvas.
//!
//! Raw toolkit events are classified per device, then routed by
//! [`InputContext`] to the handler for their class: mouse, stylus, touch
//! drawing, touch gestures or keyboard. Handlers turn them into page
//! callbacks, view scrolling and zoom on the host.

pub mod context;
pub mod devices;
pub mod events;
pub mod geometry_tool;
pub mod hand;
pub mod host;
pub mod modifiers;
pub mod pen;
pub mod position;
pub mod tool;
pub mod touch_disable;

mod handler;
mod keyboard;
mod touch;

// Re-export commonly used types at module level
pub use context::{DeviceType, InputContext};
pub use devices::DeviceClassMap;
pub use events::{
    BUTTON_MIDDLE, BUTTON_PRIMARY, BUTTON_SECONDARY, DeviceClass, EventKind, InputEvent,
    InputSource, RawEventKind, RawInputEvent, SequenceId,
};
pub use geometry_tool::GeometryToolHandler;
pub use hand::HandRecognition;
pub use host::{
    Canvas, InputHost, PageIndex, SelectionGrip, ToolHandler, UndoControl, ZoomControl,
};
pub use modifiers::Modifiers;
pub use position::{NO_PRESSURE, PositionInputData};
pub use tool::{Button, DrawingType, ToolType};
pub use touch_disable::{SessionKind, TouchDisable, TouchDisableError};
