//! Pointer-style input: mouse, stylus and single-finger touch drawing.
//!
//! All three share one action lifecycle (start, motion, end) implemented in
//! `actions.rs`. What differs is how raw events map onto that lifecycle and
//! which button bindings pick the tool; those parts live in `mouse.rs`,
//! `stylus.rs` and `touch_drawing.rs` as further `impl PenInputHandler`
//! blocks.

mod actions;
mod autoscroll;
mod mouse;
pub mod pressure;
mod stylus;
mod tap;
mod touch_drawing;


use std::time::Instant;

use kurbo::Point;

pub(crate) use self::touch_drawing::update_kinetic_scrolling;

use self::autoscroll::AutoScroll;
use self::pressure::PressureEstimator;
use super::events::{InputEvent, SequenceId};
use super::handler::{HandlerEnv, InputHandler};
use super::host::{InputHost, PageIndex, ToolHandler};
use super::tool::{Button, ToolType};
use crate::config::Config;

/// Device-specific part of a pointer handler.
#[derive(Debug)]
pub(crate) enum PointerDevice {
    Mouse,
    Stylus {
        /// Remaining warm-up events of the current contact; `None` once the
        /// contact is live (or none is in progress).
        events_to_ignore: Option<u32>,
    },
    TouchDrawing(TouchSlots),
}

/// Finger bookkeeping for touch drawing.
#[derive(Debug, Default)]
pub(crate) struct TouchSlots {
    primary: Option<SequenceId>,
    secondary: Option<SequenceId>,
    warned_disallowed: bool,
}

/// Pointer handler shared by mouse, stylus and touch drawing.
#[derive(Debug)]
pub(crate) struct PenInputHandler {
    device: PointerDevice,
    blocked: bool,

    /// Primary contact is down (button, tip or finger)
    device_class_pressed: bool,
    /// Secondary buttons held (middle / right, or stylus side buttons)
    modifier2: bool,
    modifier3: bool,

    input_running: bool,
    pen_in_widget: bool,

    last_event: Option<InputEvent>,
    /// Most recent event of this action that was over a page
    last_hit_event: Option<InputEvent>,
    sequence_start_page: Option<PageIndex>,
    /// Absolute position of the action start, used by the tap filter
    sequence_start_position: Point,
    last_action_start: u32,
    last_action_end: Option<u32>,

    pressure: PressureEstimator,
    /// Hand tool drag baseline in absolute coordinates
    scroll_start: Point,
    auto_scroll: AutoScroll,
}

impl PenInputHandler {
    pub(crate) fn mouse() -> Self {
        Self::with_device(PointerDevice::Mouse)
    }

    pub(crate) fn stylus() -> Self {
        Self::with_device(PointerDevice::Stylus {
            events_to_ignore: None,
        })
    }

    pub(crate) fn touch_drawing() -> Self {
        Self::with_device(PointerDevice::TouchDrawing(TouchSlots::default()))
    }

    fn with_device(device: PointerDevice) -> Self {
        Self {
            device,
            blocked: false,
            device_class_pressed: false,
            modifier2: false,
            modifier3: false,
            input_running: false,
            pen_in_widget: true,
            last_event: None,
            last_hit_event: None,
            sequence_start_page: None,
            sequence_start_position: Point::ZERO,
            last_action_start: 0,
            last_action_end: None,
            pressure: PressureEstimator::default(),
            scroll_start: Point::ZERO,
            auto_scroll: AutoScroll::default(),
        }
    }

    pub(crate) fn is_input_running(&self) -> bool {
        self.input_running
    }

    /// Next instant at which [`tick`](Self::tick) has work to do.
    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.auto_scroll.deadline()
    }

    /// Runs a due auto-scroll step.
    pub(crate) fn tick<H: InputHost>(&mut self, now: Instant, host: &mut H) {
        if let Some(step) = self.auto_scroll.poll(now) {
            host.scroll_relative(step.x, step.y);
        }
    }

    /// Drops every in-flight sequence without telling the pages.
    fn reset_sequence(&mut self) {
        self.device_class_pressed = false;
        self.modifier2 = false;
        self.modifier3 = false;
        self.input_running = false;
        self.pen_in_widget = true;
        self.sequence_start_page = None;
        self.last_hit_event = None;
        self.auto_scroll.cancel();
        match &mut self.device {
            PointerDevice::Mouse => {}
            PointerDevice::Stylus { events_to_ignore } => *events_to_ignore = None,
            PointerDevice::TouchDrawing(slots) => {
                slots.primary = None;
                slots.secondary = None;
            }
        }
    }

    /// Picks the tool for the current event from the button bindings.
    ///
    /// Returns false if input must not start at all.
    fn change_tool<H: InputHost>(&mut self, event: &InputEvent, env: &mut HandlerEnv<'_, H>) -> bool {
        match self.device {
            PointerDevice::Mouse => self.change_tool_mouse(env),
            PointerDevice::Stylus { .. } => self.change_tool_stylus(event, env),
            PointerDevice::TouchDrawing(_) => self.change_tool_touch(event, env),
        }
    }
}

impl<H: InputHost> InputHandler<H> for PenInputHandler {
    fn blocked(&self) -> bool {
        self.blocked
    }

    fn set_blocked(&mut self, blocked: bool) {
        self.blocked = blocked;
    }

    fn handle_impl(&mut self, event: &InputEvent, env: &mut HandlerEnv<'_, H>) -> bool {
        match self.device {
            PointerDevice::Mouse => self.handle_mouse(event, env),
            PointerDevice::Stylus { .. } => self.handle_stylus(event, env),
            PointerDevice::TouchDrawing(_) => self.handle_touch_drawing(event, env),
        }
    }

    fn on_block(&mut self, _env: &mut HandlerEnv<'_, H>) {
        self.reset_sequence();
    }

    fn on_unblock(&mut self, _env: &mut HandlerEnv<'_, H>) {
        self.reset_sequence();
    }
}

/// Activates the tool bound to `button`; returns true if the tool changed.
pub(crate) fn apply_button<H: ToolHandler + ?Sized>(
    host: &mut H,
    config: &Config,
    button: Button,
) -> bool {
    let binding = config.buttons.binding(button);
    if binding.keep_tool {
        return host.restore_toolbar_tool();
    }
    if binding.disable_drawing && host.toolbar_tool_type().is_drawing_tool() {
        return host.activate_button_tool(ToolType::Hand);
    }
    match binding.tool {
        Some(tool) => host.activate_button_tool(tool),
        None => host.restore_toolbar_tool(),
    }
}

/// Fires the tool-changed notification after a binding switched tools.
fn notify_tool_changed<H: ToolHandler + ?Sized>(host: &mut H, changed: bool) {
    if !changed {
        return;
    }
    // The text tool sets up its cursor state on selection only.
    if host.tool_type() == ToolType::Text {
        host.select_tool(ToolType::Text);
    }
    host.fire_tool_changed();
}
