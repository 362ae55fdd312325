use log::warn;

use super::{PenInputHandler, PointerDevice, TouchSlots, apply_button, notify_tool_changed};
use crate::config::Config;
use crate::input::events::{EventKind, InputEvent};
use crate::input::handler::HandlerEnv;
use crate::input::host::{InputHost, ToolHandler};
use crate::input::position::page_at_position;
use crate::input::tool::{Button, ToolType};

impl PenInputHandler {
    fn slots(&mut self) -> Option<&mut TouchSlots> {
        match &mut self.device {
            PointerDevice::TouchDrawing(slots) => Some(slots),
            _ => None,
        }
    }

    /// Processes one touchscreen event in drawing mode.
    ///
    /// The first finger draws. As soon as a second finger lands the stroke is
    /// abandoned and everything is left to the gesture handler until both
    /// fingers are gone. Returns false for events the gesture handler should
    /// also see.
    pub(super) fn handle_touch_drawing<H: InputHost>(
        &mut self,
        event: &InputEvent,
        env: &mut HandlerEnv<'_, H>,
    ) -> bool {
        let must_end = event.kind == EventKind::ButtonRelease
            || (event.kind == EventKind::GrabBroken && self.device_class_pressed);

        match event.kind {
            EventKind::Enter => {
                self.action_enter_window(event, env);
                return false;
            }
            EventKind::Leave => {
                self.action_leave_window(event, env);
                return false;
            }
            _ => {}
        }

        let (primary, secondary) = match self.slots() {
            Some(slots) => (slots.primary, slots.secondary),
            None => return false,
        };

        if (primary.is_some() && primary != event.sequence) || secondary.is_some() {
            if secondary.is_none() {
                if let Some(slots) = self.slots() {
                    slots.secondary = event.sequence;
                }
                self.cancel_for_gesture(event, env);
            }
            if must_end {
                let tool = env.host.tool_type();
                if let Some(slots) = self.slots() {
                    if event.sequence == slots.primary {
                        slots.primary = slots.secondary.take();
                        env.host.set_touchscreen_scrolling(tool == ToolType::Hand);
                    } else if event.sequence == slots.secondary {
                        slots.secondary = None;
                    }
                }
            }
            return false;
        }

        if event.kind == EventKind::ButtonPress && primary.is_none() {
            if let Some(slots) = self.slots() {
                slots.primary = event.sequence;
            }
            self.device_class_pressed = true;
            if !self.action_start(event, env) {
                self.device_class_pressed = false;
            }
            update_kinetic_scrolling(env.host, env.config);
            return false;
        }

        if self.device_class_pressed
            && event.kind == EventKind::Motion
            && env.host.tool_type() != ToolType::Hand
        {
            self.action_motion(event, env);
            return true;
        }

        if must_end {
            if let Some(slots) = self.slots() {
                slots.primary = None;
            }
            if self.input_running {
                self.action_end(event, env);
            }
            self.device_class_pressed = false;
        }

        false
    }

    /// A second finger turned the contact into a gesture.
    fn cancel_for_gesture<H: InputHost>(&mut self, event: &InputEvent, env: &mut HandlerEnv<'_, H>) {
        env.host.set_touchscreen_scrolling(true);
        let page = self
            .sequence_start_page
            .or_else(|| page_at_position(&*env.host, event));
        if let Some(page) = page {
            env.host.on_sequence_cancel(page, Some(&event.device_name));
        }
        self.input_running = false;
        self.device_class_pressed = false;
        self.sequence_start_page = None;
        self.auto_scroll.cancel();
    }

    pub(super) fn change_tool_touch<H: InputHost>(
        &mut self,
        event: &InputEvent,
        env: &mut HandlerEnv<'_, H>,
    ) -> bool {
        let binding = &env.config.buttons.touch;
        let changed = if binding.device.is_empty() || binding.device == event.device_name {
            if is_touch_drawing_disallowed(&*env.host, env.config) {
                let first_time = self
                    .slots()
                    .map(|slots| !std::mem::replace(&mut slots.warned_disallowed, true))
                    .unwrap_or(false);
                if first_time {
                    warn!(
                        "Touch drawing is configured to both keep the tool and disable drawing; \
                         ignoring touch input while a drawing tool is selected"
                    );
                }
                return false;
            }
            if let Some(slots) = self.slots() {
                slots.warned_disallowed = false;
            }
            apply_button(env.host, env.config, Button::Touch)
        } else {
            env.host.restore_toolbar_tool()
        };

        update_kinetic_scrolling(env.host, env.config);
        notify_tool_changed(env.host, changed);
        true
    }
}

/// "Keep the tool" and "disable drawing" together leave nothing a finger
/// could do with a drawing tool.
fn is_touch_drawing_disallowed<H: ToolHandler + ?Sized>(host: &H, config: &Config) -> bool {
    let binding = &config.buttons.touch;
    binding.keep_tool && binding.disable_drawing && host.toolbar_tool_type().is_drawing_tool()
}

/// Kinetic scrolling stays on while the hand tool is active so single-finger
/// panning feels native.
pub(crate) fn update_kinetic_scrolling<H: InputHost + ?Sized>(host: &mut H, config: &Config) {
    if config.touch.drawing {
        let hand = host.tool_type() == ToolType::Hand;
        host.set_touchscreen_scrolling(hand);
    }
}
