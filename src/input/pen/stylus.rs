use log::warn;

use super::{PenInputHandler, PointerDevice, apply_button, notify_tool_changed};
use crate::input::events::{
    BUTTON_MIDDLE, BUTTON_PRIMARY, BUTTON_SECONDARY, DeviceClass, EventKind, InputEvent,
};
use crate::input::handler::HandlerEnv;
use crate::input::host::InputHost;
use crate::input::position::{page_at_position, project_to_page};
use crate::input::tool::Button;

/// Enter/leave events that jump further than this while the tip is down are
/// driver glitches.
const IMPOSSIBLE_JUMP: f64 = 100.0;

impl PenInputHandler {
    fn events_to_ignore(&self) -> Option<u32> {
        match self.device {
            PointerDevice::Stylus { events_to_ignore } => events_to_ignore,
            _ => None,
        }
    }

    fn set_events_to_ignore(&mut self, value: Option<u32>) {
        if let PointerDevice::Stylus { events_to_ignore } = &mut self.device {
            *events_to_ignore = value;
        }
    }

    /// True for the button that draws: the tip, or any button when side
    /// buttons act as the tip.
    fn is_tip_button(event: &InputEvent, tpc_button: bool) -> bool {
        event.button == BUTTON_PRIMARY || tpc_button
    }

    /// Processes one pen or eraser event.
    pub(super) fn handle_stylus<H: InputHost>(
        &mut self,
        event: &InputEvent,
        env: &mut HandlerEnv<'_, H>,
    ) -> bool {
        let tpc_button = env.config.stylus.tpc_button;
        self.set_stylus_pressed_state(event, env);

        if event.kind == EventKind::ButtonPress {
            if Self::is_tip_button(event, tpc_button) {
                let warm_up = env.config.stylus.ignored_events;
                if warm_up > 0 {
                    self.set_events_to_ignore(Some(warm_up - 1));
                } else {
                    self.set_events_to_ignore(None);
                    self.action_start(event, env);
                }
                return true;
            }
            // Side button: restart the running stroke with the bound tool,
            // or report a click to the page.
            if self.input_running {
                self.finish_action(event, env, false);
                self.action_start(event, env);
            } else {
                self.change_tool(event, env);
                self.click_page(event, env);
            }
            return true;
        }

        if matches!(event.kind, EventKind::DoublePress | EventKind::TriplePress) {
            self.action_perform(event, env);
            return true;
        }

        if event.kind == EventKind::Motion {
            match self.events_to_ignore() {
                Some(remaining) if remaining > 0 => {
                    self.set_events_to_ignore(Some(remaining - 1));
                }
                Some(_) => {
                    self.set_events_to_ignore(None);
                    self.action_start(event, env);
                }
                None => {
                    self.action_motion(event, env);
                }
            }
            return true;
        }

        if matches!(event.kind, EventKind::Enter | EventKind::Leave) && self.is_impossible_jump(event) {
            warn!(
                "Discarding impossible {:?} event at ({:.1}, {:.1})",
                event.kind, event.relative.x, event.relative.y
            );
            return true;
        }

        if event.kind == EventKind::Enter && !self.input_running {
            self.action_enter_window(event, env);
        }

        if event.kind == EventKind::Leave {
            // Without the pen over the canvas, palm rejection has nothing to
            // protect.
            env.release_touch = true;
            self.action_leave_window(event, env);
        }

        if event.kind == EventKind::ButtonRelease {
            if Self::is_tip_button(event, tpc_button) {
                if self.events_to_ignore().is_none() {
                    self.action_end(event, env);
                } else {
                    self.set_events_to_ignore(None);
                }
            } else if self.input_running {
                self.finish_action(event, env, false);
                self.action_start(event, env);
            } else {
                self.change_tool(event, env);
            }
            return true;
        }

        if event.kind == EventKind::GrabBroken && self.device_class_pressed {
            self.action_end(event, env);
            return true;
        }

        false
    }

    fn set_stylus_pressed_state<H: InputHost>(&mut self, event: &InputEvent, env: &HandlerEnv<'_, H>) {
        let tpc_button = env.config.stylus.tpc_button;
        match event.kind {
            EventKind::ButtonPress => {
                if Self::is_tip_button(event, tpc_button) && env.config.stylus.ignored_events == 0 {
                    self.device_class_pressed = true;
                }
                match event.button {
                    BUTTON_MIDDLE => self.modifier2 = true,
                    BUTTON_SECONDARY => self.modifier3 = true,
                    _ => {}
                }
            }
            EventKind::Motion => {
                if self.events_to_ignore() == Some(0) {
                    self.device_class_pressed = true;
                }
            }
            EventKind::ButtonRelease => {
                if Self::is_tip_button(event, tpc_button) {
                    self.device_class_pressed = false;
                }
                match event.button {
                    BUTTON_MIDDLE => self.modifier2 = false,
                    BUTTON_SECONDARY => self.modifier3 = false,
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn is_impossible_jump(&self, event: &InputEvent) -> bool {
        if !self.device_class_pressed {
            return false;
        }
        self.last_event.as_ref().is_some_and(|last| {
            (event.relative.x - last.relative.x).abs() > IMPOSSIBLE_JUMP
                || (event.relative.y - last.relative.y).abs() > IMPOSSIBLE_JUMP
        })
    }

    fn click_page<H: InputHost>(&mut self, event: &InputEvent, env: &mut HandlerEnv<'_, H>) {
        if let Some(page) = page_at_position(&*env.host, event) {
            let pos = project_to_page(&*env.host, page, event, env.config.pressure.sensitivity);
            env.host.on_button_click(page, &pos);
        }
    }

    pub(super) fn change_tool_stylus<H: InputHost>(
        &mut self,
        event: &InputEvent,
        env: &mut HandlerEnv<'_, H>,
    ) -> bool {
        let changed = if event.device_class == DeviceClass::Pen && self.modifier2 {
            apply_button(env.host, env.config, Button::StylusOne)
        } else if event.device_class == DeviceClass::Pen && self.modifier3 {
            apply_button(env.host, env.config, Button::StylusTwo)
        } else if event.device_class == DeviceClass::Eraser {
            apply_button(env.host, env.config, Button::Eraser)
        } else {
            env.host.restore_toolbar_tool()
        };
        notify_tool_changed(env.host, changed);
        true
    }
}
