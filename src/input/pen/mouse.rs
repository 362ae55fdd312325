use super::{PenInputHandler, apply_button, notify_tool_changed};
use crate::input::events::{BUTTON_MIDDLE, BUTTON_SECONDARY, EventKind, InputEvent};
use crate::input::handler::HandlerEnv;
use crate::input::host::InputHost;
use crate::input::tool::Button;

impl PenInputHandler {
    /// Processes one mouse event.
    ///
    /// Every press starts an action and every release ends one; middle and
    /// right buttons only pick the tool through their bindings.
    pub(super) fn handle_mouse<H: InputHost>(
        &mut self,
        event: &InputEvent,
        env: &mut HandlerEnv<'_, H>,
    ) -> bool {
        self.set_mouse_pressed_state(event);

        match event.kind {
            EventKind::ButtonPress => {
                self.action_start(event, env);
                true
            }
            EventKind::DoublePress | EventKind::TriplePress => {
                self.action_perform(event, env);
                true
            }
            EventKind::Motion => {
                self.action_motion(event, env);
                false
            }
            EventKind::Enter => {
                self.action_enter_window(event, env);
                false
            }
            EventKind::Leave => {
                self.action_leave_window(event, env);
                false
            }
            EventKind::ButtonRelease => {
                self.action_end(event, env);
                true
            }
            EventKind::GrabBroken if self.device_class_pressed => {
                self.action_end(event, env);
                true
            }
            _ => false,
        }
    }

    fn set_mouse_pressed_state(&mut self, event: &InputEvent) {
        match event.kind {
            EventKind::ButtonPress => {
                self.device_class_pressed = true;
                match event.button {
                    BUTTON_MIDDLE => self.modifier2 = true,
                    BUTTON_SECONDARY => self.modifier3 = true,
                    _ => {}
                }
            }
            EventKind::ButtonRelease => {
                self.device_class_pressed = false;
                match event.button {
                    BUTTON_MIDDLE => self.modifier2 = false,
                    BUTTON_SECONDARY => self.modifier3 = false,
                    _ => {}
                }
            }
            _ => {}
        }
    }

    pub(super) fn change_tool_mouse<H: InputHost>(&mut self, env: &mut HandlerEnv<'_, H>) -> bool {
        // Secondary buttons over a selection keep the tool so the selection
        // can be dragged or copied.
        let on_selection = env.host.selection_page().is_some();
        let changed = if self.modifier2 && !on_selection {
            apply_button(env.host, env.config, Button::MouseMiddle)
        } else if self.modifier3 && !on_selection {
            apply_button(env.host, env.config, Button::MouseRight)
        } else {
            env.host.restore_toolbar_tool()
        };
        notify_tool_changed(env.host, changed);
        true
    }
}
