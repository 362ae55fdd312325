//! Action lifecycle shared by every pointer device.

use kurbo::Rect;
use log::debug;

use super::autoscroll::{edge_offset, is_well_inside};
use super::{PenInputHandler, notify_tool_changed, pressure, tap};
use crate::input::events::{EventKind, InputEvent};
use crate::input::handler::HandlerEnv;
use crate::input::host::{Canvas, InputHost, PageIndex, SelectionGrip};
use crate::input::position::{NO_PRESSURE, PositionInputData, page_at_position, project_to_page};
use crate::input::tool::ToolType;

impl PenInputHandler {
    /// Begins an action: picks the tool, grabs or clears the selection and
    /// presses on the page under the pointer.
    pub(super) fn action_start<H: InputHost>(
        &mut self,
        event: &InputEvent,
        env: &mut HandlerEnv<'_, H>,
    ) -> bool {
        if self.input_running && self.sequence_start_page.is_some() {
            debug!(
                "{} action still running, closing it before starting a new one",
                event.device_class.label()
            );
            if let Some(last) = self.last_event.clone() {
                self.finish_action(&last, env, false);
            }
        }

        env.host.focus();
        self.last_action_start = event.timestamp;
        self.sequence_start_position = event.absolute;
        self.last_hit_event = None;
        let current_page = page_at_position(&*env.host, event);
        self.update_last_event(event, &*env.host);

        if !self.change_tool(event, env) {
            return false;
        }
        self.pressure.reset();

        let tool = env.host.tool_type();
        if tool == ToolType::Image {
            // Image insertion opens a dialog; a pressed state would get stuck.
            self.device_class_pressed = false;
        } else {
            self.input_running = true;
        }
        self.pen_in_widget = true;
        self.auto_scroll.cancel();
        self.sequence_start_page = current_page;

        if tool == ToolType::Hand {
            self.scroll_start = event.absolute;
            return true;
        }

        if let Some(selection_page) = env.host.selection_page() {
            let pos = self.project(env, selection_page, event);
            if let Some(grip) = env.host.selection_grip_at(pos.x, pos.y) {
                if grip == SelectionGrip::Move && self.modifier3 {
                    env.host.selection_copy();
                }
                env.host.selection_grab(grip, pos.x, pos.y);
                return true;
            }

            env.host.clear_selection();
            self.change_tool(event, env);
            if env.host.tool_type().is_drawing_tool() {
                // The click only deselects.
                self.input_running = false;
                self.sequence_start_page = None;
                return true;
            }
        }

        let Some(page) = current_page else {
            return true;
        };
        let mut pos = self.project(env, page, event);
        pos.pressure = self.filter_pressure(&pos, page, env);
        env.host.on_button_press(page, &pos)
    }

    /// Continues an action, switching pages when the pointer crosses into
    /// another one.
    pub(super) fn action_motion<H: InputHost>(
        &mut self,
        event: &InputEvent,
        env: &mut HandlerEnv<'_, H>,
    ) -> bool {
        if !self.pen_in_widget {
            let local = event.relative - env.host.scroll_offset();
            let (width, height) = env.host.viewport_size();
            if is_well_inside(local, width, height) {
                self.pen_in_widget = true;
                self.auto_scroll.cancel();
            }
        }

        self.change_tool(event, env);

        if env.host.tool_type() == ToolType::Hand {
            if self.device_class_pressed {
                self.scroll_by_hand(event, env);
                return true;
            }
            return false;
        }

        if let Some(selection_page) = env.host.selection_page() {
            let pos = self.project(env, selection_page, event);
            if env.host.selection_is_moving() {
                env.host.selection_drag(pos.x, pos.y, pos.is_alt_down());
            }
            return true;
        }

        let current_page = page_at_position(&*env.host, event);
        let last_event_page = self
            .last_event
            .as_ref()
            .and_then(|last| page_at_position(&*env.host, last));
        let last_hit = self.last_hit_event.clone();
        let last_hit_page = last_hit
            .as_ref()
            .and_then(|hit| page_at_position(&*env.host, hit));
        let single_page = env.host.is_single_page_tool();

        if !single_page && self.device_class_pressed {
            if let Some(current) = current_page {
                if Some(current) != self.sequence_start_page {
                    if let Some(last_hit) = last_hit.as_ref().filter(|_| last_hit_page.is_some()) {
                        debug!("Start new input on switching page");
                        self.finish_action(last_hit, env, false);
                        self.update_last_event(event, &*env.host);
                        let consumed = self.action_start(event, env);
                        self.update_last_event(event, &*env.host);
                        return consumed;
                    }
                }
                if last_event_page.is_none() && last_hit_page.is_none() {
                    debug!("Start new input on entering a page");
                    self.update_last_event(event, &*env.host);
                    let consumed = self.action_start(event, env);
                    self.update_last_event(event, &*env.host);
                    return consumed;
                }
            }
        }

        if let Some(start_page) = self.sequence_start_page.filter(|_| single_page) {
            let mut pos = self.project(env, start_page, event);
            clamp_to_page(&mut pos, env.host.page_bounds(start_page));
            pos.pressure = self.filter_pressure(&pos, start_page, env);
            let consumed = env.host.on_motion(start_page, &pos);
            self.update_last_event(event, &*env.host);
            return consumed;
        }

        if let Some(page) = current_page.filter(|_| self.pen_in_widget) {
            let mut pos = self.project(env, page, event);
            pos.pressure = self.filter_pressure(&pos, page, env);
            let consumed = env.host.on_motion(page, &pos);
            self.update_last_event(event, &*env.host);
            return consumed;
        }

        self.update_last_event(event, &*env.host);
        false
    }

    /// Ends the running action; short, still contacts may become taps.
    pub(super) fn action_end<H: InputHost>(
        &mut self,
        event: &InputEvent,
        env: &mut HandlerEnv<'_, H>,
    ) -> bool {
        self.finish_action(event, env, true)
    }

    /// Closes an action. Synthetic ends (page switches, restarts) pass
    /// `allow_tap = false` so they always release.
    pub(super) fn finish_action<H: InputHost>(
        &mut self,
        event: &InputEvent,
        env: &mut HandlerEnv<'_, H>,
        allow_tap: bool,
    ) -> bool {
        self.auto_scroll.cancel();
        let tap_filter = &env.config.tap_filter;

        if allow_tap
            && self.input_running
            && tap_filter.enabled
            && env.host.tool_type().supports_tap_filter()
        {
            let distance = self.sequence_start_position.distance(event.absolute);
            let duration = event.timestamp.saturating_sub(self.last_action_start);
            let since_end = self
                .last_action_end
                .map(|end| event.timestamp.saturating_sub(end));
            if tap::is_tap(tap_filter, distance, duration, since_end) {
                debug!("Tap detected: {:.1}px in {}ms", distance, duration);
                let page = self
                    .sequence_start_page
                    .or_else(|| page_at_position(&*env.host, event));
                if let Some(page) = page {
                    env.host.on_sequence_cancel(page, Some(&event.device_name));
                    let pos = self.project(env, page, event);
                    env.host.on_tap(page, &pos);
                }
                self.close(event, env);
                return false;
            }
        }

        // Hand drags and swallowed clicks never pressed on a page.
        if !self.input_running || env.host.tool_type() == ToolType::Hand {
            self.close(event, env);
            return false;
        }

        if env.host.selection_page().is_some() && env.host.selection_is_moving() {
            env.host.selection_release();
        }

        let target = match self.sequence_start_page {
            Some(start) if env.host.is_single_page_tool() => Some((start, true)),
            _ => page_at_position(&*env.host, event)
                .or_else(|| {
                    self.last_hit_event
                        .as_ref()
                        .and_then(|hit| page_at_position(&*env.host, hit))
                })
                .map(|page| (page, false)),
        };

        if let Some((page, clamp)) = target {
            let mut pos = self.project(env, page, event);
            if clamp {
                clamp_to_page(&mut pos, env.host.page_bounds(page));
            }
            pos.pressure = self.filter_pressure(&pos, page, env);
            env.host.on_button_release(page, &pos);
        } else {
            debug!("Release outside every page, nothing to notify");
        }

        self.close(event, env);
        false
    }

    /// Bookkeeping common to every way an action can end.
    fn close<H: InputHost>(&mut self, event: &InputEvent, env: &mut HandlerEnv<'_, H>) {
        self.last_action_end = Some(event.timestamp);
        self.sequence_start_page = None;
        self.input_running = false;
        let changed = env.host.restore_toolbar_tool();
        notify_tool_changed(env.host, changed);
    }

    /// Double and triple presses go straight to the page under the pointer.
    pub(super) fn action_perform<H: InputHost>(
        &mut self,
        event: &InputEvent,
        env: &mut HandlerEnv<'_, H>,
    ) -> bool {
        let Some(page) = page_at_position(&*env.host, event) else {
            return false;
        };
        let pos = self.project(env, page, event);
        match event.kind {
            EventKind::DoublePress => env.host.on_double_press(page, &pos),
            EventKind::TriplePress => env.host.on_triple_press(page, &pos),
            _ => false,
        }
    }

    /// The pointer left the canvas widget.
    pub(super) fn action_leave_window<H: InputHost>(
        &mut self,
        event: &InputEvent,
        env: &mut HandlerEnv<'_, H>,
    ) {
        if !self.pen_in_widget {
            return;
        }
        let draw_outside = env.config.window.draw_outside;
        if !draw_outside {
            self.pen_in_widget = false;
        }

        if self.input_running && !env.host.is_single_page_tool() {
            if !draw_outside {
                if let Some(last_hit) = self.last_hit_event.clone() {
                    self.finish_action(&last_hit, env, false);
                }
            }
        } else if self.device_class_pressed && !self.pen_in_widget {
            let local = event.relative - env.host.scroll_offset();
            let (width, height) = env.host.viewport_size();
            let offset = edge_offset(local, width, height);
            debug!("Auto-scrolling by ({}, {})", offset.x, offset.y);
            self.auto_scroll.start(offset, env.now);
            self.tick(env.now, env.host);
        }
    }

    /// The pointer came back into the canvas widget.
    pub(super) fn action_enter_window<H: InputHost>(
        &mut self,
        event: &InputEvent,
        env: &mut HandlerEnv<'_, H>,
    ) {
        self.pen_in_widget = true;
        self.auto_scroll.cancel();

        if !env.config.window.draw_outside
            && self.device_class_pressed
            && !env.host.is_single_page_tool()
        {
            self.action_start(event, env);
        }
    }

    /// Hand tool drag; absolute coordinates stay put while the view scrolls.
    fn scroll_by_hand<H: InputHost>(&mut self, event: &InputEvent, env: &mut HandlerEnv<'_, H>) {
        let delta = self.scroll_start - event.absolute;
        if delta.x.abs() < 0.1 && delta.y.abs() < 0.1 {
            return;
        }
        env.host.scroll_relative(delta.x, delta.y);
        self.scroll_start = event.absolute;
    }

    fn update_last_event<C: Canvas + ?Sized>(&mut self, event: &InputEvent, canvas: &C) {
        if page_at_position(canvas, event).is_some() {
            self.last_hit_event = Some(event.clone());
        }
        self.last_event = Some(event.clone());
    }

    fn project<H: InputHost>(
        &self,
        env: &HandlerEnv<'_, H>,
        page: PageIndex,
        event: &InputEvent,
    ) -> PositionInputData {
        project_to_page(&*env.host, page, event, env.config.pressure.sensitivity)
    }

    /// Infers pressure if needed, then applies multiplier and floor.
    fn filter_pressure<H: InputHost>(
        &mut self,
        pos: &PositionInputData,
        page: PageIndex,
        env: &HandlerEnv<'_, H>,
    ) -> f64 {
        let mut value = pos.pressure;
        if value == NO_PRESSURE && env.config.pressure.inference {
            let (elapsed, distance) = match &self.last_event {
                Some(last) => {
                    let previous = project_to_page(&*env.host, page, last, false);
                    (
                        pos.timestamp.saturating_sub(previous.timestamp),
                        pos.point().distance(previous.point()),
                    )
                }
                None => (0, 0.0),
            };
            value = self.pressure.sample(elapsed, distance);
        }
        pressure::filter_pressure(value, &env.config.pressure)
    }
}

fn clamp_to_page(pos: &mut PositionInputData, bounds: Rect) {
    pos.x = pos.x.clamp(0.0, bounds.width());
    pos.y = pos.y.clamp(0.0, bounds.height());
}
