//! Multi-finger touchscreen gestures: one-finger pan, two-finger pinch zoom
//! and the optional two-finger tap undo.
//!
//! Only two fingers are tracked. A third finger invalidates every active
//! sequence; their remaining events are swallowed until each one ends.

use std::collections::HashSet;

use kurbo::{Point, Vec2};
use log::{debug, warn};

use super::events::{EventKind, InputEvent, SequenceId};
use super::handler::{HandlerEnv, InputHandler};
use super::host::InputHost;

/// Movement beyond which a two-finger contact is no longer an undo tap.
const UNDO_TAP_SLOP: f64 = 5.0;
/// Replaces a zero start distance so zoom factors stay finite.
const MIN_ZOOM_DISTANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy)]
struct Finger {
    sequence: SequenceId,
    start: Point,
    last: Point,
    /// Set once the finger strays beyond the undo tap slop.
    wandered: bool,
}

impl Finger {
    fn new(event: &InputEvent, sequence: SequenceId) -> Self {
        Self {
            sequence,
            start: event.absolute,
            last: event.absolute,
            wandered: false,
        }
    }

    fn note_position(&mut self, position: Point) {
        if self.start.distance(position) > UNDO_TAP_SLOP {
            self.wandered = true;
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct TouchInputHandler {
    blocked: bool,
    /// Slot 0 is the primary finger, slot 1 the secondary one.
    fingers: [Option<Finger>; 2],
    invalid: HashSet<SequenceId>,

    zoom_ready: bool,
    zooming: bool,
    start_zoom_distance: f64,
    last_zoom_center: Point,
    /// Zoom stays pinned at 1.0 until the pinch leaves the dead zone
    can_block_zoom: bool,

    undo_armed: bool,
}

impl TouchInputHandler {
    fn slot_of(&self, sequence: SequenceId) -> Option<usize> {
        self.fingers
            .iter()
            .position(|finger| finger.is_some_and(|f| f.sequence == sequence))
    }

    fn both_down(&self) -> bool {
        self.fingers.iter().all(Option::is_some)
    }

    /// Tracks a finger whose motion another handler consumed, so the undo
    /// tap and later pan offsets see where it really is.
    pub(crate) fn follow_consumed_motion(&mut self, event: &InputEvent) {
        if event.kind != EventKind::Motion {
            return;
        }
        let Some(slot) = event.sequence.and_then(|sequence| self.slot_of(sequence)) else {
            return;
        };
        if let Some(finger) = self.fingers[slot].as_mut() {
            finger.note_position(event.absolute);
            finger.last = event.absolute;
            if finger.wandered {
                self.undo_armed = false;
            }
        }
    }

    fn reset(&mut self) {
        self.fingers = [None, None];
        self.invalid.clear();
        self.zoom_ready = false;
        self.zooming = false;
        self.can_block_zoom = false;
        self.undo_armed = false;
    }

    fn on_press<H: InputHost>(&mut self, sequence: SequenceId, event: &InputEvent, env: &mut HandlerEnv<'_, H>) {
        if self.invalid.contains(&sequence) || self.slot_of(sequence).is_some() {
            warn!("Missed touch end/cancel event. Resetting touch input handler.");
            if self.zooming {
                self.zoom_end(env);
            }
            self.reset();
        }

        if !self.invalid.is_empty() {
            debug!("Ignoring touch {:?}, sequences are invalidated", sequence);
            self.invalid.insert(sequence);
            return;
        }

        if self.both_down() {
            debug!("Third finger down, dropping all touch sequences");
            for finger in self.fingers.iter().flatten() {
                self.invalid.insert(finger.sequence);
            }
            self.invalid.insert(sequence);
            if self.zooming {
                self.zoom_end(env);
            }
            self.fingers = [None, None];
            self.zoom_ready = false;
            self.undo_armed = false;
            return;
        }

        let finger = Finger::new(event, sequence);
        match self.fingers {
            [None, _] => self.fingers[0] = Some(finger),
            [Some(primary), _] => {
                self.fingers[1] = Some(finger);
                self.zoom_ready = true;
                self.undo_armed = env.config.touch.undo_gesture && !primary.wandered;
            }
        }
    }

    fn on_motion<H: InputHost>(&mut self, sequence: SequenceId, event: &InputEvent, env: &mut HandlerEnv<'_, H>) -> bool {
        let Some(slot) = self.slot_of(sequence) else {
            return false;
        };

        if let Some(finger) = self.fingers[slot].as_mut() {
            finger.note_position(event.absolute);
            if finger.wandered && self.undo_armed {
                debug!("Touch moved, two-finger tap undo cancelled");
                self.undo_armed = false;
            }
        }

        if slot == 0 && self.fingers[1].is_none() {
            self.scroll_motion(event, env);
            return true;
        }

        if !env.config.touch.zoom_gestures {
            // Keep tracking positions for the undo tap.
            if let Some(finger) = self.fingers[slot].as_mut() {
                finger.last = event.absolute;
            }
            return false;
        }

        if self.zoom_ready {
            if slot == 0 {
                self.zoom_start(event, env);
            }
        } else {
            self.zoom_motion(slot, event, env);
        }
        true
    }

    fn on_release<H: InputHost>(&mut self, sequence: SequenceId, env: &mut HandlerEnv<'_, H>) {
        let slot = self.slot_of(sequence);
        if slot.is_some() && self.both_down() {
            if self.zooming {
                self.zoom_end(env);
            }
            self.zoom_ready = false;
            if self.undo_armed {
                self.undo_armed = false;
                if env.host.can_undo() {
                    debug!("Two-finger tap, undoing");
                    env.host.undo();
                }
            }
        }

        match slot {
            // The secondary finger becomes the primary one.
            Some(0) => self.fingers = [self.fingers[1], None],
            Some(_) => self.fingers[1] = None,
            None => {
                self.invalid.remove(&sequence);
            }
        }
    }

    fn scroll_motion<H: InputHost>(&mut self, event: &InputEvent, env: &mut HandlerEnv<'_, H>) {
        let Some(finger) = self.fingers[0].as_mut() else {
            return;
        };
        let offset = event.absolute - finger.last;
        finger.last = event.absolute;
        env.host.scroll_relative(-offset.x, -offset.y);
    }

    fn zoom_start<H: InputHost>(&mut self, event: &InputEvent, env: &mut HandlerEnv<'_, H>) {
        let Some(secondary) = self.fingers[1] else {
            return;
        };
        let Some(primary) = self.fingers[0].as_mut() else {
            return;
        };
        primary.last = event.absolute;
        let primary_pos = primary.last;

        self.zoom_ready = false;
        self.zooming = true;
        self.can_block_zoom = true;

        let distance = primary_pos.distance(secondary.last);
        self.start_zoom_distance = if distance == 0.0 {
            MIN_ZOOM_DISTANCE
        } else {
            distance
        };

        if env.host.is_zoom_fit_mode() {
            env.host.set_zoom_fit_mode(false);
        }

        let center = primary_pos.midpoint(secondary.last);
        self.last_zoom_center = center;
        // Absolute coordinates are translated into the canvas space of the
        // triggering event.
        let to_canvas = event.relative - event.absolute;
        env.host.start_zoom_sequence(center + to_canvas);
    }

    fn zoom_motion<H: InputHost>(&mut self, slot: usize, event: &InputEvent, env: &mut HandlerEnv<'_, H>) {
        if let Some(finger) = self.fingers[slot].as_mut() {
            finger.last = event.absolute;
        }
        if !self.zooming {
            return;
        }
        let (Some(primary), Some(secondary)) = (self.fingers[0], self.fingers[1]) else {
            return;
        };

        let distance = primary.last.distance(secondary.last);
        let mut zoom = distance / self.start_zoom_distance;

        let change_percent =
            (distance - self.start_zoom_distance).abs() / self.start_zoom_distance * 100.0;
        if self.can_block_zoom && change_percent < env.config.touch.zoom_start_threshold {
            zoom = 1.0;
        } else {
            self.can_block_zoom = false;
        }

        let center = primary.last.midpoint(secondary.last);
        let scroll: Vec2 = center - self.last_zoom_center;
        self.last_zoom_center = center;
        env.host.zoom_sequence_change(zoom, true, Some(scroll));
    }

    fn zoom_end<H: InputHost>(&mut self, env: &mut HandlerEnv<'_, H>) {
        self.zooming = false;
        env.host.end_zoom_sequence();
    }
}

impl<H: InputHost> InputHandler<H> for TouchInputHandler {
    fn blocked(&self) -> bool {
        self.blocked
    }

    fn set_blocked(&mut self, blocked: bool) {
        self.blocked = blocked;
    }

    fn handle_impl(&mut self, event: &InputEvent, env: &mut HandlerEnv<'_, H>) -> bool {
        let Some(sequence) = event.sequence else {
            return false;
        };
        match event.kind {
            EventKind::ButtonPress => {
                self.on_press(sequence, event, env);
                true
            }
            EventKind::Motion => self.on_motion(sequence, event, env),
            EventKind::ButtonRelease => {
                self.on_release(sequence, env);
                true
            }
            _ => false,
        }
    }

    fn on_block(&mut self, env: &mut HandlerEnv<'_, H>) {
        if self.zooming {
            self.zoom_end(env);
        }
        self.reset();
    }

    fn on_unblock(&mut self, _env: &mut HandlerEnv<'_, H>) {
        self.reset();
    }
}

#[cfg(test)]
mod tests;
