use std::time::Instant;

use super::*;
use crate::config::Config;
use crate::input::events::DeviceClass;
use crate::replay::{Callback, RecordingHost};

struct Rig {
    handler: TouchInputHandler,
    host: RecordingHost,
    config: Config,
}

impl Rig {
    fn new() -> Self {
        Self {
            handler: TouchInputHandler::default(),
            host: RecordingHost::stacked(1, 1000.0, 1000.0, 0.0),
            config: Config::default(),
        }
    }

    fn send(&mut self, kind: EventKind, id: u64, x: f64, y: f64) -> bool {
        let event = InputEvent::new(kind, DeviceClass::Touchscreen, x, y).with_sequence(id);
        let mut env = HandlerEnv::new(&mut self.host, &self.config, Instant::now());
        InputHandler::handle(&mut self.handler, &event, &mut env)
    }

    fn block(&mut self, block: bool) {
        let mut env = HandlerEnv::new(&mut self.host, &self.config, Instant::now());
        InputHandler::block(&mut self.handler, block, &mut env);
    }

    fn log(&mut self) -> Vec<Callback> {
        self.host.take_callbacks()
    }

    fn zooms(&mut self) -> Vec<f64> {
        self.log()
            .into_iter()
            .filter_map(|c| match c {
                Callback::ZoomChange { zoom, .. } => Some(zoom),
                _ => None,
            })
            .collect()
    }
}

#[test]
fn one_finger_pans_opposite_to_motion() {
    let mut rig = Rig::new();
    assert!(rig.send(EventKind::ButtonPress, 1, 100.0, 100.0));
    assert!(rig.send(EventKind::Motion, 1, 110.0, 95.0));
    assert!(rig.send(EventKind::ButtonRelease, 1, 110.0, 95.0));

    assert_eq!(rig.log(), vec![Callback::Scroll { dx: -10.0, dy: 5.0 }]);
}

#[test]
fn pinch_zooms_relative_to_start_distance() {
    let mut rig = Rig::new();
    rig.send(EventKind::ButtonPress, 1, 100.0, 100.0);
    rig.send(EventKind::ButtonPress, 2, 200.0, 100.0);
    rig.send(EventKind::Motion, 1, 100.0, 100.0);
    assert_eq!(rig.log(), vec![Callback::ZoomStart { x: 150.0, y: 100.0 }]);

    rig.send(EventKind::Motion, 2, 300.0, 100.0);
    assert_eq!(
        rig.log(),
        vec![Callback::ZoomChange {
            zoom: 2.0,
            dx: 50.0,
            dy: 0.0
        }]
    );

    rig.send(EventKind::ButtonRelease, 2, 300.0, 100.0);
    assert_eq!(rig.log(), vec![Callback::ZoomEnd]);

    // The remaining finger pans again.
    rig.send(EventKind::Motion, 1, 90.0, 100.0);
    assert_eq!(rig.log(), vec![Callback::Scroll { dx: 10.0, dy: 0.0 }]);
}

#[test]
fn zoom_is_pinned_inside_dead_zone() {
    let mut rig = Rig::new();
    rig.config.touch.zoom_start_threshold = 10.0;

    rig.send(EventKind::ButtonPress, 1, 0.0, 0.0);
    rig.send(EventKind::ButtonPress, 2, 100.0, 0.0);
    rig.send(EventKind::Motion, 1, 0.0, 0.0);
    rig.log();

    rig.send(EventKind::Motion, 2, 105.0, 0.0);
    rig.send(EventKind::Motion, 2, 115.0, 0.0);
    // Once released, the dead zone does not come back.
    rig.send(EventKind::Motion, 2, 105.0, 0.0);

    let zooms = rig.zooms();
    assert_eq!(zooms.len(), 3);
    assert_eq!(zooms[0], 1.0);
    assert!((zooms[1] - 1.15).abs() < 1e-9);
    assert!((zooms[2] - 1.05).abs() < 1e-9);
}

#[test]
fn fingers_at_same_point_do_not_divide_by_zero() {
    let mut rig = Rig::new();
    rig.send(EventKind::ButtonPress, 1, 50.0, 50.0);
    rig.send(EventKind::ButtonPress, 2, 50.0, 50.0);
    rig.send(EventKind::Motion, 1, 50.0, 50.0);
    rig.send(EventKind::Motion, 2, 50.0, 50.01);

    let zooms = rig.zooms();
    assert_eq!(zooms.len(), 1);
    assert!(zooms[0].is_finite());
}

#[test]
fn zoom_start_leaves_zoom_fit_mode() {
    let mut rig = Rig::new();
    rig.host.zoom_fit = true;
    rig.send(EventKind::ButtonPress, 1, 0.0, 0.0);
    rig.send(EventKind::ButtonPress, 2, 10.0, 0.0);
    rig.send(EventKind::Motion, 1, 0.0, 0.0);
    assert!(!rig.host.zoom_fit);
}

#[test]
fn third_finger_invalidates_all_sequences() {
    let mut rig = Rig::new();
    rig.send(EventKind::ButtonPress, 1, 0.0, 0.0);
    rig.send(EventKind::ButtonPress, 2, 100.0, 0.0);
    rig.send(EventKind::ButtonPress, 3, 50.0, 50.0);

    assert!(!rig.send(EventKind::Motion, 1, 10.0, 0.0));
    assert!(!rig.send(EventKind::Motion, 3, 60.0, 50.0));
    assert!(rig.log().is_empty());

    for id in 1..=3 {
        rig.send(EventKind::ButtonRelease, id, 0.0, 0.0);
    }
    assert!(rig.handler.invalid.is_empty());

    // Fresh fingers work again.
    rig.send(EventKind::ButtonPress, 4, 0.0, 0.0);
    rig.send(EventKind::Motion, 4, 0.0, 10.0);
    assert_eq!(rig.log(), vec![Callback::Scroll { dx: 0.0, dy: -10.0 }]);
}

#[test]
fn third_finger_during_zoom_ends_zoom() {
    let mut rig = Rig::new();
    rig.send(EventKind::ButtonPress, 1, 0.0, 0.0);
    rig.send(EventKind::ButtonPress, 2, 100.0, 0.0);
    rig.send(EventKind::Motion, 1, 0.0, 0.0);
    rig.log();

    rig.send(EventKind::ButtonPress, 3, 50.0, 50.0);
    assert_eq!(rig.log(), vec![Callback::ZoomEnd]);
}

#[test]
fn missed_end_event_resets_invalid_set() {
    let mut rig = Rig::new();
    rig.send(EventKind::ButtonPress, 1, 0.0, 0.0);
    rig.send(EventKind::ButtonPress, 2, 100.0, 0.0);
    rig.send(EventKind::ButtonPress, 3, 50.0, 50.0);
    // Sequence 3 never ended but a new press with the same id arrives.
    rig.send(EventKind::ButtonPress, 3, 50.0, 50.0);

    assert!(rig.handler.invalid.is_empty());
    assert_eq!(rig.handler.slot_of(SequenceId(3)), Some(0));
}

#[test]
fn repeated_press_of_held_finger_recovers() {
    let mut rig = Rig::new();
    rig.send(EventKind::ButtonPress, 1, 0.0, 0.0);
    // The end of sequence 1 was lost before it pressed again.
    rig.send(EventKind::ButtonPress, 1, 20.0, 0.0);
    rig.send(EventKind::ButtonRelease, 1, 20.0, 0.0);
    assert!(rig.handler.invalid.is_empty());
    assert_eq!(rig.handler.slot_of(SequenceId(1)), None);

    for id in 7..=9 {
        rig.send(EventKind::ButtonPress, id, 100.0, 100.0);
        rig.send(EventKind::Motion, id, 100.0, 90.0);
        rig.send(EventKind::ButtonRelease, id, 100.0, 90.0);
    }
    assert_eq!(rig.log(), vec![Callback::Scroll { dx: 0.0, dy: 10.0 }; 3]);
}

#[test]
fn repeated_press_during_zoom_ends_it() {
    let mut rig = Rig::new();
    rig.send(EventKind::ButtonPress, 1, 0.0, 0.0);
    rig.send(EventKind::ButtonPress, 2, 100.0, 0.0);
    rig.send(EventKind::Motion, 1, 0.0, 0.0);
    rig.log();

    rig.send(EventKind::ButtonPress, 2, 100.0, 0.0);
    assert_eq!(rig.log(), vec![Callback::ZoomEnd]);
    assert_eq!(rig.handler.slot_of(SequenceId(2)), Some(0));
    assert_eq!(rig.handler.slot_of(SequenceId(1)), None);
}

#[test]
fn two_finger_tap_undoes() {
    let mut rig = Rig::new();
    rig.config.touch.undo_gesture = true;
    rig.host.undo_depth = 1;

    rig.send(EventKind::ButtonPress, 1, 100.0, 100.0);
    rig.send(EventKind::ButtonPress, 2, 200.0, 100.0);
    rig.send(EventKind::ButtonRelease, 1, 100.0, 100.0);
    rig.send(EventKind::ButtonRelease, 2, 200.0, 100.0);

    assert_eq!(rig.log(), vec![Callback::Undo]);
}

#[test]
fn two_finger_tap_needs_something_to_undo() {
    let mut rig = Rig::new();
    rig.config.touch.undo_gesture = true;

    rig.send(EventKind::ButtonPress, 1, 100.0, 100.0);
    rig.send(EventKind::ButtonPress, 2, 200.0, 100.0);
    rig.send(EventKind::ButtonRelease, 1, 100.0, 100.0);

    assert!(rig.log().is_empty());
}

#[test]
fn moving_past_slop_cancels_undo_even_if_finger_returns() {
    let mut rig = Rig::new();
    rig.config.touch.undo_gesture = true;
    rig.config.touch.zoom_gestures = false;
    rig.host.undo_depth = 1;

    rig.send(EventKind::ButtonPress, 1, 100.0, 100.0);
    rig.send(EventKind::ButtonPress, 2, 200.0, 100.0);
    rig.send(EventKind::Motion, 2, 206.0, 100.0);
    rig.send(EventKind::Motion, 2, 200.0, 100.0);
    rig.send(EventKind::ButtonRelease, 1, 100.0, 100.0);

    assert!(!rig.log().contains(&Callback::Undo));
}

#[test]
fn small_wiggle_keeps_undo_armed() {
    let mut rig = Rig::new();
    rig.config.touch.undo_gesture = true;
    rig.config.touch.zoom_gestures = false;
    rig.host.undo_depth = 1;

    rig.send(EventKind::ButtonPress, 1, 100.0, 100.0);
    rig.send(EventKind::ButtonPress, 2, 200.0, 100.0);
    rig.send(EventKind::Motion, 1, 103.0, 104.0);
    rig.send(EventKind::ButtonRelease, 2, 200.0, 100.0);

    assert_eq!(rig.log(), vec![Callback::Undo]);
}

#[test]
fn panned_first_finger_never_arms_undo() {
    let mut rig = Rig::new();
    rig.config.touch.undo_gesture = true;
    rig.host.undo_depth = 1;

    rig.send(EventKind::ButtonPress, 1, 100.0, 100.0);
    rig.send(EventKind::Motion, 1, 100.0, 120.0);
    rig.send(EventKind::ButtonPress, 2, 200.0, 100.0);
    rig.send(EventKind::ButtonRelease, 2, 200.0, 100.0);

    assert!(!rig.log().contains(&Callback::Undo));
}

#[test]
fn blocking_mid_zoom_ends_it_and_forgets_fingers() {
    let mut rig = Rig::new();
    rig.send(EventKind::ButtonPress, 1, 0.0, 0.0);
    rig.send(EventKind::ButtonPress, 2, 100.0, 0.0);
    rig.send(EventKind::Motion, 1, 0.0, 0.0);
    rig.log();

    rig.block(true);
    assert_eq!(rig.log(), vec![Callback::ZoomEnd]);
    assert!(rig.send(EventKind::Motion, 2, 150.0, 0.0));
    assert!(rig.log().is_empty());

    rig.block(false);
    assert_eq!(rig.handler.slot_of(SequenceId(1)), None);
    assert!(!rig.send(EventKind::Motion, 1, 10.0, 0.0));
}
