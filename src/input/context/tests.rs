use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::*;
use crate::config::DeviceClassOption;
use crate::input::events::{InputSource, RawEventKind};
use crate::input::touch_disable::{TouchDisable, TouchDisableError};
use crate::replay::{Callback, RecordingHost};

fn context(config: Config) -> InputContext<RecordingHost> {
    InputContext::new(RecordingHost::stacked(1, 100.0, 100.0, 0.0), config)
}

fn event(kind: EventKind, class: DeviceClass, x: f64, y: f64) -> InputEvent {
    InputEvent::new(kind, class, x, y)
}

fn page_log(ctx: &mut InputContext<RecordingHost>) -> Vec<String> {
    ctx.host_mut()
        .take_callbacks()
        .iter()
        .filter(|c| c.page().is_some())
        .map(ToString::to_string)
        .collect()
}

fn raw(kind: RawEventKind, source: InputSource, name: &str, x: f64, y: f64) -> RawInputEvent {
    RawInputEvent {
        kind,
        source,
        device_name: name.to_string(),
        x,
        y,
        root: None,
        pressure: None,
        button: 1,
        keyval: 0,
        sequence: None,
        modifiers: Default::default(),
        time: 0,
    }
}

#[derive(Default)]
struct SwitchCalls {
    enabled: u32,
    disabled: u32,
}

struct FakeSwitch(Rc<RefCell<SwitchCalls>>);

impl TouchDisable for FakeSwitch {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn enable(&mut self) -> Result<(), TouchDisableError> {
        self.0.borrow_mut().enabled += 1;
        Ok(())
    }

    fn disable(&mut self) -> Result<(), TouchDisableError> {
        self.0.borrow_mut().disabled += 1;
        Ok(())
    }
}

fn palm_rejecting_context() -> (InputContext<RecordingHost>, Rc<RefCell<SwitchCalls>>) {
    let mut config = Config::default();
    config.hand_recognition.enabled = true;
    config.hand_recognition.timeout_ms = 1000;
    let calls = Rc::new(RefCell::new(SwitchCalls::default()));
    let hand = HandRecognition::with_mechanism(
        &config.hand_recognition,
        Some(Box::new(FakeSwitch(calls.clone()))),
    );
    let ctx = InputContext::with_hand_recognition(
        RecordingHost::stacked(1, 100.0, 100.0, 0.0),
        config,
        hand,
    );
    (ctx, calls)
}

#[derive(Default)]
struct Ruler {
    consume: bool,
    seen: Rc<RefCell<Vec<String>>>,
}

impl GeometryToolHandler<RecordingHost> for Ruler {
    fn handle(&mut self, event: &InputEvent, _host: &mut RecordingHost) -> bool {
        self.seen.borrow_mut().push(format!("{:?}", event.kind));
        self.consume
    }

    fn block_device(&mut self, device: DeviceType) {
        self.seen.borrow_mut().push(format!("block {device:?}"));
    }

    fn unblock_device(&mut self, device: DeviceType) {
        self.seen.borrow_mut().push(format!("unblock {device:?}"));
    }
}

#[test]
fn mouse_events_reach_the_mouse_handler() {
    let mut ctx = context(Config::default());
    assert!(ctx.handle(&event(EventKind::ButtonPress, DeviceClass::Mouse, 10.0, 10.0)));
    assert!(ctx.is_input_running(DeviceType::Mouse));
    assert!(!ctx.is_input_running(DeviceType::Stylus));
    assert!(ctx.handle(&event(EventKind::ButtonRelease, DeviceClass::Mouse, 10.0, 10.0)));

    assert_eq!(
        page_log(&mut ctx),
        vec!["page 0: press (10.0, 10.0)", "page 0: release (10.0, 10.0)"]
    );
}

#[test]
fn scroll_events_are_left_to_the_toolkit() {
    let mut ctx = context(Config::default());
    assert!(!ctx.handle(&event(EventKind::Scroll, DeviceClass::Mouse, 10.0, 10.0)));
    assert!(ctx.host_mut().take_callbacks().is_empty());
}

#[test]
fn ignored_devices_are_consumed_silently() {
    let mut ctx = context(Config::default());
    assert!(ctx.handle(&event(EventKind::ButtonPress, DeviceClass::Ignore, 10.0, 10.0)));
    assert!(ctx.host_mut().take_callbacks().is_empty());
}

#[test]
fn keyboard_events_go_to_the_canvas() {
    let mut ctx = context(Config::default());
    let key = event(EventKind::KeyPress, DeviceClass::Keyboard, 0.0, 0.0).with_button(0x61);
    assert!(ctx.handle(&key));
    assert_eq!(
        ctx.host_mut().take_callbacks(),
        vec![Callback::Key {
            pressed: true,
            keyval: 0x61
        }]
    );
}

#[test]
fn combo_device_draws_and_types() {
    let mut ctx = context(Config::default());
    ctx.handle(&event(EventKind::ButtonPress, DeviceClass::MouseKeyboardCombo, 10.0, 10.0));
    ctx.handle(&event(EventKind::ButtonRelease, DeviceClass::MouseKeyboardCombo, 10.0, 10.0));
    assert_eq!(
        page_log(&mut ctx),
        vec!["page 0: press (10.0, 10.0)", "page 0: release (10.0, 10.0)"]
    );

    let key = event(EventKind::KeyRelease, DeviceClass::MouseKeyboardCombo, 0.0, 0.0)
        .with_button(0xff0d);
    assert!(ctx.handle(&key));
    assert_eq!(
        ctx.host_mut().take_callbacks(),
        vec![Callback::Key {
            pressed: false,
            keyval: 0xff0d
        }]
    );
}

#[test]
fn blocked_class_is_swallowed() {
    let mut ctx = context(Config::default());
    ctx.block_device(DeviceType::Mouse);
    assert!(ctx.is_blocked(DeviceType::Mouse));
    assert!(!ctx.is_blocked(DeviceType::Stylus));

    assert!(ctx.handle(&event(EventKind::ButtonPress, DeviceClass::Mouse, 10.0, 10.0)));
    assert!(ctx.handle(&event(EventKind::ButtonRelease, DeviceClass::Mouse, 10.0, 10.0)));
    assert!(page_log(&mut ctx).is_empty());

    // Other classes keep working.
    ctx.handle(&event(EventKind::ButtonPress, DeviceClass::Pen, 10.0, 10.0));
    assert_eq!(page_log(&mut ctx), vec!["page 0: press (10.0, 10.0)"]);

    ctx.unblock_device(DeviceType::Mouse);
    assert!(!ctx.is_blocked(DeviceType::Mouse));
}

#[test]
fn blocking_mid_stroke_drops_the_sequence() {
    let mut ctx = context(Config::default());
    ctx.handle(&event(EventKind::ButtonPress, DeviceClass::Mouse, 10.0, 10.0));
    ctx.block_device(DeviceType::Mouse);
    ctx.unblock_device(DeviceType::Mouse);
    assert!(!ctx.is_input_running(DeviceType::Mouse));
}

#[test]
fn geometry_tool_gets_first_look_at_pointer_events() {
    let mut ctx = context(Config::default());
    let seen = Rc::new(RefCell::new(Vec::new()));
    ctx.set_geometry_tool_handler(Box::new(Ruler {
        consume: true,
        seen: seen.clone(),
    }));

    assert!(ctx.handle(&event(EventKind::ButtonPress, DeviceClass::Pen, 10.0, 10.0)));
    assert!(page_log(&mut ctx).is_empty());

    // Keys never reach the instrument.
    ctx.handle(&event(EventKind::KeyPress, DeviceClass::Keyboard, 0.0, 0.0).with_button(1));
    assert_eq!(*seen.borrow(), vec!["ButtonPress".to_string()]);

    ctx.clear_geometry_tool_handler();
    ctx.handle(&event(EventKind::ButtonPress, DeviceClass::Pen, 10.0, 10.0));
    assert_eq!(page_log(&mut ctx), vec!["page 0: press (10.0, 10.0)"]);
}

#[test]
fn geometry_tool_passes_unwanted_events_on() {
    let mut ctx = context(Config::default());
    ctx.set_geometry_tool_handler(Box::new(Ruler::default()));

    ctx.handle(&event(EventKind::ButtonPress, DeviceClass::Mouse, 10.0, 10.0));
    assert_eq!(page_log(&mut ctx), vec!["page 0: press (10.0, 10.0)"]);
}

#[test]
fn geometry_tool_hears_each_block_transition_once() {
    let mut ctx = context(Config::default());
    let seen = Rc::new(RefCell::new(Vec::new()));
    ctx.set_geometry_tool_handler(Box::new(Ruler {
        consume: false,
        seen: seen.clone(),
    }));

    ctx.block_device(DeviceType::Stylus);
    ctx.block_device(DeviceType::Stylus);
    ctx.unblock_device(DeviceType::Stylus);
    ctx.unblock_device(DeviceType::Stylus);

    assert_eq!(
        *seen.borrow(),
        vec!["block Stylus".to_string(), "unblock Stylus".to_string()]
    );
}

#[test]
fn stylus_activity_blocks_touch_until_idle() {
    let (mut ctx, calls) = palm_rejecting_context();
    let start = Instant::now();
    assert_eq!(ctx.next_deadline(), None);

    ctx.handle_at(&event(EventKind::Motion, DeviceClass::Pen, 10.0, 10.0), start);
    assert!(ctx.is_blocked(DeviceType::Touchscreen));
    assert_eq!(calls.borrow().disabled, 1);
    assert_eq!(ctx.next_deadline(), Some(start + Duration::from_millis(1000)));
    ctx.host_mut().take_callbacks();

    let finger = event(EventKind::ButtonPress, DeviceClass::Touchscreen, 50.0, 50.0).with_sequence(1);
    assert!(ctx.handle_at(&finger, start + Duration::from_millis(100)));
    ctx.handle_at(
        &event(EventKind::Motion, DeviceClass::Touchscreen, 50.0, 60.0).with_sequence(1),
        start + Duration::from_millis(200),
    );
    assert!(ctx.host_mut().take_callbacks().is_empty());

    ctx.tick(start + Duration::from_millis(999));
    assert!(ctx.is_blocked(DeviceType::Touchscreen));

    ctx.tick(start + Duration::from_millis(1000));
    assert!(!ctx.is_blocked(DeviceType::Touchscreen));
    assert_eq!(calls.borrow().enabled, 1);
    assert_eq!(ctx.next_deadline(), None);
}

#[test]
fn touch_returns_once_the_pen_leaves() {
    let (mut ctx, calls) = palm_rejecting_context();
    let start = Instant::now();

    ctx.handle_at(&event(EventKind::Motion, DeviceClass::Pen, 10.0, 10.0), start);
    assert!(ctx.is_blocked(DeviceType::Touchscreen));

    ctx.handle_at(
        &event(EventKind::Leave, DeviceClass::Pen, 10.0, 10.0),
        start + Duration::from_millis(10),
    );
    assert!(!ctx.is_blocked(DeviceType::Touchscreen));
    assert_eq!(calls.borrow().enabled, 1);

    // Fingers pan again.
    ctx.handle(&event(EventKind::ButtonPress, DeviceClass::Touchscreen, 50.0, 50.0).with_sequence(7));
    ctx.handle(&event(EventKind::Motion, DeviceClass::Touchscreen, 50.0, 60.0).with_sequence(7));
    assert!(
        ctx.host_mut()
            .take_callbacks()
            .contains(&Callback::Scroll { dx: 0.0, dy: -10.0 })
    );
}

#[test]
fn replacing_palm_rejection_releases_touch() {
    let (mut ctx, _calls) = palm_rejecting_context();
    ctx.handle(&event(EventKind::Motion, DeviceClass::Pen, 10.0, 10.0));
    assert!(ctx.is_blocked(DeviceType::Touchscreen));

    let config = ctx.config().hand_recognition.clone();
    ctx.set_hand_recognition(HandRecognition::with_mechanism(&config, None));
    assert!(!ctx.is_blocked(DeviceType::Touchscreen));
    assert!(!ctx.hand_recognition().is_enabled());
}

#[test]
fn touch_drawing_routes_fingers_to_the_pen_pipeline() {
    let mut config = Config::default();
    config.touch.drawing = true;
    let mut ctx = context(config);

    let finger = event(EventKind::ButtonPress, DeviceClass::Touchscreen, 10.0, 10.0).with_sequence(1);
    assert!(ctx.handle(&finger));
    assert!(ctx.is_input_running(DeviceType::Touchscreen));
}

fn undo_with_touch_drawing() -> InputContext<RecordingHost> {
    let mut config = Config::default();
    config.touch.drawing = true;
    config.touch.undo_gesture = true;
    let mut ctx = context(config);
    ctx.host_mut().undo_depth = 1;
    ctx
}

fn finger(kind: EventKind, id: u64, x: f64, y: f64) -> InputEvent {
    event(kind, DeviceClass::Touchscreen, x, y).with_sequence(id)
}

#[test]
fn drawn_stroke_then_second_finger_is_not_an_undo_tap() {
    let mut ctx = undo_with_touch_drawing();

    ctx.handle(&finger(EventKind::ButtonPress, 1, 10.0, 50.0));
    for x in [30.0, 60.0, 90.0] {
        assert!(ctx.handle(&finger(EventKind::Motion, 1, x, 50.0)));
    }
    ctx.handle(&finger(EventKind::ButtonPress, 2, 50.0, 20.0));
    ctx.handle(&finger(EventKind::ButtonRelease, 2, 50.0, 20.0));
    ctx.handle(&finger(EventKind::ButtonRelease, 1, 90.0, 50.0));

    let callbacks = ctx.host_mut().take_callbacks();
    assert!(callbacks.iter().any(|c| matches!(c, Callback::SequenceCancel { .. })));
    assert!(!callbacks.contains(&Callback::Undo));
}

#[test]
fn still_finger_plus_tap_undoes_with_touch_drawing() {
    let mut ctx = undo_with_touch_drawing();

    ctx.handle(&finger(EventKind::ButtonPress, 1, 10.0, 50.0));
    ctx.handle(&finger(EventKind::Motion, 1, 12.0, 51.0));
    ctx.handle(&finger(EventKind::ButtonPress, 2, 50.0, 20.0));
    ctx.handle(&finger(EventKind::ButtonRelease, 2, 50.0, 20.0));
    ctx.handle(&finger(EventKind::ButtonRelease, 1, 12.0, 51.0));

    let callbacks = ctx.host_mut().take_callbacks();
    assert_eq!(callbacks.iter().filter(|c| **c == Callback::Undo).count(), 1);
}

#[test]
fn raw_events_are_classified_by_source() {
    let mut ctx = context(Config::default());
    assert!(ctx.handle_raw(&raw(RawEventKind::ButtonPress, InputSource::Pen, "Wacom Pen", 10.0, 10.0)));
    assert!(ctx.is_input_running(DeviceType::Stylus));

    let names: Vec<&str> = ctx.devices().known_devices().collect();
    assert_eq!(names, vec!["Wacom Pen"]);
}

#[test]
fn raw_events_follow_device_overrides() {
    let mut config = Config::default();
    config
        .devices
        .insert("Presenter".to_string(), DeviceClassOption::Disabled);
    let mut ctx = context(config);

    assert!(ctx.handle_raw(&raw(RawEventKind::ButtonPress, InputSource::Mouse, "Presenter", 10.0, 10.0)));
    assert!(!ctx.is_input_running(DeviceType::Mouse));
    assert!(ctx.host_mut().take_callbacks().is_empty());
}

#[test]
fn raw_scroll_is_not_consumed() {
    let mut ctx = context(Config::default());
    assert!(!ctx.handle_raw(&raw(RawEventKind::Scroll, InputSource::Touchpad, "", 10.0, 10.0)));
}
