//! Event dispatcher.
//!
//! [`InputContext`] owns the host, one handler per device class, the device
//! block list and palm rejection. Every event goes through the same route:
//!
//! 1. palm rejection sees it (stylus activity switches touch off)
//! 2. an active geometry tool may consume pointer events
//! 3. events of blocked device classes are swallowed
//! 4. the class handler processes it
//!
//! Timers (palm rejection timeout, edge auto-scroll) are deadlines. Hosts
//! call [`InputContext::tick`] from their event loop once
//! [`InputContext::next_deadline`] has passed.

use std::time::Instant;

use log::{debug, trace};

use super::devices::DeviceClassMap;
use super::events::{DeviceClass, EventKind, InputEvent, RawInputEvent};
use super::geometry_tool::GeometryToolHandler;
use super::hand::{HandRecognition, TouchTransition};
use super::handler::{HandlerEnv, InputHandler};
use super::host::InputHost;
use super::keyboard::handle_key;
use super::pen::{PenInputHandler, update_kinetic_scrolling};
use super::touch::TouchInputHandler;
use crate::config::Config;

/// Device classes that can be blocked as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Mouse,
    Stylus,
    Touchscreen,
}

impl DeviceType {
    pub const ALL: [DeviceType; 3] = [DeviceType::Mouse, DeviceType::Stylus, DeviceType::Touchscreen];
}

#[derive(Debug, Default, Clone, Copy)]
struct DeviceBlockList {
    mouse: bool,
    stylus: bool,
    touchscreen: bool,
}

impl DeviceBlockList {
    fn get(&self, device: DeviceType) -> bool {
        match device {
            DeviceType::Mouse => self.mouse,
            DeviceType::Stylus => self.stylus,
            DeviceType::Touchscreen => self.touchscreen,
        }
    }

    fn set(&mut self, device: DeviceType, blocked: bool) {
        match device {
            DeviceType::Mouse => self.mouse = blocked,
            DeviceType::Stylus => self.stylus = blocked,
            DeviceType::Touchscreen => self.touchscreen = blocked,
        }
    }
}

fn is_pointer(class: DeviceClass) -> bool {
    !matches!(class, DeviceClass::Keyboard | DeviceClass::Ignore)
}

/// Input entry point of a canvas.
pub struct InputContext<H: InputHost> {
    host: H,
    config: Config,
    devices: DeviceClassMap,
    blocked: DeviceBlockList,

    mouse: PenInputHandler,
    stylus: PenInputHandler,
    touch_drawing: PenInputHandler,
    touch: TouchInputHandler,

    hand: HandRecognition,
    geometry: Option<Box<dyn GeometryToolHandler<H>>>,
}

impl<H: InputHost> InputContext<H> {
    pub fn new(host: H, config: Config) -> Self {
        let hand = HandRecognition::new(&config.hand_recognition);
        Self::with_hand_recognition(host, config, hand)
    }

    /// Creates a context with explicitly built palm rejection.
    pub fn with_hand_recognition(host: H, config: Config, hand: HandRecognition) -> Self {
        Self {
            host,
            devices: DeviceClassMap::new(config.devices.clone()),
            config,
            blocked: DeviceBlockList::default(),
            mouse: PenInputHandler::mouse(),
            stylus: PenInputHandler::stylus(),
            touch_drawing: PenInputHandler::touch_drawing(),
            touch: TouchInputHandler::default(),
            hand,
            geometry: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Applies a new configuration; palm rejection is rebuilt from it.
    pub fn set_config(&mut self, config: Config) {
        self.devices.set_overrides(config.devices.clone());
        let hand = HandRecognition::new(&config.hand_recognition);
        self.config = config;
        self.set_hand_recognition(hand);
    }

    /// Replaces palm rejection. The old instance re-enables touch on drop.
    pub fn set_hand_recognition(&mut self, hand: HandRecognition) {
        let touch_was_disabled = !self.hand.is_touch_enabled();
        self.hand = hand;
        if touch_was_disabled {
            self.set_device_blocked(DeviceType::Touchscreen, false, Instant::now());
        }
    }

    pub fn hand_recognition(&self) -> &HandRecognition {
        &self.hand
    }

    pub fn devices(&self) -> &DeviceClassMap {
        &self.devices
    }

    /// Classifies and handles a toolkit event.
    pub fn handle_raw(&mut self, raw: &RawInputEvent) -> bool {
        self.handle_raw_at(raw, Instant::now())
    }

    pub fn handle_raw_at(&mut self, raw: &RawInputEvent, now: Instant) -> bool {
        let class = self.devices.classify(&raw.device_name, raw.source);
        if class == DeviceClass::Touchscreen {
            self.hand.offer_device(&raw.device_name);
        }
        let event = raw.translate(class);
        self.handle_at(&event, now)
    }

    /// Handles one event; returns true if it was consumed.
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        self.handle_at(event, Instant::now())
    }

    pub fn handle_at(&mut self, event: &InputEvent, now: Instant) -> bool {
        trace!("{event}");
        // Wheel and touchpad scrolling stay with the toolkit.
        if event.kind == EventKind::Scroll {
            return false;
        }

        if let Some(transition) = self.hand.event(event.device_class, now) {
            self.apply_touch_transition(transition, now);
        }

        if is_pointer(event.device_class) {
            if let Some(geometry) = self.geometry.as_mut() {
                if geometry.handle(event, &mut self.host) {
                    return true;
                }
            }
        }

        let Self {
            host,
            config,
            blocked,
            mouse,
            stylus,
            touch_drawing,
            touch,
            ..
        } = self;
        let mut env = HandlerEnv::new(host, &*config, now);

        let consumed = match event.device_class {
            DeviceClass::Pen | DeviceClass::Eraser => {
                blocked.stylus || stylus.handle(event, &mut env)
            }
            DeviceClass::Mouse => blocked.mouse || mouse.handle(event, &mut env),
            DeviceClass::MouseKeyboardCombo => {
                blocked.mouse || mouse.handle(event, &mut env) || handle_key(event, env.host)
            }
            DeviceClass::Touchscreen => {
                blocked.touchscreen
                    || if config.touch.drawing {
                        if touch_drawing.handle(event, &mut env) {
                            touch.follow_consumed_motion(event);
                            true
                        } else {
                            touch.handle(event, &mut env)
                        }
                    } else {
                        touch.handle(event, &mut env)
                    }
            }
            DeviceClass::Keyboard => handle_key(event, env.host),
            DeviceClass::Ignore => true,
        };

        let release_touch = env.release_touch;
        if release_touch {
            if let Some(transition) = self.hand.unblock() {
                self.apply_touch_transition(transition, now);
            }
        }
        consumed
    }

    pub fn block_device(&mut self, device: DeviceType) {
        self.set_device_blocked(device, true, Instant::now());
    }

    pub fn unblock_device(&mut self, device: DeviceType) {
        self.set_device_blocked(device, false, Instant::now());
    }

    pub fn is_blocked(&self, device: DeviceType) -> bool {
        self.blocked.get(device)
    }

    /// Whether a pointer action of `device` is in progress.
    pub fn is_input_running(&self, device: DeviceType) -> bool {
        match device {
            DeviceType::Mouse => self.mouse.is_input_running(),
            DeviceType::Stylus => self.stylus.is_input_running(),
            DeviceType::Touchscreen => self.touch_drawing.is_input_running(),
        }
    }

    pub fn set_geometry_tool_handler(&mut self, handler: Box<dyn GeometryToolHandler<H>>) {
        self.geometry = Some(handler);
    }

    pub fn clear_geometry_tool_handler(&mut self) {
        self.geometry = None;
    }

    /// Hosts call this after switching tools outside of input handling.
    pub fn on_tool_changed(&mut self) {
        update_kinetic_scrolling(&mut self.host, &self.config);
    }

    /// Earliest instant at which [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.hand.deadline(),
            self.mouse.deadline(),
            self.stylus.deadline(),
            self.touch_drawing.deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Runs every timer that is due at `now`.
    pub fn tick(&mut self, now: Instant) {
        if let Some(transition) = self.hand.tick(now) {
            self.apply_touch_transition(transition, now);
        }
        self.mouse.tick(now, &mut self.host);
        self.stylus.tick(now, &mut self.host);
        self.touch_drawing.tick(now, &mut self.host);
    }

    fn apply_touch_transition(&mut self, transition: TouchTransition, now: Instant) {
        let block = transition == TouchTransition::Disable;
        debug!("Palm rejection: touchscreen {}", if block { "blocked" } else { "unblocked" });
        self.set_device_blocked(DeviceType::Touchscreen, block, now);
    }

    fn set_device_blocked(&mut self, device: DeviceType, block: bool, now: Instant) {
        if self.blocked.get(device) == block {
            return;
        }
        if let Some(geometry) = self.geometry.as_mut() {
            if block {
                geometry.block_device(device);
            } else {
                geometry.unblock_device(device);
            }
        }
        self.blocked.set(device, block);

        let Self {
            host,
            config,
            mouse,
            stylus,
            touch_drawing,
            touch,
            ..
        } = self;
        let mut env = HandlerEnv::new(host, &*config, now);
        match device {
            DeviceType::Mouse => mouse.block(block, &mut env),
            DeviceType::Stylus => stylus.block(block, &mut env),
            DeviceType::Touchscreen => {
                touch_drawing.block(block, &mut env);
                touch.block(block, &mut env);
            }
        }
    }
}

#[cfg(test)]
mod tests;
