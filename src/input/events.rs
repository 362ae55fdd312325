//! Input event types shared by every handler.
//!
//! An [`InputEvent`] is an immutable snapshot of one hardware callback, already
//! tagged with the [`DeviceClass`] it belongs to. Backends that only know the
//! physical source of an event build a [`RawInputEvent`] instead and let the
//! dispatcher classify it (see [`crate::input::DeviceClassMap`]).

use std::fmt;

use kurbo::Point;
use serde::{Deserialize, Serialize};

use super::modifiers::Modifiers;

/// Logical kind of an input event after translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Button pressed, pen tip touched the surface or a touch began
    ButtonPress,
    /// Second press of a double click
    DoublePress,
    /// Third press of a triple click
    TriplePress,
    /// Button released, pen lifted or a touch ended/was cancelled
    ButtonRelease,
    /// Pointer or touch contact moved
    Motion,
    /// Pointer entered the canvas widget
    Enter,
    /// Pointer left the canvas widget
    Leave,
    ProximityIn,
    ProximityOut,
    /// Scroll wheel / smooth scroll (left to the toolkit)
    Scroll,
    /// The device grab was taken away from the canvas
    GrabBroken,
    KeyPress,
    KeyRelease,
}

/// Device class an event is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Mouse,
    Pen,
    Eraser,
    Touchscreen,
    Keyboard,
    /// Devices reporting both pointer and key events (e.g. presenters)
    MouseKeyboardCombo,
    /// Disabled by configuration; events are swallowed
    Ignore,
}

impl DeviceClass {
    /// Returns true for stylus tips and erasers.
    pub fn is_stylus(self) -> bool {
        matches!(self, DeviceClass::Pen | DeviceClass::Eraser)
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            DeviceClass::Mouse => "mouse",
            DeviceClass::Pen => "pen",
            DeviceClass::Eraser => "eraser",
            DeviceClass::Touchscreen => "touchscreen",
            DeviceClass::Keyboard => "keyboard",
            DeviceClass::MouseKeyboardCombo => "mouse+keyboard",
            DeviceClass::Ignore => "ignored",
        }
    }
}

/// Opaque identity of one touch contact, stable from touch begin to touch end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceId(pub u64);

/// Primary button (left mouse button, pen tip, touch contact).
pub const BUTTON_PRIMARY: u32 = 1;
/// Middle mouse button / first stylus side button.
pub const BUTTON_MIDDLE: u32 = 2;
/// Right mouse button / second stylus side button.
pub const BUTTON_SECONDARY: u32 = 3;

/// One hardware event, tagged with its device class.
///
/// Created once per raw callback and never mutated afterwards. Absolute
/// coordinates are in surface (root window) space and stay stable while the
/// canvas scrolls; relative coordinates are canvas-local.
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub kind: EventKind,
    pub device_class: DeviceClass,
    /// `None` for mouse and stylus events
    pub sequence: Option<SequenceId>,
    pub absolute: Point,
    pub relative: Point,
    /// Hardware pressure, `None` if the device does not report it
    pub pressure: Option<f64>,
    /// Button index (1 = primary); key value for keyboard events
    pub button: u32,
    pub modifiers: Modifiers,
    /// Monotonic timestamp in milliseconds
    pub timestamp: u32,
    pub device_name: String,
}

impl InputEvent {
    /// Creates an event whose absolute and relative positions coincide.
    pub fn new(kind: EventKind, device_class: DeviceClass, x: f64, y: f64) -> Self {
        Self {
            kind,
            device_class,
            sequence: None,
            absolute: Point::new(x, y),
            relative: Point::new(x, y),
            pressure: None,
            button: if matches!(
                kind,
                EventKind::ButtonPress
                    | EventKind::ButtonRelease
                    | EventKind::DoublePress
                    | EventKind::TriplePress
            ) {
                BUTTON_PRIMARY
            } else {
                0
            },
            modifiers: Modifiers::new(),
            timestamp: 0,
            device_name: String::new(),
        }
    }

    pub fn with_sequence(mut self, id: u64) -> Self {
        self.sequence = Some(SequenceId(id));
        self
    }

    pub fn with_button(mut self, button: u32) -> Self {
        self.button = button;
        self
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = Some(pressure);
        self
    }

    pub fn at(mut self, timestamp: u32) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = name.into();
        self
    }

    /// Overrides the absolute (surface space) position only.
    pub fn with_absolute(mut self, x: f64, y: f64) -> Self {
        self.absolute = Point::new(x, y);
        self
    }
}

impl fmt::Display for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:>8}ms] {} {:?}",
            self.timestamp,
            self.device_class.label(),
            self.kind
        )?;
        if let Some(SequenceId(id)) = self.sequence {
            write!(f, " seq={id}")?;
        }
        write!(
            f,
            " rel=({:.1}, {:.1}) abs=({:.1}, {:.1})",
            self.relative.x, self.relative.y, self.absolute.x, self.absolute.y
        )?;
        if let Some(pressure) = self.pressure {
            write!(f, " pressure={pressure:.3}")?;
        }
        if self.button != 0 {
            write!(f, " button={}", self.button)?;
        }
        if !self.device_name.is_empty() {
            write!(f, " device=\"{}\"", self.device_name)?;
        }
        Ok(())
    }
}

/// Physical source of a raw event, as reported by the windowing toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    Mouse,
    Pen,
    Eraser,
    Cursor,
    Keyboard,
    Touchscreen,
    Touchpad,
    Trackpoint,
    TabletPad,
}

/// Event kind as delivered by the windowing toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawEventKind {
    ButtonPress,
    DoubleButtonPress,
    TripleButtonPress,
    ButtonRelease,
    Motion,
    TouchBegin,
    TouchUpdate,
    TouchEnd,
    TouchCancel,
    Enter,
    Leave,
    ProximityIn,
    ProximityOut,
    Scroll,
    GrabBroken,
    KeyPress,
    KeyRelease,
}

impl RawEventKind {
    fn is_touch(self) -> bool {
        matches!(
            self,
            RawEventKind::TouchBegin
                | RawEventKind::TouchUpdate
                | RawEventKind::TouchEnd
                | RawEventKind::TouchCancel
        )
    }

    fn translate(self) -> EventKind {
        match self {
            RawEventKind::Motion | RawEventKind::TouchUpdate => EventKind::Motion,
            RawEventKind::ButtonPress | RawEventKind::TouchBegin => EventKind::ButtonPress,
            RawEventKind::DoubleButtonPress => EventKind::DoublePress,
            RawEventKind::TripleButtonPress => EventKind::TriplePress,
            RawEventKind::ButtonRelease | RawEventKind::TouchEnd | RawEventKind::TouchCancel => {
                EventKind::ButtonRelease
            }
            RawEventKind::Enter => EventKind::Enter,
            RawEventKind::Leave => EventKind::Leave,
            RawEventKind::ProximityIn => EventKind::ProximityIn,
            RawEventKind::ProximityOut => EventKind::ProximityOut,
            RawEventKind::Scroll => EventKind::Scroll,
            RawEventKind::GrabBroken => EventKind::GrabBroken,
            RawEventKind::KeyPress => EventKind::KeyPress,
            RawEventKind::KeyRelease => EventKind::KeyRelease,
        }
    }
}

/// Untranslated toolkit event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInputEvent {
    pub kind: RawEventKind,
    pub source: InputSource,
    #[serde(default)]
    pub device_name: String,
    /// Canvas-local coordinates
    pub x: f64,
    pub y: f64,
    /// Surface coordinates; defaults to the canvas-local ones
    #[serde(default)]
    pub root: Option<(f64, f64)>,
    #[serde(default)]
    pub pressure: Option<f64>,
    #[serde(default)]
    pub button: u32,
    /// Key value for key events
    #[serde(default)]
    pub keyval: u32,
    #[serde(default)]
    pub sequence: Option<u64>,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub time: u32,
}

impl RawInputEvent {
    /// Converts the toolkit event into an [`InputEvent`] of the given class.
    ///
    /// Touch events always report the primary button, carry their sequence
    /// and never carry pressure.
    pub fn translate(&self, device_class: DeviceClass) -> InputEvent {
        let kind = self.kind.translate();
        let (root_x, root_y) = self.root.unwrap_or((self.x, self.y));

        let mut button = match kind {
            EventKind::ButtonPress
            | EventKind::ButtonRelease
            | EventKind::DoublePress
            | EventKind::TriplePress => self.button,
            _ => 0,
        };
        let mut pressure = self.pressure;
        let mut sequence = None;

        if self.kind.is_touch() {
            if matches!(
                self.kind,
                RawEventKind::TouchBegin | RawEventKind::TouchEnd | RawEventKind::TouchCancel
            ) {
                button = BUTTON_PRIMARY;
            }
            sequence = self.sequence.map(SequenceId);
            pressure = None;
        }
        if matches!(kind, EventKind::KeyPress | EventKind::KeyRelease) {
            button = self.keyval;
        }

        InputEvent {
            kind,
            device_class,
            sequence,
            absolute: Point::new(root_x, root_y),
            relative: Point::new(self.x, self.y),
            pressure,
            button,
            modifiers: self.modifiers,
            timestamp: self.time,
            device_name: self.device_name.clone(),
        }
    }
}
