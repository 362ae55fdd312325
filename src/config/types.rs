//! Configuration type definitions.

use super::enums::TouchDisableMethod;
use crate::input::{Button, ToolType};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Pressure handling.
///
/// Hardware pressure is used when sensitivity is enabled. Devices without a
/// pressure axis can have pressure inferred from drawing speed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PressureConfig {
    /// Forward hardware pressure to the page
    #[serde(default = "default_true")]
    pub sensitivity: bool,

    /// Estimate pressure from stroke speed when the device reports none
    #[serde(default)]
    pub inference: bool,

    /// Factor applied to every pressure value (valid range: 0.1 - 10.0)
    #[serde(default = "default_pressure_multiplier")]
    pub multiplier: f64,

    /// Lower bound applied after the multiplier (valid range: 0.0 - 1.0)
    #[serde(default = "default_minimum_pressure")]
    pub minimum: f64,
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            sensitivity: true,
            inference: false,
            multiplier: default_pressure_multiplier(),
            minimum: default_minimum_pressure(),
        }
    }
}

/// Tap filter: very short, still contacts become taps instead of strokes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TapFilterConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Longest press still counted as a tap, in milliseconds
    #[serde(default = "default_tap_max_duration")]
    pub max_duration_ms: u32,

    /// Largest movement still counted as a tap, in millimetres
    #[serde(default = "default_tap_max_distance")]
    pub max_distance_mm: f64,

    /// Minimum gap to the previous action before another tap is recognised
    #[serde(default = "default_tap_repetition")]
    pub repetition_ms: u32,

    /// Display resolution used to convert millimetres to pixels (valid range: 36 - 600)
    #[serde(default = "default_display_dpi")]
    pub display_dpi: u32,
}

impl Default for TapFilterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_duration_ms: default_tap_max_duration(),
            max_distance_mm: default_tap_max_distance(),
            repetition_ms: default_tap_repetition(),
            display_dpi: default_display_dpi(),
        }
    }
}

impl TapFilterConfig {
    /// Maximum tap distance converted to display pixels.
    pub fn max_distance_px(&self) -> f64 {
        self.max_distance_mm * f64::from(self.display_dpi) / 25.4
    }
}

/// Stylus quirks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct StylusConfig {
    /// Number of press/motion events discarded at the start of each contact
    /// (valid range: 0 - 10)
    #[serde(default)]
    pub ignored_events: u32,

    /// Treat side buttons like the tip ("tip switches before contact" drivers)
    #[serde(default)]
    pub tpc_button: bool,
}

/// Touchscreen behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TouchConfig {
    /// Draw with a single finger instead of scrolling
    #[serde(default)]
    pub drawing: bool,

    /// Pinch to zoom with two fingers
    #[serde(default = "default_true")]
    pub zoom_gestures: bool,

    /// Percentage the finger distance must change before zooming starts
    /// (valid range: 0.0 - 100.0)
    #[serde(default)]
    pub zoom_start_threshold: f64,

    /// Two-finger tap triggers undo
    #[serde(default)]
    pub undo_gesture: bool,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            drawing: false,
            zoom_gestures: true,
            zoom_start_threshold: 0.0,
            undo_gesture: false,
        }
    }
}

/// Palm rejection: switch the touchscreen off while the stylus is active.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HandRecognitionConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Time without stylus activity before touch is re-enabled (minimum 500)
    #[serde(default = "default_hand_timeout")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub method: TouchDisableMethod,

    /// Shell command enabling the touchscreen (method = "custom")
    #[serde(default)]
    pub enable_command: String,

    /// Shell command disabling the touchscreen (method = "custom")
    #[serde(default)]
    pub disable_command: String,

    /// Device name handed to xinput (method = "x11"); empty selects the
    /// first touchscreen the dispatcher has seen
    #[serde(default)]
    pub touch_device: String,
}

impl Default for HandRecognitionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_ms: default_hand_timeout(),
            method: TouchDisableMethod::Auto,
            enable_command: String::new(),
            disable_command: String::new(),
            touch_device: String::new(),
        }
    }
}

/// Canvas widget behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WindowConfig {
    /// Keep drawing when the pointer leaves the canvas widget
    #[serde(default = "default_true")]
    pub draw_outside: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { draw_outside: true }
    }
}

/// Tool bound to one button.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ButtonBinding {
    /// Tool activated while the button is held; none keeps the toolbar tool
    #[serde(default)]
    pub tool: Option<ToolType>,

    /// Keep the toolbar tool instead of switching ("don't change")
    #[serde(default)]
    pub keep_tool: bool,

    /// Use the hand tool instead whenever a drawing tool is selected
    #[serde(default)]
    pub disable_drawing: bool,

    /// Restrict the binding to one device name (touch binding only)
    #[serde(default)]
    pub device: String,
}

impl ButtonBinding {
    fn with_tool(tool: ToolType) -> Self {
        Self {
            tool: Some(tool),
            ..Self::default()
        }
    }
}

/// Button to tool bindings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ButtonsConfig {
    #[serde(default = "default_middle_binding")]
    pub mouse_middle: ButtonBinding,
    #[serde(default)]
    pub mouse_right: ButtonBinding,
    #[serde(default = "default_eraser_binding")]
    pub eraser: ButtonBinding,
    #[serde(default)]
    pub stylus_one: ButtonBinding,
    #[serde(default)]
    pub stylus_two: ButtonBinding,
    #[serde(default)]
    pub touch: ButtonBinding,
}

impl Default for ButtonsConfig {
    fn default() -> Self {
        Self {
            mouse_middle: default_middle_binding(),
            mouse_right: ButtonBinding::default(),
            eraser: default_eraser_binding(),
            stylus_one: ButtonBinding::default(),
            stylus_two: ButtonBinding::default(),
            touch: ButtonBinding::default(),
        }
    }
}

impl ButtonsConfig {
    pub fn binding(&self, button: Button) -> &ButtonBinding {
        match button {
            Button::MouseMiddle => &self.mouse_middle,
            Button::MouseRight => &self.mouse_right,
            Button::Eraser => &self.eraser,
            Button::StylusOne => &self.stylus_one,
            Button::StylusTwo => &self.stylus_two,
            Button::Touch => &self.touch,
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_pressure_multiplier() -> f64 {
    1.0
}

fn default_minimum_pressure() -> f64 {
    0.05
}

fn default_tap_max_duration() -> u32 {
    150
}

fn default_tap_max_distance() -> f64 {
    1.0
}

fn default_tap_repetition() -> u32 {
    500
}

fn default_display_dpi() -> u32 {
    72
}

fn default_hand_timeout() -> u64 {
    1000
}

fn default_middle_binding() -> ButtonBinding {
    ButtonBinding::with_tool(ToolType::Hand)
}

fn default_eraser_binding() -> ButtonBinding {
    ButtonBinding::with_tool(ToolType::Eraser)
}
