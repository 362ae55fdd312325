//! Configuration enum types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::input::{DeviceClass, InputSource};

/// How a physical device should be treated, overriding its reported source.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceClassOption {
    /// Ignore all events of the device
    Disabled,
    Mouse,
    Pen,
    Eraser,
    Touchscreen,
    /// Pointer device that also sends key events (e.g. presentation remotes)
    MouseKeyboardCombo,
}

impl DeviceClassOption {
    /// Default treatment for a device source without an override.
    pub fn for_source(source: InputSource) -> Self {
        match source {
            InputSource::Mouse
            | InputSource::Cursor
            | InputSource::Touchpad
            | InputSource::Trackpoint => DeviceClassOption::Mouse,
            InputSource::Pen => DeviceClassOption::Pen,
            InputSource::Eraser => DeviceClassOption::Eraser,
            InputSource::Touchscreen => DeviceClassOption::Touchscreen,
            InputSource::Keyboard | InputSource::TabletPad => DeviceClassOption::Disabled,
        }
    }

    /// Device class events of this device are tagged with.
    ///
    /// Keyboards are never matched by their own option, so a disabled
    /// keyboard still maps to [`DeviceClass::Keyboard`].
    pub fn device_class(self, source: InputSource) -> DeviceClass {
        match self {
            DeviceClassOption::Disabled if source == InputSource::Keyboard => DeviceClass::Keyboard,
            DeviceClassOption::Disabled => DeviceClass::Ignore,
            DeviceClassOption::Mouse => DeviceClass::Mouse,
            DeviceClassOption::Pen => DeviceClass::Pen,
            DeviceClassOption::Eraser => DeviceClass::Eraser,
            DeviceClassOption::Touchscreen => DeviceClass::Touchscreen,
            DeviceClassOption::MouseKeyboardCombo => DeviceClass::MouseKeyboardCombo,
        }
    }
}

/// Mechanism used to switch the touchscreen off while the stylus is in use.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TouchDisableMethod {
    /// X11 device toggling when running an X11 session, nothing otherwise
    #[default]
    Auto,
    /// X11 device toggling (requires an X11 session)
    X11,
    /// User supplied enable/disable commands
    Custom,
}
