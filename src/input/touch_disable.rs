//! System-level touchscreen switches used by palm rejection.

use std::env;
use std::process::{Command, Stdio};

use log::{info, warn};
use thiserror::Error;

use crate::config::{HandRecognitionConfig, TouchDisableMethod};

/// Errors that can occur while switching the touchscreen.
#[derive(Debug, Error)]
pub enum TouchDisableError {
    #[error("No touchscreen device known to xinput")]
    NoDevice,

    #[error("The {0} command is empty")]
    EmptyCommand(&'static str),

    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed: {stderr}")]
    Failed { command: String, stderr: String },
}

/// A way to switch the touchscreen on and off outside the application.
pub trait TouchDisable {
    /// Short name for log messages.
    fn name(&self) -> &'static str;
    fn enable(&mut self) -> Result<(), TouchDisableError>;
    fn disable(&mut self) -> Result<(), TouchDisableError>;
    /// Tells the mechanism about a touchscreen seen in the event stream.
    fn offer_device(&mut self, _name: &str) {}
}

/// Display session the process runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    X11,
    Wayland,
    Unknown,
}

impl SessionKind {
    /// Reads the session type from the environment.
    pub fn detect() -> Self {
        match env::var("XDG_SESSION_TYPE").as_deref() {
            Ok("x11") => SessionKind::X11,
            Ok("wayland") => SessionKind::Wayland,
            _ if env::var_os("WAYLAND_DISPLAY").is_some() => SessionKind::Wayland,
            _ if env::var_os("DISPLAY").is_some() => SessionKind::X11,
            _ => SessionKind::Unknown,
        }
    }
}

/// Picks the mechanism for the configured method.
///
/// Returns `None` when nothing usable is available; palm rejection then stays
/// off.
pub fn select_mechanism(
    config: &HandRecognitionConfig,
    session: SessionKind,
) -> Option<Box<dyn TouchDisable>> {
    match config.method {
        TouchDisableMethod::Custom => {
            if config.enable_command.trim().is_empty() || config.disable_command.trim().is_empty() {
                warn!("Custom touch disable method needs both enable_command and disable_command");
                return None;
            }
            info!("Using custom commands to disable the touchscreen");
            Some(Box::new(CommandTouchDisable::new(
                &config.enable_command,
                &config.disable_command,
            )))
        }
        TouchDisableMethod::X11 => {
            if session != SessionKind::X11 {
                warn!(
                    "X11 touch disable method selected in a {:?} session; palm rejection disabled",
                    session
                );
                return None;
            }
            info!("Using xinput to disable the touchscreen");
            Some(Box::new(XInputTouchDisable::new(&config.touch_device)))
        }
        TouchDisableMethod::Auto => {
            if session == SessionKind::X11 {
                info!("X11 session detected, using xinput to disable the touchscreen");
                Some(Box::new(XInputTouchDisable::new(&config.touch_device)))
            } else {
                warn!(
                    "No automatic way to disable the touchscreen in a {:?} session; \
                     set hand_recognition.method = \"custom\"",
                    session
                );
                None
            }
        }
    }
}

/// Toggles an X11 input device through `xinput`.
#[derive(Debug)]
pub struct XInputTouchDisable {
    device: String,
}

impl XInputTouchDisable {
    pub fn new(device: &str) -> Self {
        Self {
            device: device.to_string(),
        }
    }

    fn set_enabled(&self, enabled: bool) -> Result<(), TouchDisableError> {
        if self.device.is_empty() {
            return Err(TouchDisableError::NoDevice);
        }
        let verb = if enabled { "enable" } else { "disable" };
        let output = Command::new("xinput")
            .args([verb, self.device.as_str()])
            .stdin(Stdio::null())
            .output()
            .map_err(|source| TouchDisableError::Spawn {
                command: format!("xinput {verb}"),
                source,
            })?;
        if !output.status.success() {
            return Err(TouchDisableError::Failed {
                command: format!("xinput {verb} \"{}\"", self.device),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

impl TouchDisable for XInputTouchDisable {
    fn name(&self) -> &'static str {
        "xinput"
    }

    fn enable(&mut self) -> Result<(), TouchDisableError> {
        self.set_enabled(true)
    }

    fn disable(&mut self) -> Result<(), TouchDisableError> {
        self.set_enabled(false)
    }

    fn offer_device(&mut self, name: &str) {
        if self.device.is_empty() && !name.is_empty() {
            info!("Using touchscreen \"{}\" for palm rejection", name);
            self.device = name.to_string();
        }
    }
}

/// Runs user supplied shell commands.
#[derive(Debug)]
pub struct CommandTouchDisable {
    enable_command: String,
    disable_command: String,
}

impl CommandTouchDisable {
    pub fn new(enable_command: &str, disable_command: &str) -> Self {
        Self {
            enable_command: enable_command.to_string(),
            disable_command: disable_command.to_string(),
        }
    }
}

fn run_shell(command: &str, which: &'static str) -> Result<(), TouchDisableError> {
    if command.trim().is_empty() {
        return Err(TouchDisableError::EmptyCommand(which));
    }
    let output = Command::new("sh")
        .args(["-c", command])
        .stdin(Stdio::null())
        .output()
        .map_err(|source| TouchDisableError::Spawn {
            command: command.to_string(),
            source,
        })?;
    if !output.status.success() {
        return Err(TouchDisableError::Failed {
            command: command.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

impl TouchDisable for CommandTouchDisable {
    fn name(&self) -> &'static str {
        "custom"
    }

    fn enable(&mut self) -> Result<(), TouchDisableError> {
        run_shell(&self.enable_command, "enable")
    }

    fn disable(&mut self) -> Result<(), TouchDisableError> {
        run_shell(&self.disable_command, "disable")
    }
}
