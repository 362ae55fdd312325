//! Pressure inference and filtering.
//!
//! Devices without a pressure axis (mice, most touchscreens) can have pressure
//! estimated from drawing speed: slow strokes get heavier, fast strokes
//! lighter. The estimate is smoothed against the previous sample so a stroke
//! ramps up instead of jumping.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::input::position::NO_PRESSURE;
use crate::config::PressureConfig;

const ESTIMATE_CAP: f64 = 2.0;

/// One smoothing step of the speed-based estimate.
///
/// `dt` is the time since the previous sample divided by ten, `distance` the
/// distance to the previous sample in page pixels and `previous` the previous
/// estimate of this stroke.
pub fn infer_pressure(dt: f64, distance: f64, previous: f64) -> f64 {
    if distance == 0.0 {
        return (dt / 10.0).sqrt() - 0.1;
    }
    let inverse_speed = dt / (distance + 0.001);
    let raw = FRAC_PI_2 + (inverse_speed * PI - 1.3).atan();
    raw.min(ESTIMATE_CAP) / 5.0 + previous * 4.0 / 5.0
}

/// Maps a smoothed estimate to the pressure handed to the page.
pub fn estimate_to_pressure(estimate: f64) -> f64 {
    (estimate * 1.1 + 0.8) / 2.0
}

/// Applies the configured multiplier and floor. [`NO_PRESSURE`] passes through.
pub fn filter_pressure(pressure: f64, config: &PressureConfig) -> f64 {
    if pressure == NO_PRESSURE {
        return pressure;
    }
    (pressure * config.multiplier).max(config.minimum)
}

/// Running estimate for the stroke in progress.
#[derive(Debug, Default)]
pub(crate) struct PressureEstimator {
    last: f64,
}

impl PressureEstimator {
    /// Forgets the previous stroke.
    pub(crate) fn reset(&mut self) {
        self.last = 0.0;
    }

    /// Feeds one sample; returns the pressure for it.
    pub(crate) fn sample(&mut self, elapsed_ms: u32, distance: f64) -> f64 {
        let dt = f64::from(elapsed_ms) / 10.0;
        self.last = infer_pressure(dt, distance, self.last);
        estimate_to_pressure(self.last)
    }
}
