//! Tap filter: decides whether a finished contact was a tap.

use crate::config::TapFilterConfig;

/// Returns true when a press/release pair should be reclassified as a tap.
///
/// `since_previous_end` is the time since the previous action ended, `None`
/// if there was none. A tap right after another action is an aftershock of
/// it and stays a stroke.
pub(crate) fn is_tap(
    config: &TapFilterConfig,
    distance: f64,
    duration_ms: u32,
    since_previous_end: Option<u32>,
) -> bool {
    let no_movement = distance < config.max_distance_px();
    let fast_enough = duration_ms < config.max_duration_ms;
    let not_an_aftershock = since_previous_end.is_none_or(|gap| gap > config.repetition_ms);
    no_movement && fast_enough && not_an_aftershock
}
