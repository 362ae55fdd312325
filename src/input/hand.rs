//! Palm rejection: the touchscreen goes quiet while the stylus is in use.
//!
//! Any pen or eraser event disables touch. Touch comes back once the stylus
//! has been idle for the configured timeout, or right away when the stylus
//! leaves the canvas. The timer is a plain deadline driven by
//! [`InputContext::tick`](crate::input::InputContext::tick).

use std::time::{Duration, Instant};

use log::{debug, warn};

use super::events::DeviceClass;
use super::touch_disable::{SessionKind, TouchDisable, select_mechanism};
use crate::config::HandRecognitionConfig;

const MIN_TIMEOUT_MS: u64 = 500;
/// A pen event this recent means the stylus is still moving; check again later.
const STILL_ACTIVE: Duration = Duration::from_millis(20);

/// What the dispatcher has to do with the in-process touch handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TouchTransition {
    Disable,
    Enable,
}

pub struct HandRecognition {
    enabled: bool,
    timeout: Duration,
    touch_enabled: bool,
    last_pen_action: Option<Instant>,
    deadline: Option<Instant>,
    mechanism: Option<Box<dyn TouchDisable>>,
}

impl std::fmt::Debug for HandRecognition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandRecognition")
            .field("enabled", &self.enabled)
            .field("timeout", &self.timeout)
            .field("touch_enabled", &self.touch_enabled)
            .field("deadline", &self.deadline)
            .field("mechanism", &self.mechanism.as_ref().map(|m| m.name()))
            .finish()
    }
}

impl HandRecognition {
    /// Builds palm rejection for the current session.
    pub fn new(config: &HandRecognitionConfig) -> Self {
        let mechanism = if config.enabled {
            select_mechanism(config, SessionKind::detect())
        } else {
            None
        };
        Self::with_mechanism(config, mechanism)
    }

    /// Builds palm rejection around an explicit mechanism.
    pub fn with_mechanism(
        config: &HandRecognitionConfig,
        mechanism: Option<Box<dyn TouchDisable>>,
    ) -> Self {
        let enabled = config.enabled && mechanism.is_some();
        if config.enabled && !enabled {
            warn!("Hand recognition enabled but no way to disable the touchscreen; touch stays on");
        }
        Self {
            enabled,
            timeout: Duration::from_millis(config.timeout_ms.max(MIN_TIMEOUT_MS)),
            touch_enabled: true,
            last_pen_action: None,
            deadline: None,
            mechanism,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_touch_enabled(&self) -> bool {
        self.touch_enabled
    }

    /// When the re-enable check is due, if one is scheduled.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Records any event; stylus events switch touch off.
    pub(crate) fn event(&mut self, class: DeviceClass, now: Instant) -> Option<TouchTransition> {
        if !self.enabled || !class.is_stylus() {
            return None;
        }
        self.last_pen_action = Some(now);
        if !self.touch_enabled {
            return None;
        }
        self.disable_touch();
        self.deadline = Some(now + self.timeout);
        Some(TouchTransition::Disable)
    }

    /// Runs the timer if it is due.
    pub(crate) fn tick(&mut self, now: Instant) -> Option<TouchTransition> {
        let due = self.deadline?;
        if now < due {
            return None;
        }
        let idle = self
            .last_pen_action
            .map_or(self.timeout, |last| now.saturating_duration_since(last));

        if idle < STILL_ACTIVE {
            self.deadline = Some(now + self.timeout);
            return None;
        }
        if idle >= self.timeout {
            debug!("Stylus idle for {:?}, enabling touch", idle);
            self.enable_touch();
            return Some(TouchTransition::Enable);
        }
        self.deadline = Some(now + (self.timeout - idle));
        None
    }

    /// Re-enables touch immediately, e.g. when the stylus leaves the canvas.
    pub(crate) fn unblock(&mut self) -> Option<TouchTransition> {
        if !self.enabled || self.touch_enabled {
            return None;
        }
        self.enable_touch();
        Some(TouchTransition::Enable)
    }

    pub(crate) fn offer_device(&mut self, name: &str) {
        if let Some(mechanism) = self.mechanism.as_mut() {
            mechanism.offer_device(name);
        }
    }

    fn enable_touch(&mut self) {
        self.touch_enabled = true;
        self.deadline = None;
        if let Some(mechanism) = self.mechanism.as_mut() {
            if let Err(e) = mechanism.enable() {
                warn!("Failed to enable touchscreen via {}: {}", mechanism.name(), e);
            }
        }
    }

    fn disable_touch(&mut self) {
        self.touch_enabled = false;
        if let Some(mechanism) = self.mechanism.as_mut() {
            if let Err(e) = mechanism.disable() {
                warn!("Failed to disable touchscreen via {}: {}", mechanism.name(), e);
            }
        }
    }
}

impl Drop for HandRecognition {
    fn drop(&mut self) {
        if self.enabled && !self.touch_enabled {
            self.enable_touch();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::input::touch_disable::TouchDisableError;

    #[derive(Default)]
    struct Calls {
        enabled: u32,
        disabled: u32,
    }

    struct FakeSwitch(Rc<RefCell<Calls>>);

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

    fn recognition(timeout_ms: u64) -> (HandRecognition, Rc<RefCell<Calls>>) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let config = HandRecognitionConfig {
            enabled: true,
            timeout_ms,
            ..HandRecognitionConfig::default()
        };
        let hand = HandRecognition::with_mechanism(&config, Some(Box::new(FakeSwitch(calls.clone()))));
        (hand, calls)
    }

    #[test]
    fn pen_event_disables_touch_once() {
        let (mut hand, calls) = recognition(1000);
        let now = Instant::now();

        assert_eq!(hand.event(DeviceClass::Pen, now), Some(TouchTransition::Disable));
        assert_eq!(hand.event(DeviceClass::Eraser, now), None);
        assert_eq!(hand.event(DeviceClass::Mouse, now), None);
        assert!(!hand.is_touch_enabled());
        assert_eq!(calls.borrow().disabled, 1);
    }

    #[test]
    fn touch_returns_after_idle_timeout() {
        let (mut hand, calls) = recognition(1000);
        let start = Instant::now();
        hand.event(DeviceClass::Pen, start);
        // Pen keeps moving for a while; the first check reschedules.
        hand.event(DeviceClass::Pen, start + Duration::from_millis(400));

        assert_eq!(hand.tick(start + Duration::from_millis(999)), None);
        assert_eq!(hand.tick(start + Duration::from_millis(1000)), None);
        assert_eq!(hand.deadline(), Some(start + Duration::from_millis(1400)));

        assert_eq!(
            hand.tick(start + Duration::from_millis(1400)),
            Some(TouchTransition::Enable)
        );
        assert!(hand.is_touch_enabled());
        assert_eq!(hand.deadline(), None);
        assert_eq!(calls.borrow().enabled, 1);
    }

    #[test]
    fn recent_pen_activity_postpones_by_full_timeout() {
        let (mut hand, _calls) = recognition(500);
        let start = Instant::now();
        hand.event(DeviceClass::Pen, start);
        hand.event(DeviceClass::Pen, start + Duration::from_millis(490));

        let check = start + Duration::from_millis(500);
        assert_eq!(hand.tick(check), None);
        assert_eq!(hand.deadline(), Some(check + Duration::from_millis(500)));
    }

    #[test]
    fn timeout_is_at_least_half_a_second() {
        let (hand, _calls) = recognition(100);
        assert_eq!(hand.timeout, Duration::from_millis(500));
    }

    #[test]
    fn unblock_and_drop_restore_touch() {
        let (mut hand, calls) = recognition(1000);
        let now = Instant::now();
        hand.event(DeviceClass::Pen, now);
        assert_eq!(hand.unblock(), Some(TouchTransition::Enable));
        assert_eq!(hand.unblock(), None);

        hand.event(DeviceClass::Pen, now);
        drop(hand);
        assert_eq!(calls.borrow().enabled, 2);
    }

    #[test]
    fn missing_mechanism_disables_recognition() {
        let config = HandRecognitionConfig {
            enabled: true,
            ..HandRecognitionConfig::default()
        };
        let mut hand = HandRecognition::with_mechanism(&config, None);
        assert!(!hand.is_enabled());
        assert_eq!(hand.event(DeviceClass::Pen, Instant::now()), None);
        assert!(hand.is_touch_enabled());
    }
}
