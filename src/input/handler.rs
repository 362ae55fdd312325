//! Contract shared by every device handler.

use std::time::Instant;

use super::events::InputEvent;
use crate::config::Config;

/// What a handler may touch while it processes one event.
pub(crate) struct HandlerEnv<'a, H> {
    pub host: &'a mut H,
    pub config: &'a Config,
    pub now: Instant,
    /// Set by the stylus handler when the pen leaves the canvas; the
    /// dispatcher turns it into an immediate touchscreen re-enable.
    pub release_touch: bool,
}

impl<'a, H> HandlerEnv<'a, H> {
    pub(crate) fn new(host: &'a mut H, config: &'a Config, now: Instant) -> Self {
        Self {
            host,
            config,
            now,
            release_touch: false,
        }
    }
}

/// Block bookkeeping plus the event entry point.
///
/// A blocked handler swallows every event without touching its state.
/// Blocking or unblocking twice in a row is a no-op; the hooks run once per
/// transition.
pub(crate) trait InputHandler<H> {
    fn blocked(&self) -> bool;
    fn set_blocked(&mut self, blocked: bool);

    fn handle_impl(&mut self, event: &InputEvent, env: &mut HandlerEnv<'_, H>) -> bool;

    fn on_block(&mut self, _env: &mut HandlerEnv<'_, H>) {}
    fn on_unblock(&mut self, _env: &mut HandlerEnv<'_, H>) {}

    fn handle(&mut self, event: &InputEvent, env: &mut HandlerEnv<'_, H>) -> bool {
        if self.blocked() {
            return true;
        }
        self.handle_impl(event, env)
    }

    fn block(&mut self, block: bool, env: &mut HandlerEnv<'_, H>) {
        if self.blocked() == block {
            return;
        }
        self.set_blocked(block);
        if block {
            self.on_block(env);
        } else {
            self.on_unblock(env);
        }
    }
}
