//! Hook for on-canvas geometry instruments (rulers, set squares).

use super::context::DeviceType;
use super::events::InputEvent;

/// An instrument that gets the first look at pointer events while it is
/// shown. Returning true consumes the event.
pub trait GeometryToolHandler<H> {
    fn handle(&mut self, event: &InputEvent, host: &mut H) -> bool;

    /// A device class was blocked in the dispatcher.
    fn block_device(&mut self, _device: DeviceType) {}

    /// A device class was unblocked in the dispatcher.
    fn unblock_device(&mut self, _device: DeviceType) {}
}
