//! Edge scrolling while a pressed pointer is outside the canvas widget.
//!
//! Runs as a deadline on the caller's event loop: the host calls
//! [`InputContext::tick`](crate::input::InputContext::tick) and every elapsed
//! interval nudges the view once more.

use std::time::{Duration, Instant};

use kurbo::{Point, Vec2};

/// Inset from the widget edges that counts as "inside" again.
pub(crate) const WIDGET_SCROLL_BORDER: f64 = 25.0;
const SCROLL_STEP: f64 = 10.0;
const SCROLL_INTERVAL: Duration = Duration::from_millis(500);

/// Scroll direction for a widget-local position near or beyond the edges.
pub(crate) fn edge_offset(local: Point, width: f64, height: f64) -> Vec2 {
    let mut offset = Vec2::ZERO;
    if local.x < WIDGET_SCROLL_BORDER {
        offset.x = -SCROLL_STEP;
    }
    if local.y < WIDGET_SCROLL_BORDER {
        offset.y = -SCROLL_STEP;
    }
    if local.x > width - WIDGET_SCROLL_BORDER {
        offset.x = SCROLL_STEP;
    }
    if local.y > height - WIDGET_SCROLL_BORDER {
        offset.y = SCROLL_STEP;
    }
    offset
}

/// True if a widget-local position is comfortably inside the widget.
pub(crate) fn is_well_inside(local: Point, width: f64, height: f64) -> bool {
    local.x > WIDGET_SCROLL_BORDER
        && local.y > WIDGET_SCROLL_BORDER
        && local.x < width - WIDGET_SCROLL_BORDER
        && local.y < height - WIDGET_SCROLL_BORDER
}

#[derive(Debug, Default)]
pub(crate) struct AutoScroll {
    offset: Vec2,
    next_tick: Option<Instant>,
}

impl AutoScroll {
    /// Arms the scroller; the first step is due immediately.
    pub(crate) fn start(&mut self, offset: Vec2, now: Instant) {
        self.offset = offset;
        self.next_tick = Some(now);
    }

    pub(crate) fn cancel(&mut self) {
        self.next_tick = None;
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.next_tick
    }

    /// Returns the scroll step to apply if one is due.
    pub(crate) fn poll(&mut self, now: Instant) -> Option<Vec2> {
        let due = self.next_tick?;
        if now < due {
            return None;
        }
        self.next_tick = Some(now + SCROLL_INTERVAL);
        Some(self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_points_towards_exited_edges() {
        assert_eq!(
            edge_offset(Point::new(-5.0, 300.0), 800.0, 600.0),
            Vec2::new(-10.0, 0.0)
        );
        assert_eq!(
            edge_offset(Point::new(790.0, 590.0), 800.0, 600.0),
            Vec2::new(10.0, 10.0)
        );
    }

    #[test]
    fn ticks_twice_per_second_until_cancelled() {
        let start = Instant::now();
        let mut scroll = AutoScroll::default();
        scroll.start(Vec2::new(0.0, 10.0), start);

        assert_eq!(scroll.poll(start), Some(Vec2::new(0.0, 10.0)));
        assert_eq!(scroll.poll(start + Duration::from_millis(200)), None);
        assert!(scroll.poll(start + Duration::from_millis(500)).is_some());

        scroll.cancel();
        assert_eq!(scroll.deadline(), None);
        assert_eq!(scroll.poll(start + Duration::from_secs(5)), None);
    }
}
