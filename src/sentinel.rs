use tracing::trace;

use crate::layout::Span;

/// Which end of the strip a sentinel guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentinelEdge {
    Leading,
    Trailing,
}

/// Receives a call every time a sentinel becomes visible.
pub trait VisibilityReporter {
    fn on_visible(&mut self, edge: SentinelEdge);
}

impl VisibilityReporter for Vec<SentinelEdge> {
    fn on_visible(&mut self, edge: SentinelEdge) {
        self.push(edge);
    }
}

/// Fraction of `target` covered by `viewport`, in `[0, 1]`.
pub fn intersection_ratio(target: Span, viewport: Span) -> f64 {
    let width = target.width();
    if width <= 0.0 {
        return 0.0;
    }
    (target.overlap(&viewport) / width).clamp(0.0, 1.0)
}

/// Placeholder at one end of the strip that reports each transition into
/// visibility. A detached sentinel reports nothing.
#[derive(Debug)]
pub struct VisibilitySentinel {
    edge: SentinelEdge,
    threshold: f64,
    attached: bool,
    intersecting: bool,
}

impl VisibilitySentinel {
    pub fn new(edge: SentinelEdge, threshold: f64) -> Self {
        Self {
            edge,
            threshold,
            attached: true,
            intersecting: false,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Re-arms the sentinel; the next qualifying observation fires even if the
    /// sentinel was already on screen when it was detached.
    pub fn attach(&mut self) {
        self.attached = true;
        self.intersecting = false;
    }

    pub fn detach(&mut self) {
        self.attached = false;
        self.intersecting = false;
    }

    /// Feeds the current geometry. Returns true when the reporter was called.
    pub fn observe<R>(&mut self, bounds: Span, viewport: Span, reporter: &mut R) -> bool
    where
        R: VisibilityReporter + ?Sized,
    {
        if !self.attached {
            return false;
        }
        let ratio = intersection_ratio(bounds, viewport);
        let now_intersecting = ratio >= self.threshold;
        let entered = now_intersecting && !self.intersecting;
        self.intersecting = now_intersecting;
        if entered {
            trace!(edge = ?self.edge, ratio, "sentinel visible");
            reporter.on_visible(self.edge);
        }
        entered
    }

    /// Pointer presses on a sentinel never reach the scroller.
    pub fn swallows_press(&self, bounds: Span, content_x: f64) -> bool {
        bounds.contains(content_x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTINEL: Span = Span {
        start: 0.0,
        end: 300.0,
    };

    fn viewport_at(offset: f64) -> Span {
        Span::new(offset, offset + 960.0)
    }

    #[test]
    fn ratio_is_relative_to_the_target() {
        assert_eq!(intersection_ratio(SENTINEL, viewport_at(0.0)), 1.0);
        assert_eq!(intersection_ratio(SENTINEL, viewport_at(150.0)), 0.5);
        assert_eq!(intersection_ratio(SENTINEL, viewport_at(316.0)), 0.0);
        assert_eq!(intersection_ratio(Span::new(5.0, 5.0), viewport_at(0.0)), 0.0);
    }

    #[test]
    fn fires_on_each_entry_only() {
        let mut sentinel = VisibilitySentinel::new(SentinelEdge::Leading, 0.5);
        let mut seen = Vec::new();

        assert!(!sentinel.observe(SENTINEL, viewport_at(316.0), &mut seen));
        assert!(sentinel.observe(SENTINEL, viewport_at(100.0), &mut seen));
        // still visible, no repeat
        assert!(!sentinel.observe(SENTINEL, viewport_at(50.0), &mut seen));
        assert!(!sentinel.observe(SENTINEL, viewport_at(200.0), &mut seen));
        assert!(sentinel.observe(SENTINEL, viewport_at(150.0), &mut seen));

        assert_eq!(seen, vec![SentinelEdge::Leading, SentinelEdge::Leading]);
    }

    #[test]
    fn detached_sentinel_is_silent_until_reattached() {
        let mut sentinel = VisibilitySentinel::new(SentinelEdge::Trailing, 0.5);
        let mut seen = Vec::new();
        sentinel.detach();
        assert!(!sentinel.observe(SENTINEL, viewport_at(0.0), &mut seen));
        assert!(seen.is_empty());

        sentinel.attach();
        assert!(sentinel.observe(SENTINEL, viewport_at(0.0), &mut seen));
        assert_eq!(seen, vec![SentinelEdge::Trailing]);
    }

    #[test]
    fn swallows_presses_inside_its_bounds() {
        let sentinel = VisibilitySentinel::new(SentinelEdge::Leading, 0.5);
        assert!(sentinel.swallows_press(SENTINEL, 10.0));
        assert!(!sentinel.swallows_press(SENTINEL, 300.0));
    }
}
