//! Geometry of the horizontal strip.
//!
//! The strip is laid out as `[leading sentinel][item 0] .. [item n-1][trailing sentinel]`,
//! every slot one item wide and separated by a fixed gap. Offsets are in logical
//! pixels measured from the left edge of the scrollable content.

/// Half-open horizontal interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: f64,
    pub end: f64,
}

impl Span {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.start && x < self.end
    }

    pub fn overlap(&self, other: &Span) -> f64 {
        (self.end.min(other.end) - self.start.max(other.start)).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    LeadingSentinel,
    Item(usize),
    TrailingSentinel,
}

/// Measured strip, only available once an item has reported its rendered width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripGeometry {
    pub item_width: f64,
    pub gap: f64,
    pub item_count: usize,
    pub viewport_width: f64,
}

impl StripGeometry {
    /// Snapping quantum: one item plus one gap.
    pub fn swipe_width(&self) -> f64 {
        self.item_width + self.gap
    }

    pub fn scroll_width(&self) -> f64 {
        let slots = (self.item_count + 2) as f64;
        slots * self.item_width + (slots - 1.0) * self.gap
    }

    pub fn max_offset(&self) -> f64 {
        (self.scroll_width() - self.viewport_width).max(0.0)
    }

    pub fn viewport(&self, offset: f64) -> Span {
        Span::new(offset, offset + self.viewport_width)
    }

    fn slot_span(&self, index: usize) -> Span {
        let start = index as f64 * self.swipe_width();
        Span::new(start, start + self.item_width)
    }

    pub fn span_of(&self, slot: Slot) -> Span {
        match slot {
            Slot::LeadingSentinel => self.slot_span(0),
            Slot::Item(i) => self.slot_span(i + 1),
            Slot::TrailingSentinel => self.slot_span(self.item_count + 1),
        }
    }

    /// Index of the left-most item that is entirely inside the viewport.
    pub fn first_fully_visible_item(&self, offset: f64) -> Option<usize> {
        let viewport = self.viewport(offset);
        (0..self.item_count).find(|&i| {
            let span = self.span_of(Slot::Item(i));
            span.start >= viewport.start && span.end <= viewport.end
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip() -> StripGeometry {
        StripGeometry {
            item_width: 300.0,
            gap: 16.0,
            item_count: 8,
            viewport_width: 960.0,
        }
    }

    #[test]
    fn widths_include_sentinels_and_gaps() {
        let g = strip();
        assert_eq!(g.swipe_width(), 316.0);
        assert_eq!(g.scroll_width(), 10.0 * 300.0 + 9.0 * 16.0);
        assert_eq!(g.max_offset(), 3144.0 - 960.0);
    }

    #[test]
    fn first_fully_visible_item_follows_offset() {
        let g = strip();
        assert_eq!(g.first_fully_visible_item(0.0), Some(0));
        assert_eq!(g.first_fully_visible_item(316.0), Some(0));
        assert_eq!(g.first_fully_visible_item(317.0), Some(1));
    }

    #[test]
    fn small_content_cannot_scroll() {
        let g = StripGeometry {
            item_count: 0,
            ..strip()
        };
        assert_eq!(g.max_offset(), 0.0);
    }
}
