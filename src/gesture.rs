//! Pointer-drag tracking, discrete swipes and snapping.
//!
//! The controller never owns the scroll position. Callers hand in the current
//! offset and apply the returned [`ScrollCommand`]; the only state kept here is
//! the gesture phase and, while dragging, its anchor.

use tracing::{debug, trace};

pub type PointerId = u32;

/// Host hook for exclusive pointer delivery during a drag.
pub trait PointerInputSource {
    fn set_capture(&mut self, pointer: PointerId);
    fn release_capture(&mut self, pointer: PointerId);
    fn has_capture(&self, pointer: PointerId) -> bool;
}

/// Headless capture: remembers which pointer currently owns the gesture.
#[derive(Debug, Default)]
pub struct CapturedPointer {
    current: Option<PointerId>,
}

impl PointerInputSource for CapturedPointer {
    fn set_capture(&mut self, pointer: PointerId) {
        self.current = Some(pointer);
    }

    fn release_capture(&mut self, pointer: PointerId) {
        if self.current == Some(pointer) {
            self.current = None;
        }
    }

    fn has_capture(&self, pointer: PointerId) -> bool {
        self.current == Some(pointer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragAnchor {
    pub start_scroll_offset: f64,
    pub start_pointer_x: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GesturePhase {
    Idle,
    Dragging {
        pointer: PointerId,
        anchor: DragAnchor,
    },
    /// Smooth scroll towards `target` is running; a new press interrupts it.
    Settling {
        target: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCommand {
    pub offset: f64,
    pub behavior: ScrollBehavior,
}

impl ScrollCommand {
    pub fn instant(offset: f64) -> Self {
        Self {
            offset,
            behavior: ScrollBehavior::Instant,
        }
    }

    pub fn smooth(offset: f64) -> Self {
        Self {
            offset,
            behavior: ScrollBehavior::Smooth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
}

/// Visibility of the navigation buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordances {
    pub can_swipe_left: bool,
    pub can_swipe_right: bool,
}

impl Affordances {
    /// Before anything is measured there is nothing to the left yet.
    pub const INITIAL: Self = Self {
        can_swipe_left: false,
        can_swipe_right: true,
    };

    pub fn compute(offset: f64, max_offset: f64) -> Self {
        Self {
            can_swipe_left: offset > 0.0,
            can_swipe_right: offset < max_offset,
        }
    }
}

/// Snaps `offset` onto a multiple of `swipe_width`.
///
/// Moves forward only once more than `threshold_ratio` of an item has been
/// passed, otherwise falls back to the start of the current item. Snapping an
/// already snapped offset returns it unchanged.
///
/// The position inside the current item is measured from the item's left
/// edge (floored division), so negative offsets snap onto negative multiples.
/// Callers clamp the result into the scrollable range.
pub fn snap_to_nearest_item(offset: f64, swipe_width: f64, threshold_ratio: f64) -> f64 {
    if swipe_width <= 0.0 || !offset.is_finite() {
        return offset;
    }
    let index = (offset / swipe_width).floor();
    let into_item = offset - index * swipe_width;
    if into_item > threshold_ratio * swipe_width {
        (index + 1.0) * swipe_width
    } else {
        index * swipe_width
    }
}

#[derive(Debug)]
pub struct GestureScrollController<P = CapturedPointer> {
    phase: GesturePhase,
    snap_threshold: f64,
    pointer: P,
}

impl GestureScrollController<CapturedPointer> {
    pub fn new(snap_threshold: f64) -> Self {
        Self::with_pointer_source(snap_threshold, CapturedPointer::default())
    }
}

impl<P: PointerInputSource> GestureScrollController<P> {
    pub fn with_pointer_source(snap_threshold: f64, pointer: P) -> Self {
        Self {
            phase: GesturePhase::Idle,
            snap_threshold,
            pointer,
        }
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn pointer_source(&self) -> &P {
        &self.pointer
    }

    /// Starts a drag; interrupts any running settle animation.
    /// Returns false if another pointer already owns the gesture.
    pub fn pointer_down(&mut self, pointer: PointerId, client_x: f64, scroll_offset: f64) -> bool {
        if let GesturePhase::Dragging { pointer: owner, .. } = self.phase {
            trace!(pointer, owner, "press ignored; drag in progress");
            return false;
        }
        self.pointer.set_capture(pointer);
        self.phase = GesturePhase::Dragging {
            pointer,
            anchor: DragAnchor {
                start_scroll_offset: scroll_offset,
                start_pointer_x: client_x,
            },
        };
        debug!(pointer, client_x, scroll_offset, "drag start");
        true
    }

    /// 1:1 tracking while dragging, no smoothing.
    pub fn pointer_move(&mut self, pointer: PointerId, client_x: f64) -> Option<ScrollCommand> {
        let GesturePhase::Dragging { pointer: owner, anchor } = self.phase else {
            return None;
        };
        if owner != pointer || !self.pointer.has_capture(pointer) {
            return None;
        }
        let delta = client_x - anchor.start_pointer_x;
        Some(ScrollCommand::instant(anchor.start_scroll_offset - delta))
    }

    /// Ends a drag (release, cancel or leave) and settles on the nearest item.
    ///
    /// Without a measured `swipe_width` the drag still ends but nothing is
    /// scrolled.
    pub fn pointer_release(
        &mut self,
        pointer: PointerId,
        scroll_offset: f64,
        swipe_width: Option<f64>,
        max_offset: f64,
    ) -> Option<ScrollCommand> {
        let GesturePhase::Dragging { pointer: owner, .. } = self.phase else {
            return None;
        };
        if owner != pointer {
            return None;
        }
        self.pointer.release_capture(pointer);
        let Some(swipe_width) = swipe_width else {
            debug!(pointer, "drag end before any item was measured");
            self.phase = GesturePhase::Idle;
            return None;
        };
        let target = self.settle_target(scroll_offset, swipe_width, max_offset);
        debug!(pointer, scroll_offset, target, "drag end");
        self.phase = GesturePhase::Settling { target };
        Some(ScrollCommand::smooth(target))
    }

    /// Button-driven swipe by one item; valid in any phase.
    pub fn swipe(
        &mut self,
        direction: SwipeDirection,
        scroll_offset: f64,
        swipe_width: Option<f64>,
        max_offset: f64,
    ) -> Option<ScrollCommand> {
        let Some(swipe_width) = swipe_width else {
            debug!(?direction, "swipe ignored; no item measured yet");
            return None;
        };
        if let GesturePhase::Dragging { pointer, .. } = self.phase {
            self.pointer.release_capture(pointer);
        }
        let raw = match direction {
            SwipeDirection::Left => scroll_offset - swipe_width,
            SwipeDirection::Right => scroll_offset + swipe_width,
        };
        let target = self.settle_target(raw, swipe_width, max_offset);
        debug!(?direction, scroll_offset, target, "swipe");
        self.phase = GesturePhase::Settling { target };
        Some(ScrollCommand::smooth(target))
    }

    /// The smooth scroll finished.
    pub fn settled(&mut self) {
        if matches!(self.phase, GesturePhase::Settling { .. }) {
            self.phase = GesturePhase::Idle;
        }
    }

    /// Moves the coordinate frame, e.g. after content was inserted on the left.
    pub fn shift(&mut self, delta: f64) {
        match &mut self.phase {
            GesturePhase::Dragging { anchor, .. } => anchor.start_scroll_offset += delta,
            GesturePhase::Settling { target } => *target += delta,
            GesturePhase::Idle => {}
        }
    }

    fn settle_target(&self, raw: f64, swipe_width: f64, max_offset: f64) -> f64 {
        snap_to_nearest_item(raw, swipe_width, self.snap_threshold).clamp(0.0, max_offset.max(0.0))
    }
}
