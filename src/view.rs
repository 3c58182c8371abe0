use std::collections::{HashMap, HashSet};

use tracing::{debug, info, trace};
use uuid::Uuid;

use crate::catalog::{ImageBatch, ImageDescriptor};
use crate::config::Configuration;
use crate::events::{ItemRef, PointerEvent, PointerEventKind};
use crate::gesture::{
    Affordances, CapturedPointer, GesturePhase, GestureScrollController, PointerId,
    PointerInputSource, ScrollCommand, SwipeDirection,
};
use crate::layout::{Slot, StripGeometry};
use crate::sentinel::{SentinelEdge, VisibilitySentinel};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSettings {
    pub gap: f64,
    pub snap_threshold: f64,
    pub visibility_threshold: f64,
    pub viewport_width: f64,
}

impl From<&Configuration> for ViewSettings {
    fn from(cfg: &Configuration) -> Self {
        Self {
            gap: cfg.gap_px,
            snap_threshold: cfg.snap_threshold,
            visibility_threshold: cfg.visibility_threshold,
            viewport_width: cfg.viewport_width,
        }
    }
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self::from(&Configuration::default())
    }
}

/// Mutable state of one mounted carousel.
#[derive(Debug, Clone)]
pub struct SliderState {
    /// Mounted images, left to right. Only ever grows.
    pub images: Vec<ImageDescriptor>,
    pub scroll_offset: f64,
    pub viewport_width: f64,
    pub affordances: Affordances,
    /// One-shot: the initial batch reported its width and the strip moved in by one item.
    pub loaded: bool,
}

/// Horizontally scrollable strip of images flanked by two sentinels.
///
/// Every mutation of [`SliderState`] goes through this type. Operations that
/// need a measured item width quietly do nothing until one is known.
#[derive(Debug)]
pub struct CarouselView<P = CapturedPointer> {
    state: SliderState,
    gap: f64,
    widths: HashMap<Uuid, f64>,
    initial_last: Option<Uuid>,
    controller: GestureScrollController<P>,
    leading: VisibilitySentinel,
    trailing: VisibilitySentinel,
    pending: HashSet<SentinelEdge>,
}

impl CarouselView<CapturedPointer> {
    pub fn mount(settings: ViewSettings, initial: ImageBatch) -> Self {
        Self::with_pointer_source(settings, initial, CapturedPointer::default())
    }
}

impl<P: PointerInputSource> CarouselView<P> {
    pub fn with_pointer_source(settings: ViewSettings, initial: ImageBatch, pointer: P) -> Self {
        let initial_last = initial.last().map(|d| d.id);
        debug!(images = initial.len(), "carousel mounted");
        Self {
            state: SliderState {
                images: initial,
                scroll_offset: 0.0,
                viewport_width: settings.viewport_width,
                affordances: Affordances::INITIAL,
                loaded: false,
            },
            gap: settings.gap,
            widths: HashMap::new(),
            initial_last,
            controller: GestureScrollController::with_pointer_source(
                settings.snap_threshold,
                pointer,
            ),
            leading: VisibilitySentinel::new(SentinelEdge::Leading, settings.visibility_threshold),
            trailing: VisibilitySentinel::new(
                SentinelEdge::Trailing,
                settings.visibility_threshold,
            ),
            pending: HashSet::new(),
        }
    }

    pub fn state(&self) -> &SliderState {
        &self.state
    }

    pub fn phase(&self) -> GesturePhase {
        self.controller.phase()
    }

    pub fn is_pending(&self, edge: SentinelEdge) -> bool {
        self.pending.contains(&edge)
    }

    /// Width of the first mounted item that has reported one.
    pub fn first_visible_item_width(&self) -> Option<f64> {
        self.state
            .images
            .iter()
            .find_map(|d| self.widths.get(&d.id).copied())
    }

    pub fn geometry(&self) -> Option<StripGeometry> {
        self.first_visible_item_width().map(|item_width| StripGeometry {
            item_width,
            gap: self.gap,
            item_count: self.state.images.len(),
            viewport_width: self.state.viewport_width,
        })
    }

    /// Left-most item entirely inside the viewport.
    pub fn leftmost_visible_item(&self) -> Option<&ImageDescriptor> {
        let geometry = self.geometry()?;
        let index = geometry.first_fully_visible_item(self.state.scroll_offset)?;
        self.state.images.get(index)
    }

    fn resolve(&self, item: ItemRef) -> Option<Uuid> {
        match item {
            ItemRef::Id(id) => self.state.images.iter().any(|d| d.id == id).then_some(id),
            ItemRef::Index(i) => self.state.images.get(i).map(|d| d.id),
        }
    }

    /// Records a rendered width. The last image of the initial batch also moves
    /// the strip in by one item, leaving the leading sentinel just off screen.
    /// The jump is absolute, so a leading batch spliced in before that report
    /// is not accounted for.
    pub fn item_loaded(&mut self, item: ItemRef, width: f64) -> Option<ScrollCommand> {
        let Some(id) = self.resolve(item) else {
            debug!(?item, "load report for an item that is not mounted");
            return None;
        };
        if !width.is_finite() || width <= 0.0 {
            debug!(%id, width, "ignoring unusable item width");
            return None;
        }
        self.widths.insert(id, width);

        if !self.state.loaded && self.initial_last == Some(id) {
            self.state.loaded = true;
            let cmd = ScrollCommand::instant(width + self.gap);
            info!(offset = cmd.offset, item_width = width, "initial offset applied");
            self.apply(cmd);
            return Some(cmd);
        }
        self.refresh_affordances();
        None
    }

    pub fn pointer(&mut self, event: PointerEvent) -> Option<ScrollCommand> {
        match event.kind {
            PointerEventKind::Down => {
                self.pointer_down(event.pointer, event.client_x);
                None
            }
            PointerEventKind::Move => self.pointer_move(event.pointer, event.client_x),
            PointerEventKind::Up | PointerEventKind::Cancel | PointerEventKind::Leave => {
                self.pointer_release(event.pointer)
            }
        }
    }

    /// Returns false when the press was swallowed, nothing has been measured
    /// yet, or another drag is active.
    pub fn pointer_down(&mut self, pointer: PointerId, client_x: f64) -> bool {
        let Some(geometry) = self.geometry() else {
            trace!(pointer, "press ignored; no item measured yet");
            return false;
        };
        let x = self.state.scroll_offset + client_x;
        let on_leading = self
            .leading
            .swallows_press(geometry.span_of(Slot::LeadingSentinel), x);
        let on_trailing = self
            .trailing
            .swallows_press(geometry.span_of(Slot::TrailingSentinel), x);
        if on_leading || on_trailing {
            trace!(pointer, x, "press on sentinel swallowed");
            return false;
        }
        self.controller
            .pointer_down(pointer, client_x, self.state.scroll_offset)
    }

    pub fn pointer_move(&mut self, pointer: PointerId, client_x: f64) -> Option<ScrollCommand> {
        let cmd = self.controller.pointer_move(pointer, client_x)?;
        self.apply(cmd);
        Some(cmd)
    }

    pub fn pointer_release(&mut self, pointer: PointerId) -> Option<ScrollCommand> {
        let geometry = self.geometry();
        let cmd = self.controller.pointer_release(
            pointer,
            self.state.scroll_offset,
            geometry.map(|g| g.swipe_width()),
            geometry.map_or(0.0, |g| g.max_offset()),
        )?;
        self.apply(cmd);
        Some(cmd)
    }

    pub fn swipe(&mut self, direction: SwipeDirection) -> Option<ScrollCommand> {
        let geometry = self.geometry();
        let cmd = self.controller.swipe(
            direction,
            self.state.scroll_offset,
            geometry.map(|g| g.swipe_width()),
            geometry.map_or(0.0, |g| g.max_offset()),
        )?;
        self.apply(cmd);
        Some(cmd)
    }

    pub fn settled(&mut self) {
        self.controller.settled();
    }

    /// A new viewport is a new observation root: attached sentinels are
    /// re-armed and report again on the next observation if visible.
    pub fn resize(&mut self, viewport_width: f64) {
        if !viewport_width.is_finite() || viewport_width <= 0.0 {
            debug!(viewport_width, "ignoring unusable viewport width");
            return;
        }
        self.state.viewport_width = viewport_width;
        for sentinel in [&mut self.leading, &mut self.trailing] {
            if sentinel.is_attached() {
                sentinel.attach();
            }
        }
        self.refresh_affordances();
    }

    /// Observes both sentinels against the current scroll position and returns
    /// the edges that need a new batch. An edge whose fetch is still pending is
    /// not requested again.
    pub fn take_visible_edges(&mut self) -> Vec<SentinelEdge> {
        let Some(geometry) = self.geometry() else {
            return Vec::new();
        };
        let viewport = geometry.viewport(self.state.scroll_offset);
        let mut visible = Vec::new();
        self.leading.observe(
            geometry.span_of(Slot::LeadingSentinel),
            viewport,
            &mut visible,
        );
        self.trailing.observe(
            geometry.span_of(Slot::TrailingSentinel),
            viewport,
            &mut visible,
        );
        let pending = &mut self.pending;
        visible.retain(|edge| {
            let fresh = pending.insert(*edge);
            if !fresh {
                trace!(?edge, "fetch already pending");
            }
            fresh
        });
        visible
    }

    /// Adds a fetched batch at `edge`. Prepending shifts the scroll position by
    /// the inserted width so the same item stays under the viewport.
    pub fn splice(&mut self, edge: SentinelEdge, batch: ImageBatch) -> Option<ScrollCommand> {
        self.pending.remove(&edge);
        if batch.is_empty() {
            return None;
        }
        let added = batch.len();
        match edge {
            SentinelEdge::Leading => {
                let shift = self.geometry().map(|g| added as f64 * g.swipe_width());
                let mut grown = batch;
                grown.append(&mut self.state.images);
                self.state.images = grown;
                let Some(shift) = shift else {
                    self.refresh_affordances();
                    return None;
                };
                self.controller.shift(shift);
                let cmd = ScrollCommand::instant(self.state.scroll_offset + shift);
                info!(added, offset = cmd.offset, "prepended batch");
                self.apply(cmd);
                Some(cmd)
            }
            SentinelEdge::Trailing => {
                self.state.images.extend(batch);
                info!(added, total = self.state.images.len(), "appended batch");
                self.refresh_affordances();
                None
            }
        }
    }

    /// Tears down sentinel observation; later visibility changes report nothing.
    pub fn unmount(&mut self) {
        self.leading.detach();
        self.trailing.detach();
        self.pending.clear();
        debug!(images = self.state.images.len(), "carousel unmounted");
    }

    fn apply(&mut self, cmd: ScrollCommand) {
        self.state.scroll_offset = cmd.offset;
        self.refresh_affordances();
    }

    fn refresh_affordances(&mut self) {
        if let Some(geometry) = self.geometry() {
            self.state.affordances =
                Affordances::compute(self.state.scroll_offset, geometry.max_offset());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ImageCatalog;
    use std::path::PathBuf;

    fn catalog() -> ImageCatalog {
        let pool = (1..=8)
            .map(|i| PathBuf::from(format!("img-{i}.jpg")))
            .collect();
        ImageCatalog::seeded(pool, 42)
    }

    fn loaded_view(catalog: &mut ImageCatalog) -> CarouselView {
        let mut view = CarouselView::mount(ViewSettings::default(), catalog.create_batch());
        view.item_loaded(ItemRef::Index(7), 300.0);
        view
    }

    #[test]
    fn starts_with_right_swipe_only() {
        let mut cat = catalog();
        let view = CarouselView::mount(ViewSettings::default(), cat.create_batch());
        assert_eq!(view.state().affordances, Affordances::INITIAL);
        assert_eq!(view.state().scroll_offset, 0.0);
        assert!(!view.state().loaded);
        assert_eq!(view.first_visible_item_width(), None);
    }

    #[test]
    fn last_initial_item_moves_strip_in_by_one() {
        let mut cat = catalog();
        let mut view = CarouselView::mount(ViewSettings::default(), cat.create_batch());

        assert!(view.item_loaded(ItemRef::Index(0), 300.0).is_none());
        assert_eq!(view.state().scroll_offset, 0.0);

        let cmd = view.item_loaded(ItemRef::Index(7), 300.0).unwrap();
        assert_eq!(cmd, ScrollCommand::instant(316.0));
        assert!(view.state().loaded);
        assert!(view.state().affordances.can_swipe_left);
        assert!(view.state().affordances.can_swipe_right);

        // one-shot
        assert!(view.item_loaded(ItemRef::Index(7), 300.0).is_none());
        assert_eq!(view.state().scroll_offset, 316.0);
    }

    #[test]
    fn swipe_right_then_left() {
        let mut cat = catalog();
        let mut view = loaded_view(&mut cat);
        assert_eq!(
            view.swipe(SwipeDirection::Right),
            Some(ScrollCommand::smooth(632.0))
        );
        view.settled();
        assert_eq!(
            view.swipe(SwipeDirection::Left),
            Some(ScrollCommand::smooth(316.0))
        );
        assert_eq!(view.state().scroll_offset, 316.0);
    }

    #[test]
    fn swipe_before_measurement_is_a_noop() {
        let mut cat = catalog();
        let mut view = CarouselView::mount(ViewSettings::default(), cat.create_batch());
        assert!(view.swipe(SwipeDirection::Right).is_none());
        assert_eq!(view.phase(), GesturePhase::Idle);
        assert!(view.take_visible_edges().is_empty());
    }

    #[test]
    fn unknown_items_and_bad_widths_are_ignored() {
        let mut cat = catalog();
        let mut view = CarouselView::mount(ViewSettings::default(), cat.create_batch());
        assert!(view.item_loaded(ItemRef::Id(Uuid::nil()), 300.0).is_none());
        assert!(view.item_loaded(ItemRef::Index(99), 300.0).is_none());
        assert!(view.item_loaded(ItemRef::Index(7), f64::NAN).is_none());
        assert!(!view.state().loaded);
    }

    #[test]
    fn affordances_follow_every_offset_change() {
        let mut cat = catalog();
        let mut view = loaded_view(&mut cat);
        let max = view.geometry().unwrap().max_offset();

        view.pointer_down(1, 500.0);
        view.pointer_move(1, 500.0 + 316.0);
        assert_eq!(view.state().scroll_offset, 0.0);
        assert!(!view.state().affordances.can_swipe_left);

        view.pointer_move(1, 500.0 - (max - 316.0));
        assert_eq!(view.state().scroll_offset, max);
        assert!(view.state().affordances.can_swipe_left);
        assert!(!view.state().affordances.can_swipe_right);
    }

    #[test]
    fn press_on_sentinel_does_not_drag() {
        let mut cat = catalog();
        let mut view = loaded_view(&mut cat);
        view.pointer_down(1, 0.0);
        view.pointer_move(1, 400.0);
        view.pointer_release(1);
        view.settled();
        assert_eq!(view.state().scroll_offset, 0.0);

        // leading sentinel occupies [0, 300) in content space
        assert!(!view.pointer_down(2, 50.0));
        assert_eq!(view.phase(), GesturePhase::Idle);
        assert!(view.pointer_down(2, 320.0));
    }

    #[test]
    fn leading_sentinel_requests_once_while_pending() {
        let mut cat = catalog();
        let mut view = loaded_view(&mut cat);
        assert!(view.take_visible_edges().is_empty());

        view.pointer_down(1, 500.0);
        view.pointer_move(1, 716.0);
        assert_eq!(view.state().scroll_offset, 100.0);
        assert_eq!(view.take_visible_edges(), vec![SentinelEdge::Leading]);
        assert!(view.is_pending(SentinelEdge::Leading));

        view.pointer_move(1, 500.0);
        assert!(view.take_visible_edges().is_empty());
        view.pointer_move(1, 716.0);
        assert!(view.take_visible_edges().is_empty());
    }

    #[test]
    fn prepend_keeps_the_same_item_in_view() {
        let mut cat = catalog();
        let mut view = loaded_view(&mut cat);
        view.pointer_down(1, 500.0);
        view.pointer_move(1, 716.0);
        assert_eq!(view.take_visible_edges(), vec![SentinelEdge::Leading]);
        let before = view.leftmost_visible_item().unwrap().id;

        let cmd = view.splice(SentinelEdge::Leading, cat.create_batch()).unwrap();
        assert_eq!(cmd, ScrollCommand::instant(100.0 + 8.0 * 316.0));
        assert_eq!(view.state().images.len(), 16);
        assert_eq!(view.leftmost_visible_item().unwrap().id, before);
        assert!(view.state().affordances.can_swipe_left);
        assert!(!view.is_pending(SentinelEdge::Leading));

        // the drag continues from the shifted anchor
        let next = view.pointer_move(1, 706.0).unwrap();
        assert_eq!(next.offset, 110.0 + 8.0 * 316.0);
        assert_eq!(view.leftmost_visible_item().unwrap().id, before);
    }

    #[test]
    fn append_leaves_offset_alone() {
        let mut cat = catalog();
        let mut view = loaded_view(&mut cat);
        let max = view.geometry().unwrap().max_offset();
        view.pointer_down(1, 900.0);
        view.pointer_move(1, 900.0 - (max - 316.0));
        assert_eq!(view.take_visible_edges(), vec![SentinelEdge::Trailing]);
        assert!(!view.state().affordances.can_swipe_right);

        assert!(view.splice(SentinelEdge::Trailing, cat.create_batch()).is_none());
        assert_eq!(view.state().images.len(), 16);
        assert_eq!(view.state().scroll_offset, max);
        assert!(view.state().affordances.can_swipe_right);
    }

    #[test]
    fn unmounted_view_stops_observing() {
        let mut cat = catalog();
        let mut view = loaded_view(&mut cat);
        view.unmount();
        view.pointer_down(1, 500.0);
        view.pointer_move(1, 816.0);
        assert!(view.take_visible_edges().is_empty());
    }

    #[test]
    fn resize_recomputes_affordances() {
        let mut cat = catalog();
        let mut view = loaded_view(&mut cat);
        view.resize(10_000.0);
        assert!(!view.state().affordances.can_swipe_right);
        view.resize(-1.0);
        assert_eq!(view.state().viewport_width, 10_000.0);
    }

    #[test]
    fn press_before_measurement_does_not_drag() {
        let mut cat = catalog();
        let mut view = CarouselView::mount(ViewSettings::default(), cat.create_batch());
        assert!(!view.pointer_down(1, 50.0));
        assert!(view.pointer_move(1, 10.0).is_none());
        assert!(view.pointer_release(1).is_none());
        assert_eq!(view.state().scroll_offset, 0.0);
        assert_eq!(view.phase(), GesturePhase::Idle);
    }

    #[test]
    fn resize_rearms_visible_sentinels() {
        let mut cat = catalog();
        let mut view = loaded_view(&mut cat);
        view.pointer_down(1, 500.0);
        view.pointer_move(1, 716.0);
        assert_eq!(view.take_visible_edges(), vec![SentinelEdge::Leading]);

        // an empty batch clears the pending fetch; the sentinel stays on screen
        assert!(view.splice(SentinelEdge::Leading, Vec::new()).is_none());
        assert!(view.take_visible_edges().is_empty());

        view.resize(1_000.0);
        assert_eq!(view.take_visible_edges(), vec![SentinelEdge::Leading]);
    }

    #[test]
    fn resize_after_unmount_stays_silent() {
        let mut cat = catalog();
        let mut view = loaded_view(&mut cat);
        view.pointer_down(1, 500.0);
        view.pointer_move(1, 716.0);
        view.unmount();
        view.resize(1_000.0);
        assert!(view.take_visible_edges().is_empty());
    }
}
