use uuid::Uuid;

use crate::catalog::ImageBatch;
use crate::gesture::{Affordances, GesturePhase, PointerId, ScrollCommand, SwipeDirection};
use crate::sentinel::SentinelEdge;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    Cancel,
    Leave,
}

/// `client_x` is relative to the left edge of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub pointer: PointerId,
    pub client_x: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRef {
    Id(Uuid),
    Index(usize),
}

/// Host -> Carousel
#[derive(Debug, Clone, PartialEq)]
pub enum SliderInput {
    Pointer(PointerEvent),
    Swipe(SwipeDirection),
    /// An image finished loading and reports its rendered width.
    ItemLoaded { item: ItemRef, width: f64 },
    Resize(f64),
    /// The last smooth scroll finished.
    Settled,
}

/// Carousel -> Fetcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchBatch(pub SentinelEdge);

/// Fetcher -> Carousel
#[derive(Debug)]
pub struct BatchFetched {
    pub edge: SentinelEdge,
    pub batch: ImageBatch,
}

/// Carousel -> Host, published after every handled event.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderFrame {
    pub scroll: Option<ScrollCommand>,
    pub scroll_offset: f64,
    pub affordances: Affordances,
    pub image_count: usize,
    pub phase: GesturePhase,
}
