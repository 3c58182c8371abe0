use crate::catalog::ImageBatch;
use crate::events::{BatchFetched, FetchBatch, SliderFrame, SliderInput};
use crate::gesture::ScrollCommand;
use crate::view::{CarouselView, ViewSettings};
use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Owns the mounted carousel and is the only writer of its state.
///
/// Host input and fetched batches are applied one at a time. After each one
/// the sentinels are observed, new fetches are requested and a frame is
/// published. Cancellation unmounts the view; batches still in flight are
/// never applied.
pub async fn run(
    settings: ViewSettings,
    initial: ImageBatch,
    mut inputs: Receiver<SliderInput>,
    mut fetched: Receiver<BatchFetched>,
    to_fetcher: Sender<FetchBatch>,
    frames: Sender<SliderFrame>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut view = CarouselView::mount(settings, initial);
    if !publish(&view, None, &frames).await {
        return Ok(());
    }

    loop {
        let scroll = select! {
            _ = cancel.cancelled() => {
                info!("cancel received; unmounting carousel");
                break;
            }

            maybe_input = inputs.recv() => match maybe_input {
                Some(input) => apply_input(&mut view, input),
                None => {
                    debug!("input channel closed");
                    break;
                }
            },

            Some(BatchFetched { edge, batch }) = fetched.recv() => view.splice(edge, batch),
        };

        for edge in view.take_visible_edges() {
            debug!(?edge, "requesting batch");
            if to_fetcher.send(FetchBatch(edge)).await.is_err() {
                warn!("fetcher channel closed");
                view.unmount();
                return Ok(());
            }
        }

        if !publish(&view, scroll, &frames).await {
            break;
        }
    }

    view.unmount();
    Ok(())
}

fn apply_input(view: &mut CarouselView, input: SliderInput) -> Option<ScrollCommand> {
    match input {
        SliderInput::Pointer(event) => view.pointer(event),
        SliderInput::Swipe(direction) => view.swipe(direction),
        SliderInput::ItemLoaded { item, width } => view.item_loaded(item, width),
        SliderInput::Resize(width) => {
            view.resize(width);
            None
        }
        SliderInput::Settled => {
            view.settled();
            None
        }
    }
}

async fn publish(
    view: &CarouselView,
    scroll: Option<ScrollCommand>,
    frames: &Sender<SliderFrame>,
) -> bool {
    let state = view.state();
    let frame = SliderFrame {
        scroll,
        scroll_offset: state.scroll_offset,
        affordances: state.affordances,
        image_count: state.images.len(),
        phase: view.phase(),
    };
    if frames.send(frame).await.is_err() {
        warn!("frame channel closed");
        return false;
    }
    true
}
