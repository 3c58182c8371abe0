use crate::catalog::BatchSource;
use crate::events::{BatchFetched, FetchBatch};
use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinSet;
use tokio::time::{Duration, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Simulated paginated image source:
/// - Every request draws a fresh batch and delivers it after `delay`.
/// - Requests overlap, so a leading and a trailing fetch can be in flight together.
/// - Cancellation drops whatever is still pending.
pub async fn run<S: BatchSource>(
    mut source: S,
    mut requests: Receiver<FetchBatch>,
    to_carousel: Sender<BatchFetched>,
    delay: Duration,
    cancel: CancellationToken,
) -> Result<()> {
    let mut in_flight: JoinSet<BatchFetched> = JoinSet::new();

    loop {
        select! {
            _ = cancel.cancelled() => {
                debug!(pending = in_flight.len(), "cancel received; dropping pending fetches");
                break;
            }

            Some(FetchBatch(edge)) = requests.recv() => {
                let batch = source.next_batch();
                debug!(?edge, images = batch.len(), "fetch started");
                in_flight.spawn(async move {
                    sleep(delay).await;
                    BatchFetched { edge, batch }
                });
            }

            Some(joined) = in_flight.join_next() => match joined {
                Ok(fetched) => {
                    debug!(edge = ?fetched.edge, "fetch complete");
                    if to_carousel.send(fetched).await.is_err() {
                        warn!("carousel channel closed");
                        break;
                    }
                }
                Err(err) => warn!("fetch task failed: {err}"),
            },

            else => break,
        }
    }

    in_flight.abort_all();
    Ok(())
}
