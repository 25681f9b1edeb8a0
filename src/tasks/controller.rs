use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::carousel::Carousel;
use crate::events::{CarouselCommand, SlideChange};
use crate::presentation::PresentationSurface;

/// Drives a carousel on a single executor loop.
///
/// Rules:
/// - Every event (command, lock release, autoplay tick) runs to completion
///   before the next one is looked at.
/// - Timers that are due are drained before a command received at the same
///   instant is applied.
/// - Slide changes are published on `changes` without ever blocking the loop;
///   a full channel drops the notification, a closed one silences it.
///
/// Returns the carousel once `cancel` fires or `commands` closes.
pub async fn run<S>(
    mut carousel: Carousel<S>,
    mut commands: Receiver<CarouselCommand>,
    changes: Sender<SlideChange>,
    cancel: CancellationToken,
) -> Result<Carousel<S>>
where
    S: PresentationSurface,
{
    let mut outbox = Some(changes);

    loop {
        for change in carousel.on_tick(Instant::now()) {
            publish(&mut outbox, change);
        }

        let deadline = carousel.next_deadline();
        select! {
            biased;

            _ = cancel.cancelled() => break,

            _ = async {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            } => {
                // Due tasks run at the top of the loop.
            }

            maybe_cmd = commands.recv() => {
                let Some(cmd) = maybe_cmd else {
                    info!("command channel closed; stopping carousel");
                    break;
                };
                let now = Instant::now();
                for change in carousel.on_tick(now) {
                    publish(&mut outbox, change);
                }
                debug!(?cmd, "carousel command");
                if let Some(change) = carousel.handle(cmd, now) {
                    publish(&mut outbox, change);
                }
            }
        }
    }

    Ok(carousel)
}

fn publish(outbox: &mut Option<Sender<SlideChange>>, change: SlideChange) {
    let Some(tx) = outbox.as_ref() else {
        return;
    };
    match tx.try_send(change) {
        Ok(()) => {}
        Err(TrySendError::Full(dropped)) => {
            warn!(?dropped, "slide change listener lagging; notification dropped");
        }
        Err(TrySendError::Closed(_)) => {
            debug!("slide change listener gone");
            *outbox = None;
        }
    }
}
