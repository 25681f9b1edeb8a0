use std::io::BufRead;
use std::time::Duration;

use tokio::runtime::Runtime;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::events::CarouselCommand;

/// How long shutdown waits for blocking tasks before abandoning them.
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

/// Feed one command per line of `reader` to the controller until EOF, a read
/// error, or the controller going away. Always cancels `cancel` on the way out.
///
/// Blocking: run it on `spawn_blocking`. A read in progress cannot be
/// interrupted, so tear the runtime down with [`shutdown`].
pub fn read_commands<R: BufRead>(
    reader: R,
    commands: Sender<CarouselCommand>,
    cancel: CancellationToken,
) {
    for line in reader.lines() {
        if cancel.is_cancelled() {
            break;
        }
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!("input read failed: {err}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<CarouselCommand>() {
            Ok(cmd) => {
                if commands.blocking_send(cmd).is_err() {
                    break;
                }
            }
            Err(err) => warn!("ignoring input: {err}"),
        }
    }
    info!("input closed; initiating shutdown");
    cancel.cancel();
}

/// Drop `runtime` without joining a reader still parked in a blocking read.
pub fn shutdown(runtime: Runtime) {
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
}
