//! Interrupt handling
//!
//! The first interrupt fires the shutdown token so the run cancels
//! outstanding queries and still writes its results. A second interrupt
//! aborts the process, which is the only way out of a stop request that never
//! returns.

use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Exit status after a second interrupt (128 + SIGINT)
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Listens for Ctrl-C for the lifetime of the run
pub fn spawn_listener(shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if watch(tokio::signal::ctrl_c, shutdown).await {
            error!("Second interrupt received, aborting without writing results");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    })
}

/// Waits for interrupts from `next_interrupt`
///
/// Fires `shutdown` on the first one and returns true once a second one
/// arrives. Returns false if the interrupt source fails.
async fn watch<F, Fut>(mut next_interrupt: F, shutdown: CancellationToken) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = next_interrupt().await {
        warn!("Failed to listen for interrupt: {}", e);
        return false;
    }
    info!("Interrupt received, cancelling outstanding queries (press Ctrl-C again to abort)");
    shutdown.cancel();

    match next_interrupt().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to listen for a second interrupt: {}", e);
            false
        }
    }
}
