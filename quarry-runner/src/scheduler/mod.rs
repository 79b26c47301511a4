//! Scheduler layer
//!
//! Drives a batch of query units through the query service: the submitter
//! starts every unit, the cycle driver polls and consolidates until no job is
//! outstanding, and the cancellation handler stops outstanding work when the
//! run is interrupted.
//!
//! All of them share one [`SharedRegistry`]. Every read of outstanding ids and
//! every consolidation happens under its lock, so an interrupt never sees a
//! half-applied poll report.

pub mod cancellation;
pub mod consolidator;
pub mod driver;
pub mod poller;
pub mod submitter;

pub use cancellation::CancellationHandler;
pub use driver::{CycleDriver, RunOutcome};
pub use poller::{PollOutcome, Poller};
pub use submitter::Submitter;

use quarry_core::domain::registry::Registry;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Registry shared by the cycle driver and the cancellation handler
pub type SharedRegistry = Arc<Mutex<Registry>>;

pub fn shared(registry: Registry) -> SharedRegistry {
    Arc::new(Mutex::new(registry))
}
