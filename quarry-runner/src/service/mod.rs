//! Service layer
//!
//! Services sit at the edges of a run: persisting the final registry and
//! showing progress while it runs.
//!
//! Rendering is trait-based so the scheduler can be tested without a terminal.

mod finalizer;
mod render;

// Re-export traits
pub use render::ProgressRenderer;

// Re-export implementations
pub use finalizer::Finalizer;
pub use render::{TableRenderer, print_summary};
