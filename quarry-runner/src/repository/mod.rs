//! Repository layer
//!
//! The repository is the seam between the scheduler and the external query
//! service. The scheduler only sees the trait, so tests can script the
//! service's answers.

mod queries;

pub use queries::{HttpQueryRepository, QueryRepository};
