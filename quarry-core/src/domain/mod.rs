//! Core domain types
//!
//! A job tracks one query unit from submission to a terminal state. The
//! registry holds every job of a run and is the only state the scheduler
//! mutates.

pub mod job;
pub mod registry;
