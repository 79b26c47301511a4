//! Quarry Core
//!
//! Core types shared by the Quarry batch query runner.
//!
//! This crate contains:
//! - Domain types: jobs, their lifecycle state, and the job registry
//! - DTOs: request and response bodies of the external query service

pub mod domain;
pub mod dto;
