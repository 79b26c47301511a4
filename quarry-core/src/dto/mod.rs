//! Data transfer objects for talking to the external query service

pub mod query;
