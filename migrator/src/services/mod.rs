//! Infrastructure Services
//!
//! - **client**: ARM client for API Management, credentials, pagination, dry run
//! - **config**: run configuration read from the environment
//! - **errors**: migration error type and severity
//! - **upsert**: bounded-concurrency execution of remote writes

pub mod client;
pub mod config;
pub mod errors;
pub mod upsert;
