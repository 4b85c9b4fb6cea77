//! Bounded-concurrency execution of independent create-or-update calls

mod bounded;

pub use bounded::{BatchFailure, BoundedUpserter, Completed};
