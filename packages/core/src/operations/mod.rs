//! Page Operations
//!
//! Wrappers around the services that add behaviour across several calls.

pub mod conflict_queue;

pub use conflict_queue::ConflictRetryQueue;
