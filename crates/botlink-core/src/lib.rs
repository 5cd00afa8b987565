//! Shared HTTP plumbing for botlink services.

pub mod middleware;
pub mod serde;
pub mod tracing;
