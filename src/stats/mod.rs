//! Statistics collection and reporting module
//!
//! This module provides functionality for tracking search progress:
//! - The shared attempt counter
//! - Hashrate estimation
//! - Periodic progress reporting on a background thread
//!
//! The main component is [`ProgressReporter`] which samples a session's
//! counter and logs its hashrate at a fixed interval.

/// Shared, concurrently incremented attempt counter
pub mod counter;

/// Background progress reporter and hashrate queries
pub mod reporter;

// Re-export main components
pub use counter::{AttemptCounter, hashrate};
pub use reporter::{ProgressReporter, ProgressSample, ReporterHandle, current_hashrate};
