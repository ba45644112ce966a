// src/miner/mod.rs
//! Core mining functionality
//!
//! This module contains all components related to the search:
//! - Hash functions and target derivation
//! - Chunk scanning and wave scheduling
//! - Sessions, cancellation, and the session coordinator

/// Proof-of-work hash functions
///
/// Contains the [`Algorithm`] trait and the Keccak-family implementations.
pub mod algorithm;

/// Cooperative cancellation shared by a session's workers
pub mod cancel;

/// Wave scheduler
///
/// Partitions a search range into chunks and dispatches them to a bounded
/// worker pool, aggregating the results of each wave.
pub mod scheduler;

/// Sessions and the [`Miner`] coordinator
pub mod session;

/// Acceptance threshold derived from difficulty
pub mod target;

/// Chunk worker implementation
///
/// Scans one chunk of counters sequentially and reports the first
/// qualifying counter.
pub mod worker;

// Re-export main components for cleaner imports
pub use self::algorithm::{Algorithm, create_algorithm, evaluate};
pub use self::cancel::CancellationToken;
pub use self::scheduler::{ChunkScheduler, ResultOrder, ScanResult, SchedulerConfig};
pub use self::session::{Miner, MiningSession, SessionHandle, SessionState};
pub use self::target::Target;
pub use self::worker::ChunkWorker;
