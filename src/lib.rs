//! Keccak Miner - parallel proof-of-work search in Rust
//!
//! Given a task (seed, identity, difficulty) this crate searches the counter
//! space for a value whose Keccak-256 hash of `seed ‖ identity ‖ be32(counter)`
//! falls below `floor(2^256 / difficulty)`:
//! - Chunked, wave-based scheduling over a bounded worker pool
//! - Cancellation at chunk and wave boundaries
//! - Live hashrate reporting and out-of-band hashrate queries

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Miner core implementation including algorithms and scheduling
pub mod miner;

/// Attempt accounting and progress reporting
pub mod stats;

/// Utility functions and error handling
pub mod utils;

/// Command-line interface definitions
pub mod cli;

/// Configuration management
pub mod config;

/// Shared type definitions
pub mod types;

// Core exports
pub use cli::Commands;
pub use config::Config;
pub use miner::{
    Algorithm, CancellationToken, ChunkScheduler, ChunkWorker, Miner, MiningSession, ResultOrder,
    SchedulerConfig, SessionHandle, SessionState, Target, evaluate,
};
pub use stats::{AttemptCounter, ProgressReporter, ProgressSample, current_hashrate};
pub use types::{AlgorithmType, SearchOutcome, SearchRange, Solution, TaskDescriptor, parse_difficulty};
pub use utils::{MinerError, init_logging};
