// src/miner/scheduler.rs
//! Chunk scheduler implementation
//!
//! Splits a search range into fixed-size chunks and dispatches them in waves
//! to a bounded worker pool. Cancellation is checked before every wave and
//! before each chunk starts; a chunk that has started always finishes.

use crate::miner::cancel::CancellationToken;
use crate::miner::worker::ChunkWorker;
use crate::types::SearchRange;
use crate::utils::error::MinerError;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Default number of counters per chunk
pub const DEFAULT_CHUNK_SIZE: u64 = 1000;

/// Default number of chunks per worker in one wave
pub const DEFAULT_WAVE_FACTOR: u64 = 10;

/// Upper bound on `worker_count * wave_factor`, the chunks held by one wave
pub const MAX_WAVE_CHUNKS: u64 = 1 << 16;

/// How a wave picks its winner when several chunks hold solutions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultOrder {
    /// The earliest-submitted chunk with a solution wins, so a wave reports
    /// its lowest qualifying counter; it waits for every earlier chunk to
    /// resolve before reporting
    #[default]
    Submission,
    /// The first solution any worker reports wins
    Completion,
}

/// Tuning knobs for the scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Counters per chunk
    pub chunk_size: u64,
    /// Concurrent workers in the pool
    pub worker_count: usize,
    /// Chunks per worker submitted in each wave
    pub wave_factor: u64,
    /// Winner selection within a wave
    pub result_order: ResultOrder,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            chunk_size: DEFAULT_CHUNK_SIZE,
            worker_count: num_cpus::get(),
            wave_factor: DEFAULT_WAVE_FACTOR,
            result_order: ResultOrder::Submission,
        }
    }
}

impl SchedulerConfig {
    /// Counters covered by one full wave
    pub fn wave_span(&self) -> u128 {
        u128::from(self.chunk_size)
            .checked_mul(self.worker_count as u128)
            .and_then(|span| span.checked_mul(u128::from(self.wave_factor)))
            .unwrap_or(u128::MAX)
    }

    /// Chunks dispatched per wave, `None` on overflow
    pub fn wave_chunks(&self) -> Option<u64> {
        u64::try_from(self.worker_count)
            .ok()?
            .checked_mul(self.wave_factor)
    }

    /// Rejects zero sizes and waves larger than [`MAX_WAVE_CHUNKS`]
    pub fn validate(&self) -> Result<(), MinerError> {
        if self.chunk_size == 0 {
            return Err(MinerError::ConfigError("chunk_size must be >= 1".into()));
        }
        if self.worker_count == 0 {
            return Err(MinerError::ConfigError("worker_count must be >= 1".into()));
        }
        if self.wave_factor == 0 {
            return Err(MinerError::ConfigError("wave_factor must be >= 1".into()));
        }
        match self.wave_chunks() {
            Some(chunks) if chunks <= MAX_WAVE_CHUNKS => Ok(()),
            _ => Err(MinerError::ConfigError(format!(
                "worker_count * wave_factor must be <= {}, got {} * {}",
                MAX_WAVE_CHUNKS, self.worker_count, self.wave_factor
            ))),
        }
    }
}

/// Raw result of driving a range to its end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanResult {
    /// A chunk reported this counter
    Found(u64),
    /// Every chunk ran without success
    Exhausted,
    /// The token was set before the range was covered
    Cancelled,
}

/// Coordinates chunk scans across the worker pool
pub struct ChunkScheduler {
    /// Bounded pool the chunks run on
    pool: ThreadPool,
    /// Chunk and wave sizing
    config: SchedulerConfig,
}

impl ChunkScheduler {
    /// Creates a new ChunkScheduler with its own worker pool
    ///
    /// # Returns
    /// * `Err(MinerError::ConfigError)` - If any size is zero
    /// * `Err(MinerError::TaskError)` - If the pool cannot be built
    pub fn new(config: SchedulerConfig) -> Result<Self, MinerError> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.worker_count)
            .thread_name(|i| format!("miner-worker-{}", i))
            .build()?;
        Ok(ChunkScheduler { pool, config })
    }

    /// Scheduler settings
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Drives the search over `range` wave by wave
    ///
    /// The token is set as soon as any chunk finds a solution so no further
    /// chunks or waves start. A hash failure aborts the search.
    pub fn run(
        &self,
        worker: &ChunkWorker<'_>,
        range: SearchRange,
        cancel: &CancellationToken,
    ) -> Result<ScanResult, MinerError> {
        let wave_span = self.config.wave_span();
        let mut current = range.start();
        let mut wave = 0u64;

        while current < range.end() {
            if cancel.is_cancelled() {
                log::debug!("Cancelled before wave {} at counter {}", wave, current);
                return Ok(ScanResult::Cancelled);
            }

            let wave_end = (current + wave_span).min(range.end());
            let chunks = self.partition(current, wave_end);
            log::debug!(
                "Wave {}: {} chunks covering [{}, {})",
                wave,
                chunks.len(),
                current,
                wave_end
            );

            if let Some(counter) = self.dispatch(worker, &chunks, cancel)? {
                cancel.cancel();
                return Ok(ScanResult::Found(counter));
            }

            current = wave_end;
            wave += 1;
        }

        // Chunks skipped after a late cancellation leave the range uncovered
        if cancel.is_cancelled() {
            Ok(ScanResult::Cancelled)
        } else {
            Ok(ScanResult::Exhausted)
        }
    }

    /// Splits `[start, end)` into `(chunk_start, chunk_len)` pairs; the last
    /// chunk may be shorter
    fn partition(&self, start: u128, end: u128) -> Vec<(u64, u64)> {
        let chunk = u128::from(self.config.chunk_size);
        let count = (end - start).div_ceil(chunk).min(u128::from(MAX_WAVE_CHUNKS));
        let mut chunks = Vec::with_capacity(count as usize);
        let mut next = start;
        while next < end {
            let len = chunk.min(end - next);
            // Both bounds stay below 2^64 for a valid SearchRange
            chunks.push((next as u64, len as u64));
            next += len;
        }
        chunks
    }

    /// Runs one wave on the pool and picks its winner per `result_order`
    fn dispatch(
        &self,
        worker: &ChunkWorker<'_>,
        chunks: &[(u64, u64)],
        cancel: &CancellationToken,
    ) -> Result<Option<u64>, MinerError> {
        let hit = match self.config.result_order {
            ResultOrder::Submission => self.dispatch_in_order(worker, chunks, cancel),
            ResultOrder::Completion => self.dispatch_first_done(worker, chunks, cancel),
        };
        hit.transpose()
    }

    /// Lowest-index chunk with a solution wins
    ///
    /// A chunk is skipped only when a lower-index chunk already holds a
    /// solution or the caller cancelled, so every chunk before the winner
    /// runs in full. The token is left to the caller.
    fn dispatch_in_order(
        &self,
        worker: &ChunkWorker<'_>,
        chunks: &[(u64, u64)],
        cancel: &CancellationToken,
    ) -> Option<Result<u64, MinerError>> {
        let best = AtomicUsize::new(usize::MAX);

        self.pool.install(|| {
            chunks
                .par_iter()
                .enumerate()
                .find_map_first(|(index, &(start, len))| {
                    if index > best.load(Ordering::SeqCst) || cancel.is_cancelled() {
                        return None;
                    }
                    match worker.scan(start, len) {
                        Ok(Some(counter)) => {
                            best.fetch_min(index, Ordering::SeqCst);
                            Some(Ok(counter))
                        }
                        Ok(None) => None,
                        Err(e) => {
                            log::error!("Hashing failed in chunk at {}: {}", start, e);
                            cancel.cancel();
                            Some(Err(e))
                        }
                    }
                })
        })
    }

    /// First solution reported by any worker wins; the token is set at once so
    /// no further chunk starts
    fn dispatch_first_done(
        &self,
        worker: &ChunkWorker<'_>,
        chunks: &[(u64, u64)],
        cancel: &CancellationToken,
    ) -> Option<Result<u64, MinerError>> {
        self.pool.install(|| {
            chunks.par_iter().find_map_any(|&(start, len)| {
                if cancel.is_cancelled() {
                    return None;
                }
                match worker.scan(start, len) {
                    Ok(Some(counter)) => {
                        cancel.cancel();
                        Some(Ok(counter))
                    }
                    Ok(None) => None,
                    Err(e) => {
                        log::error!("Hashing failed in chunk at {}: {}", start, e);
                        cancel.cancel();
                        Some(Err(e))
                    }
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::algorithm::{Keccak256Algo, evaluate};
    use crate::miner::target::Target;
    use crate::stats::AttemptCounter;
    use crate::types::PREFIX_LEN;
    use primitive_types::U256;

    const PREFIX: [u8; PREFIX_LEN] = [9u8; PREFIX_LEN];

    fn scheduler(chunk_size: u64, worker_count: usize, result_order: ResultOrder) -> ChunkScheduler {
        ChunkScheduler::new(SchedulerConfig {
            chunk_size,
            worker_count,
            wave_factor: 2,
            result_order,
        })
        .unwrap()
    }

    #[test]
    fn rejects_zero_sizes() {
        let config = SchedulerConfig {
            chunk_size: 0,
            ..SchedulerConfig::default()
        };
        assert!(matches!(
            ChunkScheduler::new(config),
            Err(MinerError::ConfigError(_))
        ));
    }

    #[test]
    fn rejects_oversized_waves() {
        let config = SchedulerConfig {
            chunk_size: 1,
            worker_count: 4,
            wave_factor: 1_000_000_000_000,
            result_order: ResultOrder::Submission,
        };
        assert!(matches!(
            ChunkScheduler::new(config),
            Err(MinerError::ConfigError(_))
        ));

        let overflowing = SchedulerConfig {
            chunk_size: u64::MAX,
            worker_count: usize::MAX,
            wave_factor: u64::MAX,
            result_order: ResultOrder::Completion,
        };
        assert_eq!(overflowing.wave_chunks(), None);
        assert_eq!(overflowing.wave_span(), u128::MAX);
        assert!(overflowing.validate().is_err());
    }

    #[test]
    fn partitions_with_short_tail() {
        let scheduler = scheduler(100, 1, ResultOrder::Submission);
        let chunks = scheduler.partition(0, 250);
        assert_eq!(chunks, vec![(0, 100), (100, 100), (200, 50)]);
    }

    #[test]
    fn partitions_the_top_of_the_counter_space() {
        let scheduler = scheduler(1000, 1, ResultOrder::Submission);
        let end = SearchRange::COUNTER_SPACE_END;
        let chunks = scheduler.partition(end - 1500, end);
        assert_eq!(chunks, vec![(u64::MAX - 1499, 1000), (u64::MAX - 499, 500)]);
    }

    #[test]
    fn exhausts_with_exact_accounting() {
        for workers in [1, 4] {
            let attempts = AttemptCounter::new();
            let worker = ChunkWorker::new(&Keccak256Algo, &PREFIX, Target::ZERO, &attempts);
            let cancel = CancellationToken::new();
            let range = SearchRange::new(0, 5_000).unwrap();

            let result = scheduler(100, workers, ResultOrder::Submission)
                .run(&worker, range, &cancel)
                .unwrap();
            assert_eq!(result, ScanResult::Exhausted);
            assert_eq!(attempts.snapshot(), 5_000);
            assert!(!cancel.is_cancelled());
        }
    }

    #[test]
    fn single_worker_finds_lowest_solution() {
        let target = Target::from_difficulty(U256::from(64));
        let expected = (0u64..20_000)
            .find(|&c| target.is_met_by(&evaluate(&Keccak256Algo, &PREFIX, c).unwrap()))
            .unwrap();

        let attempts = AttemptCounter::new();
        let worker = ChunkWorker::new(&Keccak256Algo, &PREFIX, target, &attempts);
        let cancel = CancellationToken::new();
        let result = scheduler(50, 1, ResultOrder::Submission)
            .run(&worker, SearchRange::new(0, 20_000).unwrap(), &cancel)
            .unwrap();

        assert_eq!(result, ScanResult::Found(expected));
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn submission_order_reports_lowest_counter_in_wave() {
        let wave_span = 100 * 4 * 10;
        for seed in 0u8..40 {
            let prefix = [seed; PREFIX_LEN];
            let target = Target::from_difficulty(U256::from(400));
            let expected = (0u64..wave_span)
                .find(|&c| target.is_met_by(&evaluate(&Keccak256Algo, &prefix, c).unwrap()));

            let attempts = AttemptCounter::new();
            let worker = ChunkWorker::new(&Keccak256Algo, &prefix, target, &attempts);
            let cancel = CancellationToken::new();
            let scheduler = ChunkScheduler::new(SchedulerConfig {
                chunk_size: 100,
                worker_count: 4,
                wave_factor: 10,
                result_order: ResultOrder::Submission,
            })
            .unwrap();
            let result = scheduler
                .run(&worker, SearchRange::new(0, u128::from(wave_span)).unwrap(), &cancel)
                .unwrap();

            match expected {
                Some(counter) => assert_eq!(result, ScanResult::Found(counter), "seed {}", seed),
                None => assert_eq!(result, ScanResult::Exhausted, "seed {}", seed),
            }
        }
    }

    #[test]
    fn both_orders_return_a_valid_solution() {
        let target = Target::from_difficulty(U256::from(500));
        for order in [ResultOrder::Submission, ResultOrder::Completion] {
            let attempts = AttemptCounter::new();
            let worker = ChunkWorker::new(&Keccak256Algo, &PREFIX, target, &attempts);
            let cancel = CancellationToken::new();
            let result = scheduler(100, 4, order)
                .run(&worker, SearchRange::new(0, 200_000).unwrap(), &cancel)
                .unwrap();

            let ScanResult::Found(counter) = result else {
                panic!("no solution under {:?} order", order);
            };
            let hash = evaluate(&Keccak256Algo, &PREFIX, counter).unwrap();
            assert!(target.is_met_by(&hash));
        }
    }

    #[test]
    fn pre_cancelled_search_does_no_work() {
        let attempts = AttemptCounter::new();
        let worker = ChunkWorker::new(&Keccak256Algo, &PREFIX, Target::ZERO, &attempts);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = scheduler(100, 2, ResultOrder::Submission)
            .run(&worker, SearchRange::full(), &cancel)
            .unwrap();
        assert_eq!(result, ScanResult::Cancelled);
        assert_eq!(attempts.snapshot(), 0);
    }

    #[test]
    fn empty_range_is_exhausted() {
        let attempts = AttemptCounter::new();
        let worker = ChunkWorker::new(&Keccak256Algo, &PREFIX, Target::ZERO, &attempts);
        let result = scheduler(100, 2, ResultOrder::Submission)
            .run(&worker, SearchRange::new(7, 7).unwrap(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result, ScanResult::Exhausted);
    }
}
