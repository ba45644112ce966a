// src/miner/worker.rs
//! Chunk worker implementation
//!
//! Scans one contiguous chunk of counters sequentially, counting every
//! evaluated candidate, and reports the first one that clears the target.

use crate::miner::algorithm::{Algorithm, evaluate};
use crate::miner::target::Target;
use crate::stats::AttemptCounter;
use crate::utils::error::MinerError;

/// Performs the hash computations for one session
///
/// A worker borrows the session's immutable search inputs and its shared
/// attempt counter, so one instance can be shared across the whole pool.
pub struct ChunkWorker<'a> {
    /// The hash function to evaluate candidates with
    algorithm: &'a dyn Algorithm,
    /// Fixed `seed ‖ identity` prefix
    prefix: &'a [u8],
    /// Acceptance threshold
    target: Target,
    /// Attempts shared by every worker of the session
    attempts: &'a AttemptCounter,
}

impl<'a> ChunkWorker<'a> {
    /// Creates a new ChunkWorker
    ///
    /// # Arguments
    /// * `algorithm` - The hash function to use
    /// * `prefix` - The 52-byte preimage prefix
    /// * `target` - Threshold a hash value must fall below
    /// * `attempts` - Counter incremented once per candidate
    pub fn new(
        algorithm: &'a dyn Algorithm,
        prefix: &'a [u8],
        target: Target,
        attempts: &'a AttemptCounter,
    ) -> Self {
        ChunkWorker {
            algorithm,
            prefix,
            target,
            attempts,
        }
    }

    /// Scans `counter_start .. counter_start + chunk_len` in increasing order
    ///
    /// Runs to completion unless a candidate qualifies: the qualifying counter
    /// is returned and counted. Callers must keep the chunk inside the 64-bit
    /// counter space.
    ///
    /// # Returns
    /// * `Ok(Some(counter))` - First counter whose hash is below the target
    /// * `Ok(None)` - The whole chunk was evaluated without success
    /// * `Err(MinerError)` - Hash evaluation failed
    pub fn scan(&self, counter_start: u64, chunk_len: u64) -> Result<Option<u64>, MinerError> {
        for offset in 0..chunk_len {
            let counter = counter_start + offset;
            let hash = evaluate(self.algorithm, self.prefix, counter)?;
            self.attempts.record();

            if self.target.is_met_by(&hash) {
                log::debug!("Counter {:#x} cleared the target", counter);
                return Ok(Some(counter));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::algorithm::Keccak256Algo;
    use crate::types::PREFIX_LEN;
    use primitive_types::U256;

    const PREFIX: [u8; PREFIX_LEN] = [3u8; PREFIX_LEN];

    #[test]
    fn counts_every_candidate_of_an_unsuccessful_chunk() {
        let attempts = AttemptCounter::new();
        let worker = ChunkWorker::new(&Keccak256Algo, &PREFIX, Target::ZERO, &attempts);
        assert_eq!(worker.scan(100, 250).unwrap(), None);
        assert_eq!(attempts.snapshot(), 250);
    }

    #[test]
    fn returns_first_qualifying_counter() {
        let target = Target::from_difficulty(U256::from(8));
        let expected = (0u64..10_000)
            .find(|&c| target.is_met_by(&evaluate(&Keccak256Algo, &PREFIX, c).unwrap()))
            .expect("difficulty 8 should be met within 10k counters");

        let attempts = AttemptCounter::new();
        let worker = ChunkWorker::new(&Keccak256Algo, &PREFIX, target, &attempts);
        assert_eq!(worker.scan(0, 10_000).unwrap(), Some(expected));
        // The qualifying candidate is counted too
        assert_eq!(attempts.snapshot(), expected + 1);
    }

    #[test]
    fn scans_up_to_the_end_of_the_counter_space() {
        let attempts = AttemptCounter::new();
        let worker = ChunkWorker::new(&Keccak256Algo, &PREFIX, Target::ZERO, &attempts);
        assert_eq!(worker.scan(u64::MAX - 9, 10).unwrap(), None);
        assert_eq!(attempts.snapshot(), 10);
    }

    #[test]
    fn propagates_malformed_prefix() {
        let attempts = AttemptCounter::new();
        let worker = ChunkWorker::new(&Keccak256Algo, &PREFIX[..10], Target::ZERO, &attempts);
        assert!(matches!(
            worker.scan(0, 5),
            Err(MinerError::ComputationError(_))
        ));
        assert_eq!(attempts.snapshot(), 0);
    }
}
