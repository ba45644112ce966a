//! Proof-of-work hash functions
//!
//! This module contains the supported hash functions and their common interface.
//! Currently implements:
//! - Keccak-256 (the default, Ethereum padding)
//! - SHA3-256 (FIPS-202 padding)

/// Sponge-based hash implementations from the `sha3` crate
pub mod keccak;

pub use self::keccak::{Keccak256Algo, Sha3Algo};

use crate::miner::target::Target;
use crate::types::{AlgorithmType, COUNTER_FIELD_LEN, PREFIX_LEN, PREIMAGE_LEN};
use crate::utils::error::MinerError;
use primitive_types::U256;
use std::sync::Arc;

/// Common interface for all proof-of-work hash functions
///
/// All implementations hash the same 84-byte preimage layout so the
/// scheduler can drive any of them interchangeably.
pub trait Algorithm: Send + Sync {
    /// Compute the digest of `prefix ‖ be32(counter)`
    ///
    /// # Arguments
    /// * `prefix` - The 52-byte `seed ‖ identity` prefix
    /// * `counter` - The candidate counter
    ///
    /// # Returns
    /// 32-byte digest, or `ComputationError` if the prefix is malformed
    fn hash(&self, prefix: &[u8], counter: u64) -> Result<[u8; 32], MinerError>;

    /// Verify if a candidate's hash value is strictly below the target
    fn verify(&self, prefix: &[u8], counter: u64, target: &Target) -> Result<bool, MinerError> {
        let digest = self.hash(prefix, counter)?;
        Ok(target.is_met_by(&U256::from_big_endian(&digest)))
    }

    /// Get the algorithm type
    fn algorithm_type(&self) -> AlgorithmType;
}

/// Evaluates a candidate, returning its digest as a big-endian 256-bit integer
pub fn evaluate(algorithm: &dyn Algorithm, prefix: &[u8], counter: u64) -> Result<U256, MinerError> {
    let digest = algorithm.hash(prefix, counter)?;
    Ok(U256::from_big_endian(&digest))
}

/// Lays out the fixed-length preimage `prefix ‖ be32(counter)`
pub fn build_preimage(prefix: &[u8], counter: u64) -> Result<[u8; PREIMAGE_LEN], MinerError> {
    if prefix.len() != PREFIX_LEN {
        return Err(MinerError::ComputationError(format!(
            "preimage prefix must be {} bytes, got {}",
            PREFIX_LEN,
            prefix.len()
        )));
    }

    let mut preimage = [0u8; PREIMAGE_LEN];
    preimage[..PREFIX_LEN].copy_from_slice(prefix);
    // The counter occupies the low 8 bytes of the 32-byte big-endian field.
    preimage[PREFIX_LEN + COUNTER_FIELD_LEN - 8..].copy_from_slice(&counter.to_be_bytes());
    Ok(preimage)
}

/// Instantiates the hash function for an algorithm type
pub fn create_algorithm(algo: AlgorithmType) -> Arc<dyn Algorithm> {
    match algo {
        AlgorithmType::Keccak256 => Arc::new(Keccak256Algo),
        AlgorithmType::Sha3_256 => Arc::new(Sha3Algo),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preimage_layout_is_big_endian() {
        let prefix = [0xabu8; PREFIX_LEN];
        let preimage = build_preimage(&prefix, 0x0102).unwrap();
        assert_eq!(preimage.len(), 84);
        assert_eq!(&preimage[..PREFIX_LEN], &prefix[..]);
        assert!(preimage[PREFIX_LEN..82].iter().all(|&b| b == 0));
        assert_eq!(&preimage[82..], &[0x01, 0x02]);
    }

    #[test]
    fn rejects_malformed_prefix() {
        let err = build_preimage(&[0u8; 51], 0).unwrap_err();
        assert!(matches!(err, MinerError::ComputationError(_)));
    }

    #[test]
    fn factory_matches_type() {
        for algo in [AlgorithmType::Keccak256, AlgorithmType::Sha3_256] {
            assert_eq!(create_algorithm(algo).algorithm_type(), algo);
        }
    }
}
