// src/miner/algorithm/keccak.rs
//! Keccak-family hash functions
//!
//! Both variants hash the same preimage; they differ only in sponge padding.

use super::{build_preimage, Algorithm};
use crate::types::AlgorithmType;
use crate::utils::error::MinerError;
use sha3::{Digest, Keccak256, Sha3_256};

/// Keccak-256 with the original submission padding
#[derive(Debug, Clone, Copy, Default)]
pub struct Keccak256Algo;

impl Algorithm for Keccak256Algo {
    fn hash(&self, prefix: &[u8], counter: u64) -> Result<[u8; 32], MinerError> {
        let preimage = build_preimage(prefix, counter)?;
        Ok(Keccak256::digest(preimage).into())
    }

    fn algorithm_type(&self) -> AlgorithmType {
        AlgorithmType::Keccak256
    }
}

/// FIPS-202 SHA3-256
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha3Algo;

impl Algorithm for Sha3Algo {
    fn hash(&self, prefix: &[u8], counter: u64) -> Result<[u8; 32], MinerError> {
        let preimage = build_preimage(prefix, counter)?;
        Ok(Sha3_256::digest(preimage).into())
    }

    fn algorithm_type(&self) -> AlgorithmType {
        AlgorithmType::Sha3_256
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::algorithm::evaluate;
    use crate::miner::target::Target;
    use crate::types::PREFIX_LEN;
    use hex_literal::hex;
    use primitive_types::U256;

    #[test]
    fn keccak_empty_input_vector() {
        let digest: [u8; 32] = Keccak256::digest(b"").into();
        assert_eq!(
            digest,
            hex!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
        );
    }

    #[test]
    fn hashes_full_preimage() {
        let prefix = [7u8; PREFIX_LEN];
        let mut preimage = [0u8; 84];
        preimage[..PREFIX_LEN].copy_from_slice(&prefix);
        preimage[76..].copy_from_slice(&42u64.to_be_bytes());

        let expected: [u8; 32] = Keccak256::digest(preimage).into();
        assert_eq!(Keccak256Algo.hash(&prefix, 42).unwrap(), expected);

        let expected_sha3: [u8; 32] = Sha3_256::digest(preimage).into();
        assert_eq!(Sha3Algo.hash(&prefix, 42).unwrap(), expected_sha3);
        assert_ne!(expected, expected_sha3);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let prefix = [0x5au8; PREFIX_LEN];
        let first = evaluate(&Keccak256Algo, &prefix, 9_999).unwrap();
        let second = evaluate(&Keccak256Algo, &prefix, 9_999).unwrap();
        assert_eq!(first, second);
        assert_ne!(first, evaluate(&Keccak256Algo, &prefix, 10_000).unwrap());

        let digest = Keccak256Algo.hash(&prefix, 9_999).unwrap();
        assert_eq!(first, U256::from_big_endian(&digest));
    }

    #[test]
    fn verify_compares_against_target() {
        let prefix = [0x5au8; PREFIX_LEN];
        let hash = evaluate(&Keccak256Algo, &prefix, 1).unwrap();
        assert!(Keccak256Algo.verify(&prefix, 1, &Target::from_raw(hash + 1)).unwrap());
        assert!(!Keccak256Algo.verify(&prefix, 1, &Target::from_raw(hash)).unwrap());
        assert!(!Keccak256Algo.verify(&prefix, 1, &Target::ZERO).unwrap());
    }
}
