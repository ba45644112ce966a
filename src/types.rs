// src/types.rs
use crate::utils::error::MinerError;
use clap::ValueEnum;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of the task seed in bytes
pub const SEED_LEN: usize = 32;

/// Length of the miner identity (account address) in bytes
pub const IDENTITY_LEN: usize = 20;

/// Length of the fixed preimage prefix (`seed ‖ identity`)
pub const PREFIX_LEN: usize = SEED_LEN + IDENTITY_LEN;

/// Width of the big-endian counter field appended to the prefix
pub const COUNTER_FIELD_LEN: usize = 32;

/// Total length of a candidate preimage
pub const PREIMAGE_LEN: usize = PREFIX_LEN + COUNTER_FIELD_LEN;

/// Supported proof-of-work hash functions
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmType {
    /// Keccak-256 with the original (pre-FIPS) padding, as used by Ethereum
    #[default]
    #[value(name = "keccak256")]
    Keccak256,

    /// FIPS-202 SHA3-256
    #[value(name = "sha3-256")]
    Sha3_256,
}

impl fmt::Display for AlgorithmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmType::Keccak256 => write!(f, "keccak256"),
            AlgorithmType::Sha3_256 => write!(f, "sha3-256"),
        }
    }
}

impl FromStr for AlgorithmType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keccak" | "keccak256" | "keccak-256" => Ok(AlgorithmType::Keccak256),
            "sha3" | "sha3-256" | "sha3_256" => Ok(AlgorithmType::Sha3_256),
            _ => Err(format!("Unknown algorithm: {}", s)),
        }
    }
}

/// An immutable proof-of-work task issued by the external ledger
///
/// Holds the seed, the identity of the miner the work is bound to, and the
/// difficulty. A descriptor can only be built with `difficulty >= 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDescriptor {
    seed: [u8; SEED_LEN],
    identity: [u8; IDENTITY_LEN],
    difficulty: U256,
}

impl TaskDescriptor {
    /// Builds a descriptor from already-decoded bytes
    ///
    /// # Returns
    /// * `Err(MinerError::InputError)` - If `difficulty` is zero
    pub fn new(
        seed: [u8; SEED_LEN],
        identity: [u8; IDENTITY_LEN],
        difficulty: U256,
    ) -> Result<Self, MinerError> {
        if difficulty.is_zero() {
            return Err(MinerError::InputError(
                "difficulty must be a positive integer".into(),
            ));
        }
        Ok(TaskDescriptor {
            seed,
            identity,
            difficulty,
        })
    }

    /// Builds a descriptor from hex-encoded seed and identity
    ///
    /// Both strings may carry an optional `0x` prefix.
    ///
    /// # Arguments
    /// * `seed_hex` - 32 bytes of hex
    /// * `identity_hex` - 20 bytes of hex
    /// * `difficulty` - Positive difficulty
    pub fn from_hex(seed_hex: &str, identity_hex: &str, difficulty: U256) -> Result<Self, MinerError> {
        let seed = decode_fixed::<SEED_LEN>("seed", seed_hex)?;
        let identity = decode_fixed::<IDENTITY_LEN>("identity", identity_hex)?;
        Self::new(seed, identity, difficulty)
    }

    /// Task seed
    pub fn seed(&self) -> &[u8; SEED_LEN] {
        &self.seed
    }

    /// Identity the work is bound to
    pub fn identity(&self) -> &[u8; IDENTITY_LEN] {
        &self.identity
    }

    /// Task difficulty (always `>= 1`)
    pub fn difficulty(&self) -> U256 {
        self.difficulty
    }

    /// The fixed `seed ‖ identity` preimage prefix
    pub fn prefix(&self) -> [u8; PREFIX_LEN] {
        let mut prefix = [0u8; PREFIX_LEN];
        prefix[..SEED_LEN].copy_from_slice(&self.seed);
        prefix[SEED_LEN..].copy_from_slice(&self.identity);
        prefix
    }
}

fn decode_fixed<const N: usize>(field: &str, input: &str) -> Result<[u8; N], MinerError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let bytes = hex::decode(digits)?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| {
        MinerError::InputError(format!(
            "{} must be {} bytes, got {}",
            field,
            N,
            bytes.len()
        ))
    })
}

/// Parses a difficulty given as decimal or `0x`-prefixed hex text
///
/// # Returns
/// * `Ok(U256)` - A difficulty of at least 1
/// * `Err(MinerError::InputError)` - If the text is malformed, zero or negative
pub fn parse_difficulty(input: &str) -> Result<U256, MinerError> {
    let text = input.trim();
    if text.starts_with('-') {
        return Err(MinerError::InputError(format!(
            "difficulty must be positive, got {}",
            text
        )));
    }

    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(digits) => U256::from_str_radix(digits, 16)
            .map_err(|e| MinerError::InputError(format!("Invalid hex difficulty {}: {:?}", text, e)))?,
        None => U256::from_dec_str(text)
            .map_err(|e| MinerError::InputError(format!("Invalid difficulty {}: {:?}", text, e)))?,
    };

    if parsed.is_zero() {
        return Err(MinerError::InputError(
            "difficulty must be a positive integer".into(),
        ));
    }
    Ok(parsed)
}

/// Half-open range `[start, end)` over the counter space
///
/// Bounds are kept as `u128` so the full 64-bit space `[0, 2^64)` is
/// representable; every counter inside the range fits a `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRange {
    start: u128,
    end: u128,
}

impl SearchRange {
    /// Exclusive upper bound of the counter space
    pub const COUNTER_SPACE_END: u128 = 1 << 64;

    /// Creates a range, rejecting `start > end` or `end > 2^64`
    pub fn new(start: u64, end: u128) -> Result<Self, MinerError> {
        if end > Self::COUNTER_SPACE_END {
            return Err(MinerError::InputError(format!(
                "range end {} exceeds the 64-bit counter space",
                end
            )));
        }
        if u128::from(start) > end {
            return Err(MinerError::InputError(format!(
                "range start {} is past its end {}",
                start, end
            )));
        }
        Ok(SearchRange {
            start: u128::from(start),
            end,
        })
    }

    /// The whole counter space `[0, 2^64)`
    pub fn full() -> Self {
        SearchRange {
            start: 0,
            end: Self::COUNTER_SPACE_END,
        }
    }

    /// Inclusive lower bound
    pub fn start(&self) -> u128 {
        self.start
    }

    /// Exclusive upper bound
    pub fn end(&self) -> u128 {
        self.end
    }

    /// Number of counters in the range
    pub fn len(&self) -> u128 {
        self.end - self.start
    }

    /// Whether the range holds no counters
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for SearchRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// A counter whose hash value clears the session target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    /// The qualifying counter
    pub counter: u64,
    /// Hash value of the qualifying preimage
    pub hash: U256,
    /// Attempts performed by the session up to discovery
    pub attempts: u64,
    /// Observed hashrate (H/s) at discovery
    pub hashrate: f64,
}

impl Solution {
    /// Counter rendered as `0x`-prefixed hex, the form submitted upstream
    pub fn counter_hex(&self) -> String {
        format!("{:#x}", self.counter)
    }
}

/// Result of a completed search
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// A qualifying counter was found
    Found(Solution),
    /// Every counter in the range was evaluated without success
    Exhausted,
    /// The search was cancelled before the range was covered
    Cancelled,
}

impl SearchOutcome {
    /// The solution, if one was found
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SearchOutcome::Found(solution) => Some(solution),
            _ => None,
        }
    }
}
