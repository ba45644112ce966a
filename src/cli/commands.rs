// src/cli/commands.rs
use crate::types::AlgorithmType;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Keccak Miner CLI - parallel proof-of-work search
#[derive(Parser, Debug)]
#[command(name = "keccak-miner")]
#[command(version, about, long_about = None)]
pub struct Commands {
    /// The action to perform (mine a task, run benchmarks, or generate config)
    #[command(subcommand)]
    pub action: Action,
}

/// Top-level commands for the miner application
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Search for a solution to one task
    Mine(MineOptions),

    /// Measure raw hashrate for a hash function
    Benchmark(BenchmarkOptions),

    /// Generate configuration file template
    Config(ConfigOptions),
}

/// Options for mining one task
#[derive(Parser, Debug)]
pub struct MineOptions {
    /// Task seed, 32 bytes of hex
    #[arg(long)]
    pub seed: String,

    /// Miner identity, 20 bytes of hex
    #[arg(long)]
    pub identity: String,

    /// Difficulty, decimal or 0x-prefixed hex
    #[arg(long)]
    pub difficulty: String,

    /// First counter to try
    #[arg(long, default_value_t = 0)]
    pub start: u64,

    /// Exclusive end of the counter range (default: 2^64)
    #[arg(long)]
    pub end: Option<u128>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of worker threads to use (overrides config)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Counters per chunk (overrides config)
    #[arg(long)]
    pub chunk_size: Option<u64>,

    /// Hash function to use (overrides config)
    #[arg(short, long)]
    pub algorithm: Option<AlgorithmType>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

/// Options for running benchmarks
#[derive(Parser, Debug)]
pub struct BenchmarkOptions {
    /// Hash function to benchmark
    #[arg(short, long, default_value = "keccak256")]
    pub algorithm: AlgorithmType,

    /// Duration of benchmark in seconds
    #[arg(short, long, default_value_t = 10)]
    pub duration: u64,

    /// Number of threads to use
    #[arg(short, long, default_value_t = num_cpus::get())]
    pub threads: usize,
}

/// Options for generating configuration files
#[derive(Parser, Debug)]
pub struct ConfigOptions {
    /// Output file path
    #[arg(short, long, default_value = "config.toml")]
    pub output: PathBuf,
}
