// src/main.rs
use clap::Parser;
use keccak_miner::cli::{Action, BenchmarkOptions, Commands, ConfigOptions, MineOptions};
use keccak_miner::utils::init_bench_logging;
use keccak_miner::{
    Config, Miner, MinerError, SearchOutcome, SearchRange, Target, TaskDescriptor, config,
    init_logging, parse_difficulty,
};
use primitive_types::U256;
use std::time::{Duration, Instant};

/// Main entry point for the miner
///
/// # Flow
/// 1. Parses command line arguments
/// 2. Delegates to appropriate subcommand handler
/// 3. Propagates any errors upward
fn main() -> Result<(), MinerError> {
    let cli = Commands::parse();

    match cli.action {
        Action::Mine(opts) => mine(opts),
        Action::Benchmark(opts) => run_benchmark(opts),
        Action::Config(opts) => generate_config(opts),
    }
}

/// Searches for a solution to the task given on the command line
///
/// # Operations
/// 1. Initializes logging
/// 2. Loads configuration and applies CLI overrides
/// 3. Validates the task and range
/// 4. Runs one session and prints its outcome
fn mine(opts: MineOptions) -> Result<(), MinerError> {
    init_logging();

    let mut config = match &opts.config {
        Some(path) => config::load(path)?,
        None => Config::default(),
    };
    // Apply CLI overrides
    if let Some(workers) = opts.workers {
        config.worker_threads = workers;
    }
    if let Some(chunk_size) = opts.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(algo) = opts.algorithm {
        config.algorithm = algo;
    }

    let difficulty = parse_difficulty(&opts.difficulty)?;
    let task = TaskDescriptor::from_hex(&opts.seed, &opts.identity, difficulty)?;
    let range = SearchRange::new(
        opts.start,
        opts.end.unwrap_or(SearchRange::COUNTER_SPACE_END),
    )?;

    let miner = Miner::new(config)?;
    log::info!(
        "Mining with {} | identity 0x{}",
        miner.config().algorithm,
        hex::encode(task.identity())
    );
    let outcome = miner.mine(task, range)?;

    if opts.json {
        let rendered = match &outcome {
            SearchOutcome::Found(solution) => serde_json::json!({
                "outcome": "found",
                "counter": solution.counter_hex(),
                "hash": solution.hash,
                "attempts": solution.attempts,
                "hashrate": solution.hashrate,
            }),
            SearchOutcome::Exhausted => serde_json::json!({ "outcome": "exhausted" }),
            SearchOutcome::Cancelled => serde_json::json!({ "outcome": "cancelled" }),
        };
        println!("{}", serde_json::to_string_pretty(&rendered)?);
        return Ok(());
    }

    match outcome {
        SearchOutcome::Found(solution) => {
            println!("{}", solution.counter_hex());
        }
        SearchOutcome::Exhausted => println!("exhausted"),
        SearchOutcome::Cancelled => println!("cancelled"),
    }
    Ok(())
}

/// Runs a hash function benchmark
///
/// Searches against a target nothing can meet and cancels the session once
/// the requested duration has elapsed.
fn run_benchmark(opts: BenchmarkOptions) -> Result<(), MinerError> {
    init_bench_logging();

    let config = Config {
        algorithm: opts.algorithm,
        worker_threads: opts.threads,
        report_interval_secs: 5,
        ..Config::default()
    };
    let miner = Miner::new(config)?;
    let task = TaskDescriptor::new([0u8; 32], [0u8; 20], U256::one())?;
    let session = miner.open_session(task)?.override_target(Target::ZERO);
    let handle = session.handle();

    log::info!(
        "Starting {} benchmark for {} seconds on {} threads",
        opts.algorithm,
        opts.duration,
        opts.threads
    );

    let started = Instant::now();
    let timer = std::thread::spawn({
        let handle = handle.clone();
        let duration = Duration::from_secs(opts.duration);
        move || {
            std::thread::sleep(duration);
            handle.cancel();
        }
    });

    let outcome = session.find_solution(SearchRange::full())?;
    if timer.join().is_err() {
        log::warn!("Benchmark timer thread panicked");
    }

    // Report final results
    let elapsed = started.elapsed().as_secs_f64();
    log::info!("Benchmark results ({:?}):", outcome);
    log::info!("Total hashes: {}", handle.attempts());
    log::info!(
        "Average hashrate: {:.2} H/s",
        keccak_miner::stats::hashrate(handle.attempts(), elapsed)
    );
    log::logger().flush(); // Ensure final results appear

    Ok(())
}

/// Writes a configuration template to the requested path
fn generate_config(opts: ConfigOptions) -> Result<(), MinerError> {
    let template = config::generate_template();
    std::fs::write(&opts.output, template)?;
    log::info!("Wrote configuration template to {}", opts.output.display());
    Ok(())
}
