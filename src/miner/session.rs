// src/miner/session.rs
//! Mining sessions
//!
//! A [`MiningSession`] owns everything one search needs: the preimage prefix,
//! the target, the attempt counter, and the cancellation token. The
//! [`Miner`] coordinator keeps the handle of the most recent session so its
//! hashrate can be queried from other threads.

use crate::config::Config;
use crate::miner::algorithm::{Algorithm, create_algorithm, evaluate};
use crate::miner::cancel::CancellationToken;
use crate::miner::scheduler::{ChunkScheduler, ScanResult, SchedulerConfig};
use crate::miner::target::Target;
use crate::miner::worker::ChunkWorker;
use crate::stats::{AttemptCounter, ProgressReporter, ProgressSample, hashrate};
use crate::types::{PREFIX_LEN, SearchOutcome, SearchRange, Solution, TaskDescriptor};
use crate::utils::error::MinerError;
use arc_swap::ArcSwap;
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    /// Created, not yet searching
    Idle = 0,
    /// A search is running
    Scanning = 1,
    /// A solution was returned
    Found = 2,
    /// The range was searched without success
    Exhausted = 3,
    /// The search stopped on request
    Cancelled = 4,
    /// Hash evaluation failed
    Failed = 5,
}

impl SessionState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => SessionState::Idle,
            1 => SessionState::Scanning,
            2 => SessionState::Found,
            3 => SessionState::Exhausted,
            4 => SessionState::Cancelled,
            _ => SessionState::Failed,
        }
    }

    /// Whether no further search can happen in this state
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionState::Idle | SessionState::Scanning)
    }
}

/// Cloneable, thread-safe view of a session
///
/// Reads the session's counters and can cancel its search; it never keeps
/// the session itself alive.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    attempts: AttemptCounter,
    cancel: CancellationToken,
    started: Instant,
    state: Arc<AtomicU8>,
}

impl SessionHandle {
    fn new() -> Self {
        SessionHandle {
            attempts: AttemptCounter::new(),
            cancel: CancellationToken::new(),
            started: Instant::now(),
            state: Arc::new(AtomicU8::new(SessionState::Idle as u8)),
        }
    }

    /// Attempts performed so far
    pub fn attempts(&self) -> u64 {
        self.attempts.snapshot()
    }

    /// Time since the session was created
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Estimated hashrate in hashes per second
    pub fn hashrate(&self) -> f64 {
        hashrate(self.attempts.snapshot(), self.started.elapsed().as_secs_f64())
    }

    /// Progress snapshot
    pub fn sample(&self) -> ProgressSample {
        ProgressSample::capture(&self.attempts, self.started)
    }

    /// Requests cancellation; honored at the next chunk or wave boundary
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether cancellation was requested or a solution was found
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn begin(&self) -> Result<(), MinerError> {
        self.state
            .compare_exchange(
                SessionState::Idle as u8,
                SessionState::Scanning as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .map(|_| ())
            .map_err(|raw| {
                MinerError::SessionError(format!(
                    "session already {:?}; open a new session for another search",
                    SessionState::from_u8(raw)
                ))
            })
    }

    fn finish(&self, state: SessionState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }
}

/// One proof-of-work search over a single task
pub struct MiningSession {
    task: TaskDescriptor,
    prefix: [u8; PREFIX_LEN],
    target: Target,
    algorithm: Arc<dyn Algorithm>,
    scheduler: ChunkScheduler,
    handle: SessionHandle,
    report_interval: Option<Duration>,
    progress_sink: Option<Sender<ProgressSample>>,
}

impl MiningSession {
    /// Opens a session for `task`
    ///
    /// The prefix and target are derived once here and reused for every
    /// candidate. Progress reporting is off until
    /// [`with_report_interval`](Self::with_report_interval) is called.
    pub fn new(
        task: TaskDescriptor,
        algorithm: Arc<dyn Algorithm>,
        scheduler: SchedulerConfig,
    ) -> Result<Self, MinerError> {
        let prefix = task.prefix();
        let target = Target::from_difficulty(task.difficulty());
        Ok(MiningSession {
            task,
            prefix,
            target,
            algorithm,
            scheduler: ChunkScheduler::new(scheduler)?,
            handle: SessionHandle::new(),
            report_interval: None,
            progress_sink: None,
        })
    }

    /// Opens a session with the algorithm, scheduler and reporting settings
    /// of a loaded configuration
    pub fn from_config(task: TaskDescriptor, config: &Config) -> Result<Self, MinerError> {
        let algorithm = create_algorithm(config.algorithm);
        Ok(Self::new(task, algorithm, config.scheduler_config())?
            .with_report_interval(config.report_interval()))
    }

    /// Sets the progress interval; `None` runs headless
    pub fn with_report_interval(mut self, interval: Option<Duration>) -> Self {
        self.report_interval = interval;
        self
    }

    /// Forwards progress samples to `sink`
    pub fn with_progress_sink(mut self, sink: Sender<ProgressSample>) -> Self {
        self.progress_sink = Some(sink);
        self
    }

    /// Replaces the difficulty-derived target, e.g. with [`Target::ZERO`] for
    /// benchmarking
    pub fn override_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// The task being searched
    pub fn task(&self) -> &TaskDescriptor {
        &self.task
    }

    /// The acceptance threshold
    pub fn target(&self) -> Target {
        self.target
    }

    /// The fixed preimage prefix
    pub fn prefix(&self) -> &[u8; PREFIX_LEN] {
        &self.prefix
    }

    /// A handle for querying or cancelling this session from other threads
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Searches `range` for a counter whose hash clears the target
    ///
    /// May be called once per session. Exhaustion and cancellation are
    /// returned as outcomes; a hash failure is returned as an error and
    /// leaves the session `Failed`.
    pub fn find_solution(&self, range: SearchRange) -> Result<SearchOutcome, MinerError> {
        self.handle.begin()?;
        self.search(range).inspect_err(|e| {
            log::error!("Search aborted: {}", e);
            self.handle.finish(SessionState::Failed);
        })
    }

    fn search(&self, range: SearchRange) -> Result<SearchOutcome, MinerError> {
        log::info!(
            "Searching range {} | difficulty {} | {} workers",
            range,
            self.task.difficulty(),
            self.scheduler.config().worker_count
        );

        let reporter = match self.report_interval {
            Some(interval) if !interval.is_zero() => {
                let mut reporter = ProgressReporter::new(interval);
                if let Some(sink) = &self.progress_sink {
                    reporter = reporter.with_sink(sink.clone());
                }
                Some(reporter.start(
                    self.handle.attempts.clone(),
                    self.handle.started,
                    self.handle.cancel.clone(),
                )?)
            }
            _ => None,
        };

        let worker = ChunkWorker::new(
            self.algorithm.as_ref(),
            &self.prefix,
            self.target,
            &self.handle.attempts,
        );
        let result = self.scheduler.run(&worker, range, &self.handle.cancel);

        if let Some(reporter) = reporter {
            reporter.stop();
        }

        match result? {
            ScanResult::Found(counter) => {
                let solution = Solution {
                    counter,
                    hash: evaluate(self.algorithm.as_ref(), &self.prefix, counter)?,
                    attempts: self.handle.attempts(),
                    hashrate: self.handle.hashrate(),
                };
                log::info!(
                    "Found solution {} after {} attempts ({:.2} H/s)",
                    solution.counter_hex(),
                    solution.attempts,
                    solution.hashrate
                );
                self.handle.finish(SessionState::Found);
                Ok(SearchOutcome::Found(solution))
            }
            ScanResult::Exhausted => {
                log::warn!("No solution in range {}", range);
                self.handle.finish(SessionState::Exhausted);
                Ok(SearchOutcome::Exhausted)
            }
            ScanResult::Cancelled => {
                log::info!("Search cancelled after {} attempts", self.handle.attempts());
                self.handle.finish(SessionState::Cancelled);
                Ok(SearchOutcome::Cancelled)
            }
        }
    }
}

/// Opens sessions and tracks the most recent one
///
/// Replaces process-wide "last session" state: hashrate queries go through
/// an explicit coordinator that any thread can share.
pub struct Miner {
    /// Settings applied to every session
    config: Config,
    /// Hash function shared by every session
    algorithm: Arc<dyn Algorithm>,
    /// Handle of the most recently opened session (atomically swappable)
    latest: ArcSwap<Option<SessionHandle>>,
}

impl Miner {
    /// Creates a coordinator, validating the configuration
    pub fn new(config: Config) -> Result<Self, MinerError> {
        config.validate()?;
        Ok(Miner {
            algorithm: create_algorithm(config.algorithm),
            config,
            latest: ArcSwap::from_pointee(None),
        })
    }

    /// Coordinator settings
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Opens a fresh session for `task` and makes it the queryable one
    pub fn open_session(&self, task: TaskDescriptor) -> Result<MiningSession, MinerError> {
        let session = MiningSession::new(task, self.algorithm.clone(), self.config.scheduler_config())?
            .with_report_interval(self.config.report_interval());
        self.latest.store(Arc::new(Some(session.handle())));
        Ok(session)
    }

    /// Opens a session for `task` and searches `range` with it
    pub fn mine(&self, task: TaskDescriptor, range: SearchRange) -> Result<SearchOutcome, MinerError> {
        self.open_session(task)?.find_solution(range)
    }

    /// Handle of the most recently opened session, if any
    pub fn latest_session(&self) -> Option<SessionHandle> {
        (**self.latest.load()).clone()
    }

    /// Hashrate of the most recent session, `0.0` if none was ever opened
    pub fn current_hashrate(&self) -> f64 {
        let guard = self.latest.load();
        let latest: &Option<SessionHandle> = &guard;
        crate::stats::current_hashrate(latest.as_ref())
    }
}
