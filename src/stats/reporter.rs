// src/stats/reporter.rs
use crate::miner::cancel::CancellationToken;
use crate::miner::session::SessionHandle;
use crate::stats::counter::{AttemptCounter, hashrate};
use crossbeam_channel::{Sender, select};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use sysinfo::System;

/// Point-in-time view of a search's progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSample {
    /// Attempts performed so far
    pub attempts: u64,
    /// Wall-clock time since the session started
    pub elapsed: Duration,
    /// Estimated hashrate in hashes per second
    pub hashrate: f64,
}

impl ProgressSample {
    /// Takes a sample from a counter and a session start time
    pub fn capture(attempts: &AttemptCounter, started: Instant) -> Self {
        let elapsed = started.elapsed();
        let attempts = attempts.snapshot();
        ProgressSample {
            attempts,
            elapsed,
            hashrate: hashrate(attempts, elapsed.as_secs_f64()),
        }
    }
}

/// Estimated hashrate of a session, or `0.0` when there is none
///
/// Safe to call from any thread while the session is searching.
pub fn current_hashrate(session: Option<&SessionHandle>) -> f64 {
    session.map_or(0.0, SessionHandle::hashrate)
}

/// Periodically logs the progress of a running search
pub struct ProgressReporter {
    /// Interval between progress lines
    report_interval: Duration,
    /// Optional consumer of every sample
    sink: Option<Sender<ProgressSample>>,
}

impl ProgressReporter {
    /// Creates a new ProgressReporter with the specified interval
    pub fn new(report_interval: Duration) -> Self {
        ProgressReporter {
            report_interval,
            sink: None,
        }
    }

    /// Forwards every sample to `sink` in addition to logging it
    pub fn with_sink(mut self, sink: Sender<ProgressSample>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Starts reporting on a background thread
    ///
    /// The thread exits when `cancel` is observed set at a tick, or when the
    /// returned handle is stopped or dropped.
    pub fn start(
        self,
        attempts: AttemptCounter,
        started: Instant,
        cancel: CancellationToken,
    ) -> std::io::Result<ReporterHandle> {
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);
        let ticker = crossbeam_channel::tick(self.report_interval);
        let mut sink = self.sink;

        let thread = std::thread::Builder::new()
            .name("miner-progress".into())
            .spawn(move || {
                let mut system = System::new();

                loop {
                    select! {
                        recv(ticker) -> _ => {},
                        // Fires once the handle drops its sender
                        recv(shutdown_rx) -> _ => break,
                    }
                    if cancel.is_cancelled() {
                        break;
                    }

                    let sample = ProgressSample::capture(&attempts, started);
                    system.refresh_cpu_usage();
                    log::info!(
                        "Hashrate: {:.2} H/s | Attempts: {} | Elapsed: {:.1}s | CPU: {:.1}%",
                        sample.hashrate,
                        sample.attempts,
                        sample.elapsed.as_secs_f64(),
                        system.global_cpu_usage()
                    );

                    if let Some(tx) = &sink {
                        if tx.send(sample).is_err() {
                            sink = None;
                        }
                    }
                }
            })?;

        Ok(ReporterHandle {
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }
}

/// Owner of a running reporter thread
///
/// Stopping (or dropping) the handle signals the thread and joins it.
pub struct ReporterHandle {
    shutdown: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl ReporterHandle {
    /// Stops the reporter and waits for its thread to exit
    pub fn stop(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        drop(self.shutdown.take());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::warn!("Progress reporter thread panicked");
            }
        }
    }
}

impl Drop for ReporterHandle {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_session_reports_zero() {
        assert_eq!(current_hashrate(None), 0.0);
    }

    #[test]
    fn emits_samples_until_stopped() {
        let attempts = AttemptCounter::new();
        let (tx, rx) = crossbeam_channel::unbounded();
        let handle = ProgressReporter::new(Duration::from_millis(10))
            .with_sink(tx)
            .start(attempts.clone(), Instant::now(), CancellationToken::new())
            .unwrap();

        attempts.record();
        let sample = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(sample.hashrate.is_finite());
        assert!(sample.hashrate >= 0.0);

        handle.stop();
        // The sender lives in the joined thread, so the channel is now closed
        while rx.try_recv().is_ok() {}
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn exits_once_cancelled() {
        let cancel = CancellationToken::new();
        let (tx, rx) = crossbeam_channel::unbounded();
        let handle = ProgressReporter::new(Duration::from_millis(5))
            .with_sink(tx)
            .start(AttemptCounter::new(), Instant::now(), cancel.clone())
            .unwrap();

        cancel.cancel();
        // The thread drops its sender when the loop ends
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            match rx.recv_timeout(Duration::from_millis(50)) {
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
                _ if Instant::now() > deadline => panic!("reporter kept running"),
                _ => {}
            }
        }
        handle.stop();
    }
}
