//! Parallel batch evaluation: N independent runs, ranked by score.
//!
//! Runs are embarrassingly parallel — each owns its seed, its RNG, and
//! all of its mutable state. The pool here is a bounded set of worker
//! threads draining a crossbeam job channel; the aggregator waits for
//! every scheduled run. A run that panics is caught at the run boundary
//! and recorded as a failed entry, never aborting its siblings.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;

use ember_core::EndReason;
use rand::{RngExt, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{ConfigError, RunConfig};
use crate::world::{RescueWorld, RunResult};

/// Errors detected before any run starts.
#[derive(Clone, Debug, PartialEq)]
pub enum BatchError {
    /// The shared run configuration is invalid.
    Config(ConfigError),
    /// Zero runs were requested.
    NoRuns,
}

impl std::fmt::Display for BatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::NoRuns => write!(f, "runs must be at least 1"),
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::NoRuns => None,
        }
    }
}

impl From<ConfigError> for BatchError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// A batch request: one template config played under many seeds.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// The shared run configuration; each run replaces only the seed.
    pub base: RunConfig,
    /// Number of independent runs.
    pub runs: u32,
    /// Master seed from which per-run seeds are derived.
    pub master_seed: u64,
    /// Worker threads. `None` = auto-detect from hardware concurrency.
    pub worker_count: Option<usize>,
}

impl BatchConfig {
    /// A batch of `runs` runs over `base`, seeded from `master_seed`.
    pub fn new(base: RunConfig, runs: u32, master_seed: u64) -> Self {
        Self {
            base,
            runs,
            master_seed,
            worker_count: None,
        }
    }

    /// Resolve the worker count: explicit values clamp to `[1, 64]`,
    /// auto-detection uses available parallelism capped by the number
    /// of runs.
    pub fn resolved_worker_count(&self) -> usize {
        let cap = (self.runs as usize).max(1);
        match self.worker_count {
            Some(n) => n.clamp(1, 64).min(cap),
            None => {
                let cpus = thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4);
                cpus.clamp(1, 16).min(cap)
            }
        }
    }
}

/// One slot of a batch result.
#[derive(Clone, Debug)]
pub enum BatchEntry {
    /// The run played to termination.
    Completed {
        /// Ordinal id within the batch.
        id: u32,
        /// The finished run.
        result: RunResult,
    },
    /// The run blew up; its siblings were unaffected.
    Failed {
        /// Ordinal id within the batch.
        id: u32,
        /// The seed the run was given.
        seed: u64,
        /// What went wrong, as well as it could be captured.
        reason: String,
    },
}

impl BatchEntry {
    fn id(&self) -> u32 {
        match self {
            Self::Completed { id, .. } | Self::Failed { id, .. } => *id,
        }
    }

    /// Sort key: completed runs by score descending, failures last.
    fn score_key(&self) -> i64 {
        match self {
            Self::Completed { result, .. } => result.score,
            Self::Failed { .. } => i64::MIN,
        }
    }
}

/// Counts of terminal reasons across a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerminalTally {
    /// Runs won.
    pub wins: u32,
    /// Runs lost to victim count.
    pub loss_victims: u32,
    /// Runs lost to collapse.
    pub loss_collapse: u32,
    /// Runs that hit the step ceiling.
    pub timeouts: u32,
    /// Runs that failed outright.
    pub failed: u32,
}

/// A finished batch: entries sorted by score descending plus the
/// terminal tally.
#[derive(Clone, Debug)]
pub struct BatchResult {
    /// All entries, best score first, failures at the end.
    pub entries: Vec<BatchEntry>,
    /// Aggregate terminal reasons.
    pub tally: TerminalTally,
}

/// Execute a batch over a bounded worker pool.
///
/// Per-run seeds are drawn from a master ChaCha8 stream, so a batch is
/// as reproducible as a single run: same template, same `master_seed`,
/// same results.
///
/// # Errors
///
/// Fails fast on an invalid template config or a zero-run request;
/// nothing is executed in that case.
pub fn run_batch(config: &BatchConfig) -> Result<BatchResult, BatchError> {
    config.base.validate()?;
    if config.runs == 0 {
        return Err(BatchError::NoRuns);
    }

    let mut seeder = ChaCha8Rng::seed_from_u64(config.master_seed);
    let jobs: Vec<(u32, u64)> = (0..config.runs).map(|id| (id, seeder.random())).collect();

    let workers = config.resolved_worker_count();
    let (job_tx, job_rx) = crossbeam_channel::unbounded::<(u32, u64)>();
    let (entry_tx, entry_rx) = crossbeam_channel::unbounded::<BatchEntry>();
    for job in jobs {
        // Unbounded channel: send cannot fail while the receiver lives.
        let _ = job_tx.send(job);
    }
    drop(job_tx);

    let mut entries: Vec<BatchEntry> = Vec::with_capacity(config.runs as usize);
    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let entry_tx = entry_tx.clone();
            let base = &config.base;
            scope.spawn(move || {
                while let Ok((id, seed)) = job_rx.recv() {
                    if entry_tx.send(execute_run(base, id, seed)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(entry_tx);
        entries.extend(entry_rx.iter());
    });

    entries.sort_by(|a, b| b.score_key().cmp(&a.score_key()).then(a.id().cmp(&b.id())));

    let mut tally = TerminalTally::default();
    for entry in &entries {
        match entry {
            BatchEntry::Completed { result, .. } => match result.end_reason {
                EndReason::Win => tally.wins += 1,
                EndReason::LossVictims => tally.loss_victims += 1,
                EndReason::LossCollapse => tally.loss_collapse += 1,
                EndReason::Timeout => tally.timeouts += 1,
            },
            BatchEntry::Failed { .. } => tally.failed += 1,
        }
    }

    Ok(BatchResult { entries, tally })
}

/// Play one run inside a panic boundary.
fn execute_run(base: &RunConfig, id: u32, seed: u64) -> BatchEntry {
    let mut config = base.clone();
    config.seed = seed;
    let outcome = catch_unwind(AssertUnwindSafe(|| -> Result<RunResult, ConfigError> {
        Ok(RescueWorld::new(config)?.run())
    }));
    match outcome {
        Ok(Ok(result)) => BatchEntry::Completed { id, result },
        Ok(Err(e)) => BatchEntry::Failed {
            id,
            seed,
            reason: e.to_string(),
        },
        Err(payload) => BatchEntry::Failed {
            id,
            seed,
            reason: panic_message(&payload),
        },
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "run panicked".to_string()
    }
}
