//! Sequential fetch-and-score orchestration.
//!
//! One request in flight at a time, a mandatory pause between requests, and
//! per-code failures recorded in place so a bad code never sinks the batch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use crate::error::FetchError;
use crate::fetcher::Fetcher;
use crate::metrics::MetricRecord;
use crate::scorer::{self, Grade};
use crate::source::DataSource;

/// Minimum spacing between consecutive fetches.
///
/// The pause is part of the contract with the external source, which may
/// block callers issuing rapid request streams. `wait_before` chooses whether
/// the pause lands before each fetch (after the first) or after each fetch
/// (except the last); either placement keeps consecutive fetch starts at
/// least `delay` apart.
#[derive(Debug, Clone, Copy)]
pub struct PacingPolicy {
    pub delay: Duration,
    pub wait_before: bool,
}

impl PacingPolicy {
    /// The live default: 1.5 s after each fetch.
    pub fn courtesy() -> Self {
        Self {
            delay: Duration::from_millis(1500),
            wait_before: false,
        }
    }

    /// Zero-delay policy for deterministic tests.
    pub fn none() -> Self {
        Self {
            delay: Duration::ZERO,
            wait_before: false,
        }
    }

    pub fn after(delay: Duration) -> Self {
        Self {
            delay,
            wait_before: false,
        }
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self::courtesy()
    }
}

/// Receives a completion notification after each code. Observability only;
/// the pipeline ignores whatever the sink does with it.
pub trait ProgressSink: Send + Sync {
    fn completed(&self, done: usize, total: usize, code: &str);
}

/// Sink that drops every notification.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn completed(&self, _done: usize, _total: usize, _code: &str) {}
}

/// Sink that logs progress as a fraction of the batch.
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn completed(&self, done: usize, total: usize, code: &str) {
        let pct = if total == 0 {
            100.0
        } else {
            done as f64 / total as f64 * 100.0
        };
        tracing::info!(done, total, code, pct = format!("{pct:.0}"), "progress");
    }
}

/// Cooperative stop signal, checked between codes and never mid-fetch.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Terminal state of one code in a batch.
#[derive(Debug, Clone)]
pub enum Outcome {
    Graded { record: MetricRecord, grade: Grade },
    Failed(FetchError),
}

/// One output row; rows appear in input order.
#[derive(Debug, Clone)]
pub struct ResultRow {
    pub code: String,
    pub outcome: Outcome,
}

/// Ordered per-code outcomes for one run. Terminal output; nothing mutates
/// it after the run returns.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub started_at: DateTime<Utc>,
    pub rows: Vec<ResultRow>,
}

impl BatchResult {
    pub fn succeeded(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Graded { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.rows.len() - self.succeeded()
    }
}

/// Drives a code sequence through fetch → score, strictly sequentially.
pub struct Pipeline<S> {
    fetcher: Fetcher<S>,
    pacing: PacingPolicy,
    cancel: CancelFlag,
}

impl<S: DataSource> Pipeline<S> {
    pub fn new(source: S) -> Self {
        Self {
            fetcher: Fetcher::new(source),
            pacing: PacingPolicy::default(),
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_pacing(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = pacing;
        self
    }

    /// Handle for aborting the batch between codes.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Runs the batch in input order. Duplicate codes produce duplicate rows.
    #[tracing::instrument(skip(self, codes, progress), fields(batch_size = codes.len()))]
    pub async fn run(&self, codes: &[String], progress: &dyn ProgressSink) -> BatchResult {
        let started_at = Utc::now();
        let total = codes.len();
        let mut rows = Vec::with_capacity(total);

        for (i, code) in codes.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!(done = i, total, "batch cancelled, returning partial result");
                break;
            }

            if self.pacing.wait_before && i > 0 && !self.pacing.delay.is_zero() {
                tokio::time::sleep(self.pacing.delay).await;
            }

            let outcome = match self.fetcher.fetch(code).await {
                Ok(record) => {
                    let grade = scorer::grade(&record);
                    debug!(code, %grade, name = %record.name, "code graded");
                    Outcome::Graded { record, grade }
                }
                Err(e) => {
                    error!(code, error = %e, "fetch failed, continuing batch");
                    Outcome::Failed(e)
                }
            };

            rows.push(ResultRow {
                code: code.clone(),
                outcome,
            });
            progress.completed(i + 1, total, code);

            if !self.pacing.wait_before && i + 1 < total && !self.pacing.delay.is_zero() {
                tokio::time::sleep(self.pacing.delay).await;
            }
        }

        BatchResult { started_at, rows }
    }
}
