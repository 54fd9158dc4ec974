//! Runner shim — executes variants through a restartable state machine.
//!
//! Per variant:
//! ```text
//! Running ──Retry(reason)──▶ Running      (on_restarted, then on_started again)
//! Running ──Done(status)───▶ Passed | Failed | Ignored   (on_finished)
//! ```
//! Restarts are bounded by `RunnerConfig::max_restarts`; the attempt that
//! would exceed the bound ends the variant as failed. Variants carrying an
//! ignore marker are reported as ignored without running the body or
//! notifying listeners.

use crate::config::RunnerConfig;
use crate::lifecycle::{LifecycleListener, ListenerId, ListenerSet};
use crate::suite::SuiteError;
use serde::Serialize;
use tessera_core::{ExpandError, Variant, VariantFingerprint};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from planning or loading before any variant runs.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("suite error: {0}")]
    Suite(#[from] SuiteError),
    #[error("expansion error: {0}")]
    Expand(#[from] ExpandError),
}

/// Terminal status of a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum TestStatus {
    Passed,
    Failed(String),
    Ignored(String),
}

impl TestStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, TestStatus::Failed(_))
    }
}

/// What one attempt of a test body produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Recoverable: run the same variant again.
    Retry(String),
    Done(TestStatus),
}

/// A test body invoked once per attempt.
pub trait TestBody {
    fn run(&mut self, variant: &Variant) -> Outcome;
}

impl<F> TestBody for F
where
    F: FnMut(&Variant) -> Outcome,
{
    fn run(&mut self, variant: &Variant) -> Outcome {
        self(variant)
    }
}

/// Result of running one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub variant: String,
    pub fingerprint: VariantFingerprint,
    pub status: TestStatus,
    pub attempts: u32,
    /// Reasons given for each restart, in order.
    pub restarts: Vec<String>,
}

/// Aggregate of a sequence of runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub ignored: usize,
    /// Variants not executed because an earlier one failed.
    pub skipped: usize,
    pub reports: Vec<RunReport>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, report: RunReport) {
        match report.status {
            TestStatus::Passed => self.passed += 1,
            TestStatus::Failed(_) => self.failed += 1,
            TestStatus::Ignored(_) => self.ignored += 1,
        }
        self.reports.push(report);
    }
}

// ─── Runner ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Runner {
    config: RunnerConfig,
    listeners: ListenerSet,
}

impl Runner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            listeners: ListenerSet::new(),
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn add_listener(&mut self, listener: impl LifecycleListener + 'static) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Run one variant to a terminal status.
    pub fn run_variant(&mut self, variant: &Variant, body: &mut dyn TestBody) -> RunReport {
        let name = variant.qualified_name();
        let fingerprint = variant.fingerprint();

        if let Some(reason) = variant.ignore_reason() {
            debug!(variant = %name, %reason, "ignored");
            return RunReport {
                variant: name,
                fingerprint,
                status: TestStatus::Ignored(reason),
                attempts: 0,
                restarts: Vec::new(),
            };
        }

        let mut attempts = 0u32;
        let mut restarts = Vec::new();
        let status = loop {
            self.listeners.started(&name);
            attempts += 1;
            match body.run(variant) {
                Outcome::Done(status) => break status,
                Outcome::Retry(reason) => {
                    self.listeners.restarted(&name, &reason);
                    restarts.push(reason);
                    if restarts.len() as u32 > self.config.max_restarts {
                        warn!(
                            variant = %name,
                            max_restarts = self.config.max_restarts,
                            "restart limit exceeded"
                        );
                        break TestStatus::Failed(format!(
                            "restart limit exceeded ({} restarts allowed)",
                            self.config.max_restarts
                        ));
                    }
                    info!(variant = %name, reason = %restarts[restarts.len() - 1], "restarting");
                }
            }
        };
        self.listeners.finished(&name);

        RunReport {
            variant: name,
            fingerprint,
            status,
            attempts,
            restarts,
        }
    }

    /// Run variants in order. Stops at the first failure unless
    /// `keep_going` is set; the rest are counted as skipped.
    pub fn run_all(&mut self, variants: &[Variant], body: &mut dyn TestBody) -> RunSummary {
        let mut summary = RunSummary::default();
        for (i, variant) in variants.iter().enumerate() {
            let report = self.run_variant(variant, body);
            let failed = report.status.is_failure();
            summary.record(report);
            if failed && !self.config.keep_going {
                summary.skipped = variants.len() - i - 1;
                break;
            }
        }
        info!(
            passed = summary.passed,
            failed = summary.failed,
            ignored = summary.ignored,
            skipped = summary.skipped,
            "run complete"
        );
        summary
    }
}
