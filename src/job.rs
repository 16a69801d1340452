//! A sweep run owned by the caller and shared by handle: status lifecycle,
//! progress and a cooperative cancel flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{info, warn};

use crate::betting::BetPolicy;
use crate::simulation::{SimulationConfig, SimulationOptions};
use crate::sweep::{run_sweep, SweepProgress, SweepSummary};

/// Cooperative stop signal. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed(String),
    Cancelled,
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed(_) | JobStatus::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub completed: usize,
    pub total: usize,
    pub current: Option<String>,
    pub failed_configs: Vec<String>,
}

#[derive(Debug)]
pub struct SimulationJob {
    state: Mutex<JobSnapshot>,
    cancel: CancelToken,
}

impl Default for SimulationJob {
    fn default() -> Self {
        SimulationJob::new()
    }
}

impl SimulationJob {
    pub fn new() -> SimulationJob {
        SimulationJob {
            state: Mutex::new(JobSnapshot {
                status: JobStatus::Pending,
                completed: 0,
                total: 0,
                current: None,
                failed_configs: Vec::new(),
            }),
            cancel: CancelToken::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, JobSnapshot> {
        // A panic while holding the lock only leaves stale progress behind.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> JobSnapshot {
        self.lock().clone()
    }

    pub fn status(&self) -> JobStatus {
        self.lock().status.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run every configuration. Only a `Pending` job can be started; a
    /// second call returns `None`.
    pub fn run(
        &self,
        configs: &[SimulationConfig],
        policy: &dyn BetPolicy,
        options: &SimulationOptions,
    ) -> Option<SweepSummary> {
        {
            let mut state = self.lock();
            if state.status != JobStatus::Pending {
                warn!(status = ?state.status, "job already started");
                return None;
            }
            state.status = JobStatus::Running;
            state.total = configs.len();
        }

        let summary = run_sweep(configs, policy, options, &self.cancel, |progress: SweepProgress| {
            let mut state = self.lock();
            state.completed = progress.completed;
            state.total = progress.total;
            state.current = progress.current;
        });

        let mut state = self.lock();
        state.failed_configs = summary.failed().map(|o| o.config.name()).collect();
        state.current = None;
        state.status = if summary.cancelled {
            JobStatus::Cancelled
        } else if state.failed_configs.is_empty() {
            JobStatus::Completed
        } else {
            JobStatus::Failed(format!(
                "{} of {} configurations failed",
                state.failed_configs.len(),
                configs.len()
            ))
        };
        info!(status = ?state.status, completed = state.completed, "job finished");
        Some(summary)
    }
}
