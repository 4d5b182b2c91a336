//! Runs one monitor per subject inside a bounded pool.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::ServiceError;
use crate::monitor::{MonitorContext, MonitorExit, SubjectMonitor};
use crate::shutdown::ShutdownSignal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectExit {
    pub subject_id: String,
    pub exit: MonitorExit,
}

/// Exit of every subject, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupervisorReport {
    pub exits: Vec<SubjectExit>,
}

impl SupervisorReport {
    /// Subjects that stopped because their error budget ran out.
    #[must_use]
    pub fn escalated(&self) -> Vec<&str> {
        self.exits
            .iter()
            .filter(|e| matches!(e.exit, MonitorExit::Escalated { .. }))
            .map(|e| e.subject_id.as_str())
            .collect()
    }

    #[must_use]
    pub fn exit_of(&self, subject_id: &str) -> Option<&MonitorExit> {
        self.exits.iter().find(|e| e.subject_id == subject_id).map(|e| &e.exit)
    }
}

/// Owns the subject monitors. At most `max_concurrent` run at once; the
/// rest wait for a free slot.
pub struct MonitorSupervisor {
    ctx: MonitorContext,
    max_concurrent: usize,
    shutdown: ShutdownSignal,
}

impl MonitorSupervisor {
    #[must_use]
    pub fn new(ctx: MonitorContext, max_concurrent: usize, shutdown: ShutdownSignal) -> Self {
        Self { ctx, max_concurrent: max_concurrent.max(1), shutdown }
    }

    /// Blocks until every subject's monitor has stopped.
    ///
    /// A monitor that panics does not stop the others; the first such fault
    /// is returned once all monitors are done.
    pub async fn run(&self, subjects: &[String]) -> Result<SupervisorReport, ServiceError> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();

        tracing::info!(
            subjects = subjects.len(),
            max_concurrent = self.max_concurrent,
            "Starting subject monitors"
        );
        for subject_id in subjects {
            let monitor =
                SubjectMonitor::new(subject_id.clone(), self.ctx.clone(), self.shutdown.clone());
            let semaphore = Arc::clone(&semaphore);
            let mut shutdown = self.shutdown.clone();
            let worker = tokio::spawn(async move {
                let permit = tokio::select! {
                    permit = semaphore.acquire_owned() => permit,
                    () = shutdown.triggered() => return MonitorExit::Cancelled,
                };
                let Ok(_permit) = permit else {
                    return MonitorExit::Cancelled;
                };
                monitor.run().await
            });
            // Outer task turns a panicking worker into a value tagged with its subject.
            let subject_id = subject_id.clone();
            tasks.spawn(async move { (subject_id, worker.await) });
        }

        let mut report = SupervisorReport::default();
        let mut fault = None;
        while let Some(joined) = tasks.join_next().await {
            let (subject_id, result) = match joined {
                Ok(pair) => pair,
                Err(e) => (String::from("<unknown>"), Err(e)),
            };
            match result {
                Ok(exit) => report.exits.push(SubjectExit { subject_id, exit }),
                Err(e) => {
                    tracing::error!(subject = %subject_id, error = %e, "Monitor task faulted");
                    if fault.is_none() {
                        fault = Some(ServiceError::MonitorFault {
                            subject: subject_id,
                            message: e.to_string(),
                        });
                    }
                },
            }
        }

        match fault {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }
}
