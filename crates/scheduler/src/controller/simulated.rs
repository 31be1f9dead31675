use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use batchmon_core::{BatchError, ProcessRecord, Result, WorkerHandle};

use super::ProcessController;

const FIRST_PID: u32 = 1000;

/// A lifecycle call observed by [`SimulatedController`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlAction {
    Start { job: usize, pid: u32, argv: Vec<String> },
    Suspend { pid: u32 },
    Resume { pid: u32 },
    Terminate { pid: u32 },
}

/// Stands in for the OS: hands out sequential pids and records every call.
#[derive(Debug)]
pub struct SimulatedController {
    next_pid: u32,
    actions: Vec<ControlAction>,
    /// pid -> suspended?
    live: HashMap<u32, bool>,
    failing_jobs: HashSet<usize>,
}

impl Default for SimulatedController {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedController {
    pub fn new() -> Self {
        Self {
            next_pid: FIRST_PID,
            actions: Vec::new(),
            live: HashMap::new(),
            failing_jobs: HashSet::new(),
        }
    }

    /// Make `start` fail for the given job index.
    pub fn fail_start_for(mut self, job: usize) -> Self {
        self.failing_jobs.insert(job);
        self
    }

    pub fn actions(&self) -> &[ControlAction] {
        &self.actions
    }

    pub fn live_workers(&self) -> usize {
        self.live.len()
    }

    pub fn is_suspended(&self, pid: u32) -> bool {
        self.live.get(&pid).copied().unwrap_or(false)
    }
}

#[async_trait]
impl ProcessController for SimulatedController {
    async fn start(&mut self, record: &ProcessRecord) -> Result<WorkerHandle> {
        if self.failing_jobs.contains(&record.job_index) {
            return Err(BatchError::ProcessSpawn {
                program: record.program().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "simulated spawn failure"),
            });
        }

        let pid = self.next_pid;
        self.next_pid += 1;
        self.live.insert(pid, false);
        self.actions.push(ControlAction::Start {
            job: record.job_index,
            pid,
            argv: record.argv().to_vec(),
        });
        Ok(WorkerHandle { pid })
    }

    async fn suspend(&mut self, handle: WorkerHandle) -> Result<()> {
        match self.live.get_mut(&handle.pid) {
            Some(suspended) => *suspended = true,
            None => {
                return Err(BatchError::Signal {
                    signal: "STOP",
                    pid: handle.pid,
                    reason: "no such process".into(),
                })
            }
        }
        self.actions.push(ControlAction::Suspend { pid: handle.pid });
        Ok(())
    }

    async fn resume(&mut self, handle: WorkerHandle) -> Result<()> {
        match self.live.get_mut(&handle.pid) {
            Some(suspended) => *suspended = false,
            None => {
                return Err(BatchError::Signal {
                    signal: "CONT",
                    pid: handle.pid,
                    reason: "no such process".into(),
                })
            }
        }
        self.actions.push(ControlAction::Resume { pid: handle.pid });
        Ok(())
    }

    async fn terminate(&mut self, handle: WorkerHandle) {
        if self.live.remove(&handle.pid).is_some() {
            self.actions.push(ControlAction::Terminate { pid: handle.pid });
        }
    }
}

#[cfg(test)]
mod tests {
    use batchmon_core::JobSpec;

    use super::*;

    fn record(job: usize, burst: i64) -> ProcessRecord {
        ProcessRecord::new(&JobSpec::new(job, 0, burst), "./sleepy")
    }

    #[tokio::test]
    async fn pids_are_sequential() {
        let mut ctl = SimulatedController::new();
        let a = ctl.start(&record(0, 2)).await.unwrap();
        let b = ctl.start(&record(1, 2)).await.unwrap();
        assert_eq!(a.pid, FIRST_PID);
        assert_eq!(b.pid, FIRST_PID + 1);
        assert_eq!(ctl.live_workers(), 2);
    }

    #[tokio::test]
    async fn suspend_resume_toggle_state() {
        let mut ctl = SimulatedController::new();
        let h = ctl.start(&record(0, 2)).await.unwrap();

        ctl.suspend(h).await.unwrap();
        assert!(ctl.is_suspended(h.pid));
        ctl.resume(h).await.unwrap();
        assert!(!ctl.is_suspended(h.pid));
    }

    #[tokio::test]
    async fn terminate_is_idempotent() {
        let mut ctl = SimulatedController::new();
        let h = ctl.start(&record(0, 1)).await.unwrap();
        ctl.terminate(h).await;
        ctl.terminate(h).await;

        assert_eq!(ctl.live_workers(), 0);
        let terminations = ctl
            .actions()
            .iter()
            .filter(|a| matches!(a, ControlAction::Terminate { .. }))
            .count();
        assert_eq!(terminations, 1);
    }

    #[tokio::test]
    async fn resume_unknown_worker_fails() {
        let mut ctl = SimulatedController::new();
        let err = ctl.resume(WorkerHandle { pid: 7 }).await.unwrap_err();
        assert!(matches!(err, BatchError::Signal { signal: "CONT", .. }));
    }

    #[tokio::test]
    async fn injected_spawn_failure() {
        let mut ctl = SimulatedController::new().fail_start_for(1);
        assert!(ctl.start(&record(0, 1)).await.is_ok());
        let err = ctl.start(&record(1, 1)).await.unwrap_err();
        assert!(matches!(err, BatchError::ProcessSpawn { .. }));
    }
}
