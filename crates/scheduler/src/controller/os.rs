use std::collections::HashMap;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use batchmon_core::{BatchError, ProcessRecord, Result, WorkerHandle};

use super::ProcessController;

/// Controls real worker processes.
///
/// Workers inherit stdout/stderr so their progress lines interleave with the
/// scheduler's. Signals go through the system `kill` utility. Every child is
/// spawned with `kill_on_drop`, so dropping the controller (e.g. after a fatal
/// error) never leaves stopped workers behind.
#[derive(Debug, Default)]
pub struct OsProcessController {
    children: HashMap<u32, Child>,
}

impl OsProcessController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of workers started and not yet terminated.
    pub fn live_workers(&self) -> usize {
        self.children.len()
    }
}

#[async_trait]
impl ProcessController for OsProcessController {
    async fn start(&mut self, record: &ProcessRecord) -> Result<WorkerHandle> {
        let program = record.program().to_string();

        let mut cmd = Command::new(&program);
        cmd.args(record.args())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| BatchError::ProcessSpawn {
            program: program.clone(),
            source,
        })?;
        let pid = child.id().ok_or_else(|| BatchError::ProcessSpawn {
            program: program.clone(),
            source: std::io::Error::other("worker exited before its pid was observed"),
        })?;

        debug!(pid, job = record.job_index, argv = ?record.argv(), "worker spawned");
        self.children.insert(pid, child);
        Ok(WorkerHandle { pid })
    }

    async fn suspend(&mut self, handle: WorkerHandle) -> Result<()> {
        send_signal("STOP", handle.pid).await
    }

    async fn resume(&mut self, handle: WorkerHandle) -> Result<()> {
        send_signal("CONT", handle.pid).await
    }

    async fn terminate(&mut self, handle: WorkerHandle) {
        let Some(mut child) = self.children.remove(&handle.pid) else {
            debug!(pid = handle.pid, "terminate on unknown worker ignored");
            return;
        };

        if let Err(e) = send_signal("INT", handle.pid).await {
            warn!(pid = handle.pid, error = %e, "interrupt failed, force killing worker");
            if let Err(e) = child.start_kill() {
                warn!(pid = handle.pid, error = %e, "force kill failed");
            }
        }

        match child.wait().await {
            Ok(status) => debug!(pid = handle.pid, %status, "worker exited"),
            Err(source) => {
                let err = BatchError::ProcessWait {
                    pid: handle.pid,
                    source,
                };
                warn!(error = %err, "continuing as if the worker exited");
            }
        }
    }
}

/// Deliver `SIG<signal>` to `pid` via `kill -<signal> <pid>`.
#[cfg(unix)]
async fn send_signal(signal: &'static str, pid: u32) -> Result<()> {
    let output = Command::new("kill")
        .arg(format!("-{signal}"))
        .arg(pid.to_string())
        .output()
        .await
        .map_err(|e| BatchError::Signal {
            signal,
            pid,
            reason: e.to_string(),
        })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(BatchError::Signal {
            signal,
            pid,
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[cfg(not(unix))]
async fn send_signal(signal: &'static str, pid: u32) -> Result<()> {
    Err(BatchError::Signal {
        signal,
        pid,
        reason: "signal delivery is only supported on unix".into(),
    })
}
