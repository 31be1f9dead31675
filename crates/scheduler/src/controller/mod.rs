//! Process control: the four lifecycle operations the scheduler needs from
//! the OS.
//!
//! - `os`: real workers via `tokio::process` and `kill`
//! - `simulated`: synthetic pids and an action log, for dry runs and tests

mod os;
mod simulated;

use async_trait::async_trait;

use batchmon_core::{ProcessRecord, Result, WorkerHandle};

pub use os::OsProcessController;
pub use simulated::{ControlAction, SimulatedController};

/// Starts, stops, continues and kills worker processes.
///
/// The scheduler calls `start` exactly once per record (on its first
/// dispatch), `resume` only on a suspended worker, and `suspend`/`terminate`
/// only on the current one.
#[async_trait]
pub trait ProcessController: Send {
    /// Launch a worker with the record's argument vector.
    ///
    /// Failure here is fatal to the whole run.
    async fn start(&mut self, record: &ProcessRecord) -> Result<WorkerHandle>;

    /// Stop a running worker. It stays alive and keeps its pid.
    async fn suspend(&mut self, handle: WorkerHandle) -> Result<()>;

    /// Continue a previously suspended worker.
    async fn resume(&mut self, handle: WorkerHandle) -> Result<()>;

    /// Interrupt the worker and wait for it to exit.
    ///
    /// Best effort: failures are logged, never returned. Unknown or already
    /// reaped handles are ignored.
    async fn terminate(&mut self, handle: WorkerHandle);
}
