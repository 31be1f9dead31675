use std::fmt;

use slotmap::{new_key_type, SlotMap};

use crate::job::JobSpec;

pub type Ticks = u64;

new_key_type! {
    /// Handle to a live process record in a [`ProcessTable`].
    pub struct RecordId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessState {
    /// Loaded but never dispatched; no worker exists yet.
    NotStarted,
    Running,
    /// Worker is alive but stopped.
    Suspended,
    Terminated,
}

/// OS-level identity of a started worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerHandle {
    pub pid: u32,
}

impl fmt::Display for WorkerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pid)
    }
}

/// Bookkeeping for one job (the PCB).
#[derive(Debug, Clone)]
pub struct ProcessRecord {
    pub job_index: usize,
    pub state: ProcessState,
    handle: Option<WorkerHandle>,
    argv: Vec<String>,
    pub arrival_time: Ticks,
    pub remaining_cpu_time: Ticks,
    pub priority: i64,
    pub memory: i64,
    pub resources: [i64; 4],
}

impl ProcessRecord {
    /// Build a record for `job`. The worker argument is the job's total burst
    /// and never changes afterwards, whatever the remaining time becomes.
    pub fn new(job: &JobSpec, worker_program: &str) -> Self {
        Self {
            job_index: job.index,
            state: ProcessState::NotStarted,
            handle: None,
            argv: vec![worker_program.to_string(), job.cpu_burst.to_string()],
            arrival_time: job.admission_tick(),
            remaining_cpu_time: job.cpu_ticks(),
            priority: job.priority,
            memory: job.memory,
            resources: job.resources,
        }
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    pub fn handle(&self) -> Option<WorkerHandle> {
        self.handle
    }

    /// Record the worker identity after the first dispatch.
    pub fn attach_handle(&mut self, handle: WorkerHandle) {
        debug_assert!(
            self.handle.is_none(),
            "job {} already has worker {:?}",
            self.job_index,
            self.handle
        );
        if self.handle.is_none() {
            self.handle = Some(handle);
        }
    }

    /// Charge one tick of CPU. Saturates at zero.
    pub fn charge_tick(&mut self) {
        self.remaining_cpu_time = self.remaining_cpu_time.saturating_sub(1);
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_cpu_time == 0
    }
}

/// Arena owning every live process record.
#[derive(Debug, Default)]
pub struct ProcessTable {
    records: SlotMap<RecordId, ProcessRecord>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: SlotMap::with_capacity_and_key(capacity),
        }
    }

    pub fn insert(&mut self, record: ProcessRecord) -> RecordId {
        self.records.insert(record)
    }

    pub fn get(&self, id: RecordId) -> Option<&ProcessRecord> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut ProcessRecord> {
        self.records.get_mut(id)
    }

    /// Release a record. Its id is invalid afterwards.
    pub fn release(&mut self, id: RecordId) -> Option<ProcessRecord> {
        self.records.remove(id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &ProcessRecord)> {
        self.records.iter()
    }
}
