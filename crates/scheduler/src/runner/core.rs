use std::num::NonZeroU64;

use slotmap::SecondaryMap;

use batchmon_core::{
    DispatcherConfig, JobSpec, ProcessRecord, ProcessTable, RecordId, RecordQueue, Ticks,
};

use crate::clock::Clock;
use crate::controller::ProcessController;
use crate::metrics::{JobStats, RunReport};

/// The batch scheduler. Owns every process record and the queues that hold
/// them; nothing else mutates them.
pub struct Scheduler<C: ProcessController, K: Clock> {
    pub(super) quantum: Ticks,
    pub(super) now: Ticks,
    pub(super) table: ProcessTable,
    /// Loaded jobs not yet arrived, in file order.
    pub(super) dispatch_queue: RecordQueue,
    pub(super) ready_queue: RecordQueue,
    pub(super) current: Option<RecordId>,
    /// Ticks the current process has used of its quantum.
    pub(super) quantum_used: Ticks,
    pub(super) controller: C,
    pub(super) clock: K,
    pub(super) stats: Vec<JobStats>,
    pub(super) stats_slot: SecondaryMap<RecordId, usize>,
    pub(super) idle_ticks: Ticks,
}

impl<C: ProcessController, K: Clock> Scheduler<C, K> {
    /// Create a scheduler with every job placed in the dispatch queue, in
    /// the order given.
    pub fn new(
        jobs: &[JobSpec],
        worker_program: &str,
        quantum: NonZeroU64,
        controller: C,
        clock: K,
    ) -> Self {
        let mut table = ProcessTable::with_capacity(jobs.len());
        let mut dispatch_queue = RecordQueue::new();
        let mut stats = Vec::with_capacity(jobs.len());
        let mut stats_slot = SecondaryMap::with_capacity(jobs.len());

        for job in jobs {
            let id = table.insert(ProcessRecord::new(job, worker_program));
            dispatch_queue.enqueue(id);
            stats_slot.insert(id, stats.len());
            stats.push(JobStats::new(job));
        }

        Self {
            quantum: quantum.get(),
            now: 0,
            table,
            dispatch_queue,
            ready_queue: RecordQueue::new(),
            current: None,
            quantum_used: 0,
            controller,
            clock,
            stats,
            stats_slot,
            idle_ticks: 0,
        }
    }

    /// Build from a loaded config.
    pub fn from_config(config: &DispatcherConfig, jobs: &[JobSpec], controller: C, clock: K) -> Self {
        Self::new(jobs, &config.worker_program, config.quantum, controller, clock)
    }

    pub fn now(&self) -> Ticks {
        self.now
    }

    pub fn quantum(&self) -> Ticks {
        self.quantum
    }

    pub fn quantum_used(&self) -> Ticks {
        self.quantum_used
    }

    pub fn current_id(&self) -> Option<RecordId> {
        self.current
    }

    pub fn current(&self) -> Option<&ProcessRecord> {
        self.current.and_then(|id| self.table.get(id))
    }

    pub fn record(&self, id: RecordId) -> Option<&ProcessRecord> {
        self.table.get(id)
    }

    pub fn dispatch_queue(&self) -> &RecordQueue {
        &self.dispatch_queue
    }

    pub fn ready_queue(&self) -> &RecordQueue {
        &self.ready_queue
    }

    /// Records not yet terminated.
    pub fn live_records(&self) -> usize {
        self.table.len()
    }

    /// True once the dispatch queue, ready queue and current slot are all
    /// empty.
    pub fn is_finished(&self) -> bool {
        self.dispatch_queue.is_empty() && self.ready_queue.is_empty() && self.current.is_none()
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    pub fn report(&self) -> RunReport {
        RunReport {
            quantum: self.quantum,
            total_ticks: self.now,
            idle_ticks: self.idle_ticks,
            jobs: self.stats.clone(),
        }
    }

    pub(super) fn stats_mut(&mut self, id: RecordId) -> Option<&mut JobStats> {
        let slot = *self.stats_slot.get(id)?;
        self.stats.get_mut(slot)
    }
}
