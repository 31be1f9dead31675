use tracing::{debug, info};

use batchmon_core::{ProcessState, Result};

use super::Scheduler;
use crate::clock::Clock;
use crate::controller::ProcessController;
use crate::event::SchedulerEvent;
use crate::metrics::RunReport;

impl<C: ProcessController, K: Clock> Scheduler<C, K> {
    /// Run one tick and return what happened.
    ///
    /// Order within a tick: admit arrivals, dispatch if the CPU is free,
    /// advance the clock, charge the current process, then terminate it if
    /// finished or preempt it if its quantum is used up. Completion wins over
    /// preemption.
    pub async fn step(&mut self) -> Result<Vec<SchedulerEvent>> {
        let mut events = Vec::new();

        self.admit_arrivals(&mut events);
        self.dispatch_next(&mut events).await?;

        self.clock.advance().await;
        self.now += 1;

        self.charge_current(&mut events).await?;

        self.debug_check_invariants();
        Ok(events)
    }

    /// Step until every job has terminated, handing each event to
    /// `on_event` as it happens.
    pub async fn run_with<F>(&mut self, mut on_event: F) -> Result<RunReport>
    where
        F: FnMut(&SchedulerEvent),
    {
        while !self.is_finished() {
            for event in self.step().await? {
                on_event(&event);
            }
        }
        info!(ticks = self.now, idle = self.idle_ticks, "batch complete");
        Ok(self.report())
    }

    /// Run the whole batch, printing progress lines to stdout.
    pub async fn run(&mut self) -> Result<RunReport> {
        println!(
            "=== Batch Process Monitor: FCFS + Round Robin (Q={}) ===",
            self.quantum
        );
        let report = self.run_with(|event| println!("{event}")).await?;
        println!("=== All processes completed at time {} ===", self.now);
        Ok(report)
    }

    // ── Tick phases ─────────────────────────────────────────────────

    /// Move every job at the head of the dispatch queue whose arrival time
    /// has come into the ready queue. Only the head is inspected.
    fn admit_arrivals(&mut self, events: &mut Vec<SchedulerEvent>) {
        while let Some(id) = self.dispatch_queue.peek() {
            let record = self
                .table
                .get(id)
                .expect("dispatch queue holds a released record");
            if record.arrival_time > self.now {
                break;
            }

            events.push(SchedulerEvent::Admitted {
                tick: self.now,
                job: record.job_index,
                arrival: record.arrival_time,
                remaining: record.remaining_cpu_time,
            });
            debug!(job = record.job_index, tick = self.now, "admitted");

            self.dispatch_queue.dequeue();
            self.ready_queue.enqueue(id);

            let now = self.now;
            if let Some(stats) = self.stats_mut(id) {
                stats.admitted_at = Some(now);
            }
        }
    }

    /// If nothing is current, take the ready queue head and start or resume
    /// its worker.
    async fn dispatch_next(&mut self, events: &mut Vec<SchedulerEvent>) -> Result<()> {
        if self.current.is_some() {
            return Ok(());
        }
        let Some(id) = self.ready_queue.dequeue() else {
            return Ok(());
        };

        self.quantum_used = 0;
        let record = self
            .table
            .get(id)
            .expect("ready queue holds a released record");

        let event = match record.state {
            ProcessState::NotStarted => {
                let handle = self.controller.start(record).await?;
                let record = self
                    .table
                    .get_mut(id)
                    .expect("ready queue holds a released record");
                record.attach_handle(handle);
                SchedulerEvent::Started {
                    tick: self.now,
                    job: record.job_index,
                    pid: handle.pid,
                    remaining: record.remaining_cpu_time,
                    arrival: record.arrival_time,
                }
            }
            ProcessState::Suspended => {
                let handle = record
                    .handle()
                    .expect("suspended record has no worker handle");
                let job = record.job_index;
                self.controller.resume(handle).await?;
                SchedulerEvent::Resumed {
                    tick: self.now,
                    job,
                    pid: handle.pid,
                }
            }
            state @ (ProcessState::Running | ProcessState::Terminated) => {
                unreachable!("job {} dispatched while {state:?}", record.job_index)
            }
        };

        if let Some(record) = self.table.get_mut(id) {
            record.state = ProcessState::Running;
        }
        self.current = Some(id);

        let now = self.now;
        if let Some(stats) = self.stats_mut(id) {
            stats.record_dispatch(now);
        }

        events.push(event);
        Ok(())
    }

    /// Charge one tick to the current process, then apply completion and
    /// quantum policy.
    async fn charge_current(&mut self, events: &mut Vec<SchedulerEvent>) -> Result<()> {
        let Some(id) = self.current else {
            self.idle_ticks += 1;
            events.push(SchedulerEvent::Idle { tick: self.now });
            return Ok(());
        };

        let record = self
            .table
            .get_mut(id)
            .expect("current record missing from process table");
        record.charge_tick();
        self.quantum_used += 1;

        let job = record.job_index;
        let finished = record.is_finished();
        let handle = record
            .handle()
            .expect("current record has no worker handle");

        events.push(SchedulerEvent::Ran {
            tick: self.now,
            job,
            pid: handle.pid,
            remaining: record.remaining_cpu_time,
            quantum_used: self.quantum_used,
        });

        if finished {
            events.push(SchedulerEvent::Terminated {
                tick: self.now,
                job,
                pid: handle.pid,
            });
            self.controller.terminate(handle).await;

            let now = self.now;
            if let Some(stats) = self.stats_mut(id) {
                stats.completed_at = Some(now);
            }
            if let Some(record) = self.table.get_mut(id) {
                record.state = ProcessState::Terminated;
            }
            self.table.release(id);
            self.current = None;
        } else if self.quantum_used >= self.quantum {
            events.push(SchedulerEvent::Preempted {
                tick: self.now,
                job,
                pid: handle.pid,
            });
            self.controller.suspend(handle).await?;

            if let Some(record) = self.table.get_mut(id) {
                record.state = ProcessState::Suspended;
            }
            if let Some(stats) = self.stats_mut(id) {
                stats.preemptions += 1;
            }
            self.ready_queue.enqueue(id);
            self.current = None;
        }

        Ok(())
    }

    // ── Invariants ──────────────────────────────────────────────────

    /// Every live record sits in exactly one of: dispatch queue, ready queue,
    /// current slot.
    fn debug_check_invariants(&self) {
        if !cfg!(debug_assertions) {
            return;
        }

        let placed = self.dispatch_queue.len()
            + self.ready_queue.len()
            + usize::from(self.current.is_some());
        debug_assert_eq!(
            placed,
            self.table.len(),
            "live records must be in exactly one queue or the current slot"
        );

        if let Some(id) = self.current {
            debug_assert!(!self.ready_queue.contains(id), "current record also ready");
            debug_assert!(!self.dispatch_queue.contains(id), "current record also queued");
            let state = self.table.get(id).map(|r| r.state);
            debug_assert_eq!(state, Some(ProcessState::Running), "current record must be Running");
        }

        for id in self.ready_queue.iter() {
            debug_assert!(!self.dispatch_queue.contains(id), "record {id:?} in both queues");
            let state = self.table.get(id).map(|r| r.state);
            debug_assert!(
                matches!(state, Some(ProcessState::NotStarted | ProcessState::Suspended)),
                "ready record {id:?} in state {state:?}"
            );
        }

        for id in self.dispatch_queue.iter() {
            let state = self.table.get(id).map(|r| r.state);
            debug_assert_eq!(state, Some(ProcessState::NotStarted), "dispatch queue record started");
        }
    }
}
