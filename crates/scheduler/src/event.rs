use std::fmt;

use batchmon_core::Ticks;

/// Something observable that happened during a scheduler step.
///
/// `Display` renders the progress line printed to stdout; every line starts
/// with the simulated tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    Admitted {
        tick: Ticks,
        job: usize,
        arrival: Ticks,
        remaining: Ticks,
    },
    Started {
        tick: Ticks,
        job: usize,
        pid: u32,
        remaining: Ticks,
        arrival: Ticks,
    },
    Resumed {
        tick: Ticks,
        job: usize,
        pid: u32,
    },
    Ran {
        tick: Ticks,
        job: usize,
        pid: u32,
        remaining: Ticks,
        quantum_used: Ticks,
    },
    Terminated {
        tick: Ticks,
        job: usize,
        pid: u32,
    },
    Preempted {
        tick: Ticks,
        job: usize,
        pid: u32,
    },
    // Nothing ran this tick.
    Idle {
        tick: Ticks,
    },
}

impl SchedulerEvent {
    pub fn tick(&self) -> Ticks {
        match self {
            Self::Admitted { tick, .. }
            | Self::Started { tick, .. }
            | Self::Resumed { tick, .. }
            | Self::Ran { tick, .. }
            | Self::Terminated { tick, .. }
            | Self::Preempted { tick, .. }
            | Self::Idle { tick } => *tick,
        }
    }

    pub fn job(&self) -> Option<usize> {
        match self {
            Self::Admitted { job, .. }
            | Self::Started { job, .. }
            | Self::Resumed { job, .. }
            | Self::Ran { job, .. }
            | Self::Terminated { job, .. }
            | Self::Preempted { job, .. } => Some(*job),
            Self::Idle { .. } => None,
        }
    }
}

impl fmt::Display for SchedulerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admitted {
                tick,
                job,
                arrival,
                remaining,
            } => write!(
                f,
                "Time {tick}: Process admitted (job={job}, AT={arrival}, CPU={remaining})"
            ),
            Self::Started {
                tick,
                job,
                pid,
                remaining,
                arrival,
            } => write!(
                f,
                "Time {tick}: starting process PID={pid} (job={job}), CPU={remaining}, AT={arrival}"
            ),
            Self::Resumed { tick, job, pid } => {
                write!(f, "Time {tick}: Resuming PID={pid} (job={job})")
            }
            Self::Ran {
                tick,
                pid,
                remaining,
                quantum_used,
                ..
            } => write!(
                f,
                "Time {tick}: PID={pid} running, remaining={remaining}, quantumUsed={quantum_used}"
            ),
            Self::Terminated { tick, job, pid } => {
                write!(f, "Time {tick}: terminating PID={pid} (job={job})")
            }
            Self::Preempted { tick, pid, .. } => {
                write!(f, "Time {tick}: Quantum expired for PID={pid}, preempting.")
            }
            Self::Idle { tick } => write!(f, "Time {tick}: CPU idle"),
        }
    }
}
