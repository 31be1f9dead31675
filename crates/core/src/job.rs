use serde::{Deserialize, Serialize};

use crate::record::Ticks;

/// One accepted line of a dispatch list.
///
/// Arrival time and CPU burst keep the values written in the file, negative
/// ones included. `memory` and `resources` are carried through untouched; the
/// scheduling policy only reads arrival time and CPU burst.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Zero-based position among the accepted jobs, in file order.
    pub index: usize,
    pub arrival_time: i64,
    pub priority: i64,
    pub cpu_burst: i64,
    pub memory: i64,
    pub resources: [i64; 4],
}

impl JobSpec {
    pub fn new(index: usize, arrival_time: i64, cpu_burst: i64) -> Self {
        Self {
            index,
            arrival_time,
            priority: 0,
            cpu_burst,
            memory: 0,
            resources: [0; 4],
        }
    }

    /// First tick at which the job may be admitted. Negative arrivals are
    /// admitted at tick 0.
    pub fn admission_tick(&self) -> Ticks {
        clamp_ticks(self.arrival_time)
    }

    /// CPU ticks to charge. A negative burst counts as zero.
    pub fn cpu_ticks(&self) -> Ticks {
        clamp_ticks(self.cpu_burst)
    }
}

fn clamp_ticks(value: i64) -> Ticks {
    Ticks::try_from(value).unwrap_or(0)
}
