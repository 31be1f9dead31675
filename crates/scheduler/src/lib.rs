//! FCFS admission + Round-Robin dispatch over real worker processes.
//!
//! The [`Scheduler`] owns the dispatch queue, the ready queue and the current
//! slot, and drives them one tick at a time. Workers are started, stopped,
//! continued and killed through a [`ProcessController`]; time advances through
//! a [`Clock`]. Both are swappable so a whole batch can be simulated
//! deterministically with [`SimulatedController`] and [`VirtualClock`].

pub mod clock;
pub mod controller;
pub mod event;
pub mod metrics;
pub mod runner;

pub use clock::{Clock, VirtualClock, WallClock};
pub use controller::{ControlAction, OsProcessController, ProcessController, SimulatedController};
pub use event::SchedulerEvent;
pub use metrics::{JobStats, RunReport};
pub use runner::Scheduler;
