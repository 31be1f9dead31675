//! Scheduler core -- the tick-driven FCFS + Round-Robin control loop.
//!
//! Split into focused submodules:
//! - `core`: Scheduler struct, constructor, and accessor methods
//! - `execution`: per-tick step, the run loop, and invariant checks

mod core;
mod execution;

pub use self::core::Scheduler;
