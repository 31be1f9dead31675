//! End-to-end batch runs through the public API: dispatch list text in,
//! progress events and a run report out, on a virtual clock.

use std::num::NonZeroU64;

use batchmon_core::{parse_dispatch_list, DispatcherConfig};
use batchmon_scheduler::{
    ControlAction, Scheduler, SchedulerEvent, SimulatedController, VirtualClock,
};

const TWO_JOBS: &str = "\
# arrival, priority, cpu, memory, r1, r2, r3, r4
0, 1, 3, 64, 0, 0, 0, 0
0, 1, 3, 64, 0, 0, 0, 0
";

fn dry_run_config(quantum: u64) -> DispatcherConfig {
    DispatcherConfig {
        quantum: NonZeroU64::new(quantum).expect("quantum must be non-zero"),
        dry_run: true,
        tick_millis: 0,
        ..DispatcherConfig::default()
    }
}

#[tokio::test]
async fn documented_two_job_timeline() {
    let list = parse_dispatch_list(TWO_JOBS);
    assert_eq!(list.jobs.len(), 2);

    let config = dry_run_config(2);
    let mut sched = Scheduler::from_config(
        &config,
        &list.jobs,
        SimulatedController::new(),
        VirtualClock::new(),
    );

    let mut lines = Vec::new();
    let report = sched
        .run_with(|e| lines.push(e.to_string()))
        .await
        .unwrap();

    assert_eq!(
        lines,
        vec![
            "Time 0: Process admitted (job=0, AT=0, CPU=3)",
            "Time 0: Process admitted (job=1, AT=0, CPU=3)",
            "Time 0: starting process PID=1000 (job=0), CPU=3, AT=0",
            "Time 1: PID=1000 running, remaining=2, quantumUsed=1",
            "Time 2: PID=1000 running, remaining=1, quantumUsed=2",
            "Time 2: Quantum expired for PID=1000, preempting.",
            "Time 2: starting process PID=1001 (job=1), CPU=3, AT=0",
            "Time 3: PID=1001 running, remaining=2, quantumUsed=1",
            "Time 4: PID=1001 running, remaining=1, quantumUsed=2",
            "Time 4: Quantum expired for PID=1001, preempting.",
            "Time 4: Resuming PID=1000 (job=0)",
            "Time 5: PID=1000 running, remaining=0, quantumUsed=1",
            "Time 5: terminating PID=1000 (job=0)",
            "Time 5: Resuming PID=1001 (job=1)",
            "Time 6: PID=1001 running, remaining=0, quantumUsed=1",
            "Time 6: terminating PID=1001 (job=1)",
        ]
        .into_iter()
        .map(String::from)
        .collect::<Vec<_>>()
    );
    assert_eq!(report.total_ticks, 6);
    assert_eq!(report.completed(), 2);
}

#[tokio::test]
async fn malformed_lines_do_not_stop_the_batch() {
    let input = "0,1,2,0,0,0,0,0\nnot,a,valid,line\n1,1,1,0,0,0,0,0\n";
    let list = parse_dispatch_list(input);
    assert_eq!(list.rejected.len(), 1);

    let mut sched = Scheduler::from_config(
        &dry_run_config(2),
        &list.jobs,
        SimulatedController::new(),
        VirtualClock::new(),
    );
    let report = sched.run_with(|_| {}).await.unwrap();
    assert_eq!(report.completed(), 2);
    assert_eq!(report.total_ticks, 3);
}

#[tokio::test]
async fn workers_receive_total_burst_and_configured_program() {
    let list = parse_dispatch_list("0,0,5,0,0,0,0,0\n");
    let config = DispatcherConfig {
        worker_program: "/opt/bin/sleepy".into(),
        ..dry_run_config(1)
    };
    let mut sched = Scheduler::from_config(
        &config,
        &list.jobs,
        SimulatedController::new(),
        VirtualClock::new(),
    );
    sched.run_with(|_| {}).await.unwrap();

    let actions = sched.controller().actions();
    assert_eq!(
        actions[0],
        ControlAction::Start {
            job: 0,
            pid: 1000,
            argv: vec!["/opt/bin/sleepy".into(), "5".into()],
        }
    );
    // Single job: preempted after every tick, then resumed from the head.
    let resumes = actions
        .iter()
        .filter(|a| matches!(a, ControlAction::Resume { .. }))
        .count();
    assert_eq!(resumes, 4);
}

#[tokio::test]
async fn loop_ends_exactly_when_last_job_terminates() {
    let list = parse_dispatch_list("0,0,2,0,0,0,0,0\n3,0,2,0,0,0,0,0\n");
    let mut sched = Scheduler::from_config(
        &dry_run_config(3),
        &list.jobs,
        SimulatedController::new(),
        VirtualClock::new(),
    );

    let mut last = None;
    let report = sched.run_with(|e| last = Some(e.clone())).await.unwrap();

    assert!(matches!(
        last,
        Some(SchedulerEvent::Terminated { job: 1, tick: 5, .. })
    ));
    assert_eq!(report.total_ticks, 5);
    assert_eq!(report.idle_ticks, 1);
}

#[tokio::test]
async fn negative_burst_job_terminates_after_one_tick() {
    let list = parse_dispatch_list("-1,1,3,0,0,0,0,0\n0,1,-2,0,0,0,0,0\n");
    assert_eq!(list.jobs.len(), 2);
    assert!(list.rejected.is_empty());

    let mut sched = Scheduler::from_config(
        &dry_run_config(1),
        &list.jobs,
        SimulatedController::new(),
        VirtualClock::new(),
    );
    let mut lines = Vec::new();
    let report = sched.run_with(|e| lines.push(e.to_string())).await.unwrap();

    assert_eq!(lines[0], "Time 0: Process admitted (job=0, AT=0, CPU=3)");
    assert!(lines.contains(&"Time 2: terminating PID=1001 (job=1)".to_string()));
    assert_eq!(report.jobs[1].dispatches, 1);
    assert_eq!(report.completed(), 2);
}
