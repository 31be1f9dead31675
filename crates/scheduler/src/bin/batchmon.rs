//! batchmon: FCFS + Round-Robin batch dispatcher.
//!
//! Loads the dispatch list named in the config (default `dispatchlist.txt`),
//! then runs every job to completion as a real worker process, one tick per
//! configured interval. Progress goes to stdout, diagnostics to stderr.
//!
//! # Configuration
//!
//! No command-line flags. Settings come from `BATCHMON_*` environment
//! variables (a `.env` file is honoured) or a TOML file named by
//! `BATCHMON_CONFIG`:
//!
//! ```bash
//! BATCHMON_QUANTUM=3 BATCHMON_WORKER_PROGRAM=./target/debug/sleepy batchmon
//! BATCHMON_DRY_RUN=1 batchmon   # simulate without spawning workers
//! ```

use tracing::warn;

use batchmon_core::{load_dispatch_list, load_dotenv, DispatcherConfig};
use batchmon_scheduler::{
    OsProcessController, RunReport, Scheduler, SimulatedController, VirtualClock, WallClock,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    load_dotenv();
    let config = DispatcherConfig::from_env()?;
    config.log_summary();

    let list = load_dispatch_list(&config.dispatch_list)?;
    if !list.rejected.is_empty() {
        warn!(
            skipped = list.rejected.len(),
            accepted = list.jobs.len(),
            "dispatch list contained malformed entries"
        );
    }

    let report: RunReport = if config.dry_run {
        let mut scheduler = Scheduler::from_config(
            &config,
            &list.jobs,
            SimulatedController::new(),
            VirtualClock::new(),
        );
        scheduler.run().await?
    } else {
        let mut scheduler = Scheduler::from_config(
            &config,
            &list.jobs,
            OsProcessController::new(),
            WallClock::new(config.tick()),
        );
        scheduler.run().await?
    };

    println!("{report}");
    Ok(())
}
