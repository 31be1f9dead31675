use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BatchError, Result};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ── Dispatcher config ───────────────────────────────────────────────

/// Runtime settings for one batch run.
///
/// Defaults reproduce the classic setup: `dispatchlist.txt` in the working
/// directory, a quantum of 2 ticks, one-second ticks and `./sleepy` as the
/// worker. Every field can be overridden from a TOML file named by
/// `BATCHMON_CONFIG` and then from `BATCHMON_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Path of the dispatch list to load.
    #[serde(default = "default_dispatch_list")]
    pub dispatch_list: PathBuf,

    /// Ticks a process may run before it is preempted. Zero is rejected
    /// when the value is parsed.
    #[serde(default = "default_quantum")]
    pub quantum: NonZeroU64,

    /// Worker executable launched for every job.
    #[serde(default = "default_worker_program")]
    pub worker_program: String,

    /// Real-time length of one tick in milliseconds.
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,

    /// Simulate the batch without spawning workers or sleeping.
    #[serde(default)]
    pub dry_run: bool,
}

fn default_dispatch_list() -> PathBuf {
    PathBuf::from("dispatchlist.txt")
}

fn default_quantum() -> NonZeroU64 {
    NonZeroU64::new(2).unwrap_or(NonZeroU64::MIN)
}

fn default_worker_program() -> String {
    "./sleepy".into()
}

fn default_tick_millis() -> u64 {
    1000
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            dispatch_list: default_dispatch_list(),
            quantum: default_quantum(),
            worker_program: default_worker_program(),
            tick_millis: default_tick_millis(),
            dry_run: false,
        }
    }
}

impl DispatcherConfig {
    /// Build config from the process environment (call `load_dotenv()` first).
    ///
    /// When `BATCHMON_CONFIG` names a TOML file it is used as the base,
    /// otherwise the built-in defaults are.
    pub fn from_env() -> Result<Self> {
        match env_opt("BATCHMON_CONFIG") {
            Some(path) => Self::from_file(path),
            None => {
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Parse config from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(toml_str)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Duration of a single tick.
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    // ── Environment variable overrides ──────────────────────────────

    /// Apply environment variable overrides.
    ///
    /// - `BATCHMON_DISPATCH_LIST` -> `dispatch_list`
    /// - `BATCHMON_QUANTUM` -> `quantum`
    /// - `BATCHMON_WORKER_PROGRAM` -> `worker_program`
    /// - `BATCHMON_TICK_MILLIS` -> `tick_millis`
    /// - `BATCHMON_DRY_RUN` -> `dry_run`
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(env_opt);
    }

    pub(crate) fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("BATCHMON_DISPATCH_LIST") {
            self.dispatch_list = PathBuf::from(v);
        }
        if let Some(v) = lookup("BATCHMON_QUANTUM") {
            match v.parse::<NonZeroU64>() {
                Ok(quantum) => self.quantum = quantum,
                Err(_) => tracing::warn!(value = %v, "ignoring unparsable BATCHMON_QUANTUM"),
            }
        }
        if let Some(v) = lookup("BATCHMON_WORKER_PROGRAM") {
            self.worker_program = v;
        }
        if let Some(v) = lookup("BATCHMON_TICK_MILLIS") {
            match v.parse::<u64>() {
                Ok(millis) => self.tick_millis = millis,
                Err(_) => tracing::warn!(value = %v, "ignoring unparsable BATCHMON_TICK_MILLIS"),
            }
        }
        if let Some(v) = lookup("BATCHMON_DRY_RUN") {
            match parse_flag(&v) {
                Some(flag) => self.dry_run = flag,
                None => tracing::warn!(value = %v, "ignoring unparsable BATCHMON_DRY_RUN"),
            }
        }
    }

    // ── Validation ──────────────────────────────────────────────────

    pub fn validate(&self) -> Result<()> {
        if self.tick_millis == 0 && !self.dry_run {
            return Err(BatchError::Config(
                "tick_millis must be at least 1 outside dry runs".into(),
            ));
        }
        if self.worker_program.trim().is_empty() {
            return Err(BatchError::Config("worker_program must not be empty".into()));
        }
        if self.dispatch_list.as_os_str().is_empty() {
            return Err(BatchError::Config("dispatch_list must not be empty".into()));
        }
        Ok(())
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  dispatch_list: {}", self.dispatch_list.display());
        tracing::info!("  quantum:       {} ticks", self.quantum);
        tracing::info!("  worker:        {}", self.worker_program);
        tracing::info!("  tick:          {}ms", self.tick_millis);
        tracing::info!("  dry_run:       {}", self.dry_run);
    }
}
