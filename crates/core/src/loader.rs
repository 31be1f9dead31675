//! Dispatch list loader.
//!
//! A dispatch list is a text file with one job per line:
//!
//! ```text
//! # arrival, priority, cpu burst, memory, r1, r2, r3, r4
//! 0, 1, 3, 64, 0, 0, 0, 0
//! 2, 1, 5, 128, 1, 0, 0, 0
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Lines that do not
//! hold exactly eight integer fields are rejected with a warning and loading
//! carries on. Jobs keep their file order; nothing is sorted here.

use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{BatchError, Result};
use crate::job::JobSpec;

const FIELD_COUNT: usize = 8;

/// A rejected dispatch list line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedEntry {
    /// One-based line number in the input.
    pub line_number: usize,
    pub line: String,
    pub reason: String,
}

impl fmt::Display for MalformedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid line {} in dispatch file ({}): {}",
            self.line_number, self.reason, self.line
        )
    }
}

/// Result of loading a dispatch list: accepted jobs in file order plus the
/// lines that were skipped.
#[derive(Debug, Clone, Default)]
pub struct DispatchList {
    pub jobs: Vec<JobSpec>,
    pub rejected: Vec<MalformedEntry>,
}

/// Read and parse the dispatch list at `path`.
///
/// Fails only when the file cannot be read at all. Lines are decoded one by
/// one, so a line that is not valid UTF-8 is rejected like any other
/// malformed entry.
pub fn load_dispatch_list(path: impl AsRef<Path>) -> Result<DispatchList> {
    let path = path.as_ref();
    let content = std::fs::read(path).map_err(|source| BatchError::InputUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    let list = parse_dispatch_bytes(&content);
    debug!(
        path = %path.display(),
        jobs = list.jobs.len(),
        rejected = list.rejected.len(),
        "dispatch list loaded"
    );
    Ok(list)
}

/// Parse dispatch list text. Malformed lines are logged and collected.
pub fn parse_dispatch_list(content: &str) -> DispatchList {
    parse_dispatch_bytes(content.as_bytes())
}

/// Parse raw dispatch list bytes, decoding each line on its own.
pub fn parse_dispatch_bytes(content: &[u8]) -> DispatchList {
    let mut list = DispatchList::default();

    for (idx, raw) in content.split(|&b| b == b'\n').enumerate() {
        let parsed = match std::str::from_utf8(raw) {
            Ok(text) => {
                let line = text.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                parse_line(line, list.jobs.len()).map_err(|reason| (line.to_string(), reason))
            }
            Err(e) => Err((
                String::from_utf8_lossy(raw).trim().to_string(),
                format!("not valid UTF-8: {e}"),
            )),
        };

        match parsed {
            Ok(job) => list.jobs.push(job),
            Err((line, reason)) => {
                let entry = MalformedEntry {
                    line_number: idx + 1,
                    line,
                    reason,
                };
                warn!(line = entry.line_number, "{entry}");
                list.rejected.push(entry);
            }
        }
    }

    list
}

fn parse_line(line: &str, index: usize) -> std::result::Result<JobSpec, String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != FIELD_COUNT {
        return Err(format!(
            "expected {FIELD_COUNT} fields, found {}",
            fields.len()
        ));
    }

    let arrival_time = parse_field::<i64>(fields[0], "arrival time")?;
    let priority = parse_field::<i64>(fields[1], "priority")?;
    let cpu_burst = parse_field::<i64>(fields[2], "cpu burst")?;
    let memory = parse_field::<i64>(fields[3], "memory")?;

    let mut resources = [0i64; 4];
    for (slot, field) in resources.iter_mut().zip(&fields[4..]) {
        *slot = parse_field::<i64>(field, "resource")?;
    }

    Ok(JobSpec {
        index,
        arrival_time,
        priority,
        cpu_burst,
        memory,
        resources,
    })
}

fn parse_field<T: std::str::FromStr>(value: &str, name: &str) -> std::result::Result<T, String> {
    value
        .parse::<T>()
        .map_err(|_| format!("'{value}' is not a valid {name}"))
}
