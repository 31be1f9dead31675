use std::fmt;

use batchmon_core::{JobSpec, Ticks};

/// Per-job timing collected while the batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStats {
    pub job: usize,
    pub arrival_time: Ticks,
    pub cpu_burst: Ticks,
    /// Tick at which the job entered the ready queue.
    pub admitted_at: Option<Ticks>,
    /// Tick of the first dispatch (worker start).
    pub first_dispatch: Option<Ticks>,
    /// Tick at which the worker was terminated.
    pub completed_at: Option<Ticks>,
    pub dispatches: u32,
    pub preemptions: u32,
}

impl JobStats {
    pub fn new(job: &JobSpec) -> Self {
        Self {
            job: job.index,
            arrival_time: job.admission_tick(),
            cpu_burst: job.cpu_ticks(),
            admitted_at: None,
            first_dispatch: None,
            completed_at: None,
            dispatches: 0,
            preemptions: 0,
        }
    }

    /// Record a dispatch at `tick`.
    pub fn record_dispatch(&mut self, tick: Ticks) {
        self.dispatches += 1;
        self.first_dispatch.get_or_insert(tick);
    }

    /// Completion minus arrival.
    pub fn turnaround(&self) -> Option<Ticks> {
        self.completed_at
            .map(|done| done.saturating_sub(self.arrival_time))
    }

    /// First dispatch minus arrival.
    pub fn response(&self) -> Option<Ticks> {
        self.first_dispatch
            .map(|first| first.saturating_sub(self.arrival_time))
    }

    /// Turnaround minus the ticks the job spent on the CPU.
    pub fn waiting(&self) -> Option<Ticks> {
        // A zero-length burst still occupies one tick.
        let on_cpu = self.cpu_burst.max(1);
        self.turnaround().map(|t| t.saturating_sub(on_cpu))
    }
}

/// Summary of a finished (or aborted) batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub quantum: Ticks,
    pub total_ticks: Ticks,
    pub idle_ticks: Ticks,
    pub jobs: Vec<JobStats>,
}

impl RunReport {
    pub fn completed(&self) -> usize {
        self.jobs.iter().filter(|j| j.completed_at.is_some()).count()
    }

    pub fn avg_turnaround(&self) -> Option<f64> {
        mean(self.jobs.iter().filter_map(JobStats::turnaround))
    }

    pub fn avg_response(&self) -> Option<f64> {
        mean(self.jobs.iter().filter_map(JobStats::response))
    }

    pub fn avg_waiting(&self) -> Option<f64> {
        mean(self.jobs.iter().filter_map(JobStats::waiting))
    }
}

fn mean(values: impl Iterator<Item = Ticks>) -> Option<f64> {
    let (sum, count) = values.fold((0u64, 0u64), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum as f64 / count as f64)
}

fn opt(value: Option<Ticks>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Stats for {} of {} jobs (RR, Q={}, {} ticks, {} idle):",
            self.completed(),
            self.jobs.len(),
            self.quantum,
            self.total_ticks,
            self.idle_ticks
        )?;
        writeln!(f, "Job | AT   | CPU  | Done | Turnaround | Response | Waiting | Dispatches")?;
        writeln!(f, "----|------|------|------|------------|----------|---------|-----------")?;
        for j in &self.jobs {
            writeln!(
                f,
                "{:>3} | {:>4} | {:>4} | {:>4} | {:>10} | {:>8} | {:>7} | {:>10}",
                j.job,
                j.arrival_time,
                j.cpu_burst,
                opt(j.completed_at),
                opt(j.turnaround()),
                opt(j.response()),
                opt(j.waiting()),
                j.dispatches
            )?;
        }
        let avg = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
        write!(
            f,
            "Average turnaround: {}, response: {}, waiting: {} ticks",
            avg(self.avg_turnaround()),
            avg(self.avg_response()),
            avg(self.avg_waiting())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished(job: usize, arrival: Ticks, burst: Ticks, first: Ticks, done: Ticks) -> JobStats {
        let mut stats = JobStats::new(&JobSpec::new(job, arrival as i64, burst as i64));
        stats.admitted_at = Some(arrival);
        stats.record_dispatch(first);
        stats.completed_at = Some(done);
        stats
    }

    #[test]
    fn derived_times() {
        let stats = finished(0, 2, 3, 4, 9);
        assert_eq!(stats.turnaround(), Some(7));
        assert_eq!(stats.response(), Some(2));
        assert_eq!(stats.waiting(), Some(4));
    }

    #[test]
    fn first_dispatch_is_kept() {
        let mut stats = JobStats::new(&JobSpec::new(0, 0, 4));
        stats.record_dispatch(1);
        stats.record_dispatch(5);
        assert_eq!(stats.first_dispatch, Some(1));
        assert_eq!(stats.dispatches, 2);
    }

    #[test]
    fn unfinished_job_has_no_turnaround() {
        let stats = JobStats::new(&JobSpec::new(0, 0, 4));
        assert_eq!(stats.turnaround(), None);
        assert_eq!(stats.waiting(), None);
    }

    #[test]
    fn report_averages() {
        let report = RunReport {
            quantum: 2,
            total_ticks: 6,
            idle_ticks: 0,
            jobs: vec![finished(0, 0, 3, 0, 5), finished(1, 0, 3, 2, 6)],
        };
        assert_eq!(report.completed(), 2);
        assert_eq!(report.avg_turnaround(), Some(5.5));
        assert_eq!(report.avg_response(), Some(1.0));
        assert_eq!(report.avg_waiting(), Some(2.5));

        let text = report.to_string();
        assert!(text.starts_with("Stats for 2 of 2 jobs (RR, Q=2, 6 ticks, 0 idle):"));
        assert!(text.ends_with("Average turnaround: 5.50, response: 1.00, waiting: 2.50 ticks"));
    }

    #[test]
    fn table_rows_start_with_the_job_column() {
        let report = RunReport {
            quantum: 2,
            total_ticks: 6,
            idle_ticks: 0,
            jobs: vec![finished(0, 0, 3, 0, 5), finished(1, 0, 3, 2, 6)],
        };
        let text = report.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[1].starts_with("Job | AT"));
        assert!(lines[2].starts_with("----|"));
        assert_eq!(lines[3].split('|').next().map(str::trim), Some("0"));
        assert_eq!(lines[4].split('|').next().map(str::trim), Some("1"));
        assert!(lines.iter().all(|l| !l.starts_with("...")));
    }

    #[test]
    fn negative_job_times_are_reported_clamped() {
        let stats = JobStats::new(&JobSpec::new(0, -1, -2));
        assert_eq!(stats.arrival_time, 0);
        assert_eq!(stats.cpu_burst, 0);
    }

    #[test]
    fn empty_report_has_no_averages() {
        let report = RunReport {
            quantum: 2,
            total_ticks: 0,
            idle_ticks: 0,
            jobs: Vec::new(),
        };
        assert_eq!(report.avg_turnaround(), None);
        assert!(report.to_string().contains("turnaround: -"));
    }
}
