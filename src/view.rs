//! Display derivations for the dashboard.
//!
//! Everything here is a pure function over a snapshot: the app layer owns the
//! state, passes it in, and renders whatever comes back. No function in this
//! module reads a clock, touches the network, or fails.

use crate::models::{JobStatus, StepStatus};
use chrono::{DateTime, Utc};
use ratatui::style::Color;
use std::collections::HashSet;

impl JobStatus {
    pub fn glyph(self) -> &'static str {
        match self {
            JobStatus::Queued => "⏳",
            JobStatus::Running => "🔄",
            JobStatus::Done => "✅",
            JobStatus::Failed => "❌",
            JobStatus::Unknown => "❓",
        }
    }

    pub fn color(self) -> Color {
        match self {
            JobStatus::Queued => Color::Yellow,
            JobStatus::Running => Color::Blue,
            JobStatus::Done => Color::Green,
            JobStatus::Failed => Color::Red,
            JobStatus::Unknown => Color::Gray,
        }
    }

    /// Badge text, uppercased the way the status pill renders it.
    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::Running => "RUNNING",
            JobStatus::Done => "DONE",
            JobStatus::Failed => "FAILED",
            JobStatus::Unknown => "UNKNOWN",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

impl StepStatus {
    pub fn glyph(self) -> &'static str {
        match self {
            StepStatus::Pending => "🟡",
            StepStatus::Running => "🟢",
            StepStatus::Success => "✅",
            StepStatus::Failed => "❌",
            StepStatus::Unknown => "⚪",
        }
    }

    pub fn color(self) -> Color {
        match self {
            StepStatus::Pending => Color::Yellow,
            StepStatus::Running => Color::Blue,
            StepStatus::Success => Color::Green,
            StepStatus::Failed => Color::Red,
            StepStatus::Unknown => Color::Gray,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StepStatus::Pending => "PENDING",
            StepStatus::Running => "RUNNING",
            StepStatus::Success => "SUCCESS",
            StepStatus::Failed => "FAILED",
            StepStatus::Unknown => "UNKNOWN",
        }
    }
}

/// Elapsed whole seconds for a job or step.
///
/// `None` means not started. While running the end bound is the caller's
/// `now`; once completed the value freezes at `completed_at - started_at`.
/// Clock skew that would produce a negative duration clamps to zero.
pub fn elapsed_secs(
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<i64> {
    let start = started_at?;
    let end = completed_at.unwrap_or(now);
    Some((end - start).num_seconds().max(0))
}

/// "45s" / "Not started", matching the header and step cards.
pub fn format_duration(elapsed: Option<i64>) -> String {
    match elapsed {
        Some(secs) => format!("{secs}s"),
        None => "Not started".to_string(),
    }
}

/// The snapshot is only worth re-fetching while the job is in flight.
pub fn should_poll(status: JobStatus) -> bool {
    status == JobStatus::Running
}

/// Toggles `step_name` in the expanded-step set without mutating the input.
pub fn toggle_expansion(expanded: &HashSet<String>, step_name: &str) -> HashSet<String> {
    let mut next = expanded.clone();
    if !next.remove(step_name) {
        next.insert(step_name.to_string());
    }
    next
}

/// Short display name for a repository URL: the last two path segments with a
/// trailing `.git` stripped, e.g. `octocat/Hello-World`. The host never counts
/// as a segment. Garbage input degrades to whatever segments exist.
pub fn repo_display_name(url: &str) -> String {
    let (has_scheme, rest) = match url.split_once("://") {
        Some((_, rest)) => (true, rest),
        None => (false, url),
    };
    let mut segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    if has_scheme && !segments.is_empty() {
        segments.remove(0);
    }
    let tail = &segments[segments.len().saturating_sub(2)..];
    let name = tail.join("/");
    name.strip_suffix(".git").unwrap_or(&name).to_string()
}

/// Classification of a single log line for display coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogClass {
    Error,
    Warn,
    Success,
    Timestamp,
    Normal,
}

impl LogClass {
    pub fn color(self) -> Color {
        match self {
            LogClass::Error => Color::Red,
            LogClass::Warn => Color::Yellow,
            LogClass::Success => Color::Green,
            LogClass::Timestamp => Color::Blue,
            LogClass::Normal => Color::Gray,
        }
    }
}

/// Ordered substring rules, first match wins. Error markers outrank warnings,
/// warnings outrank success markers, and `[...]`-prefixed lines read as
/// timestamped output.
pub fn classify_log_line(line: &str) -> LogClass {
    if line.contains("ERROR") || line.contains("FAILED") || line.contains("failed") {
        LogClass::Error
    } else if line.contains("WARN") || line.contains("WARNING") {
        LogClass::Warn
    } else if line.contains("SUCCESS") || line.contains("completed successfully") {
        LogClass::Success
    } else if line.starts_with('[') && line.contains(']') {
        LogClass::Timestamp
    } else {
        LogClass::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Job, PipelineStep};
    use chrono::TimeZone;

    fn at(iso: &str) -> DateTime<Utc> {
        iso.parse().unwrap()
    }

    #[test]
    fn glyph_and_color_are_total_for_job_statuses() {
        for status in [
            JobStatus::Queued,
            JobStatus::Running,
            JobStatus::Done,
            JobStatus::Failed,
            JobStatus::Unknown,
        ] {
            assert!(!status.glyph().is_empty());
            assert!(!status.label().is_empty());
            // Color is an enum value, nothing to assert beyond it existing.
            let _ = status.color();
        }
    }

    #[test]
    fn glyph_and_color_are_total_for_step_statuses() {
        for status in [
            StepStatus::Pending,
            StepStatus::Running,
            StepStatus::Success,
            StepStatus::Failed,
            StepStatus::Unknown,
        ] {
            assert!(!status.glyph().is_empty());
            assert!(!status.label().is_empty());
            let _ = status.color();
        }
    }

    #[test]
    fn job_and_step_tables_are_independent() {
        assert_ne!(JobStatus::Queued.glyph(), StepStatus::Pending.glyph());
        assert_ne!(JobStatus::Running.glyph(), StepStatus::Running.glyph());
    }

    #[test]
    fn should_poll_only_while_running() {
        assert!(should_poll(JobStatus::Running));
        assert!(!should_poll(JobStatus::Queued));
        assert!(!should_poll(JobStatus::Done));
        assert!(!should_poll(JobStatus::Failed));
        assert!(!should_poll(JobStatus::Unknown));
    }

    #[test]
    fn elapsed_is_none_before_start() {
        let now = Utc.with_ymd_and_hms(2025, 7, 24, 15, 30, 0).unwrap();
        assert_eq!(elapsed_secs(None, Some(now), now), None);
        assert_eq!(format_duration(None), "Not started");
    }

    #[test]
    fn elapsed_freezes_at_completion_regardless_of_now() {
        let started = at("2025-07-24T15:24:05Z");
        let completed = at("2025-07-24T15:24:07Z");
        for now in ["2025-07-24T15:24:07Z", "2025-07-24T18:00:00Z"] {
            assert_eq!(
                elapsed_secs(Some(started), Some(completed), at(now)),
                Some(2)
            );
        }
    }

    #[test]
    fn elapsed_tracks_now_while_incomplete() {
        let started = at("2025-07-24T15:24:05Z");
        assert_eq!(
            elapsed_secs(Some(started), None, at("2025-07-24T15:24:09Z")),
            Some(4)
        );
        assert_eq!(
            elapsed_secs(Some(started), None, at("2025-07-24T15:24:10Z")),
            Some(5)
        );
    }

    #[test]
    fn skewed_clock_clamps_to_zero() {
        let started = at("2025-07-24T15:24:05Z");
        let completed = at("2025-07-24T15:24:03Z");
        assert_eq!(
            elapsed_secs(Some(started), Some(completed), at("2025-07-24T16:00:00Z")),
            Some(0)
        );
    }

    #[test]
    fn toggle_adds_then_removes_without_mutation() {
        let empty = HashSet::new();
        let with_build = toggle_expansion(&empty, "build");
        assert!(with_build.contains("build"));
        assert!(empty.is_empty());

        let back = toggle_expansion(&with_build, "build");
        assert!(back.is_empty());
        assert!(with_build.contains("build"));
    }

    #[test]
    fn repo_display_name_takes_owner_and_repo() {
        assert_eq!(
            repo_display_name("https://github.com/octocat/Hello-World.git"),
            "octocat/Hello-World"
        );
        assert_eq!(
            repo_display_name("https://github.com/octocat/Hello-World"),
            "octocat/Hello-World"
        );
    }

    #[test]
    fn repo_display_name_degrades_on_short_paths() {
        assert_eq!(repo_display_name("https://example.com/x.git"), "x");
        assert_eq!(repo_display_name("https://example.com"), "");
        assert_eq!(repo_display_name(""), "");
        assert_eq!(repo_display_name("not a url"), "not a url");
    }

    #[test]
    fn log_rules_apply_top_to_bottom_first_match_wins() {
        assert_eq!(classify_log_line("step FAILED with exit 1"), LogClass::Error);
        assert_eq!(classify_log_line("ERROR: boom"), LogClass::Error);
        assert_eq!(classify_log_line("WARN: flaky"), LogClass::Warn);
        assert_eq!(classify_log_line("SUCCESS"), LogClass::Success);
        assert_eq!(
            classify_log_line("Pipeline completed successfully!"),
            LogClass::Success
        );
        assert_eq!(
            classify_log_line("[2025-07-24 15:24:05] Starting job"),
            LogClass::Timestamp
        );
        assert_eq!(classify_log_line("Python 3.12.2"), LogClass::Normal);
        // A timestamped error line is still an error: error rule sits first.
        assert_eq!(
            classify_log_line("[2025-07-24 15:24:05] ERROR: boom"),
            LogClass::Error
        );
    }

    #[test]
    fn snapshot_progression_queued_to_done() {
        // queued: nothing started, no polling
        let mut job = Job {
            id: "8f27a832".into(),
            repo_url: "https://github.com/octocat/Hello-World.git".into(),
            branch: "main".into(),
            commit_sha: "abc123def456".into(),
            status: JobStatus::Queued,
            created_at: at("2025-07-24T15:24:00Z"),
            ..Default::default()
        };
        assert!(!should_poll(job.status));
        assert_eq!(
            elapsed_secs(job.started_at, job.completed_at, at("2025-07-24T15:24:02Z")),
            None
        );

        // running: polling on, duration ticks with now
        job.status = JobStatus::Running;
        job.started_at = Some(at("2025-07-24T15:24:05Z"));
        job.steps.push(PipelineStep {
            name: "check_python".into(),
            run: "python --version".into(),
            status: StepStatus::Running,
            started_at: Some(at("2025-07-24T15:24:06Z")),
            ..Default::default()
        });
        assert!(should_poll(job.status));
        assert_eq!(
            elapsed_secs(job.started_at, job.completed_at, at("2025-07-24T15:24:09Z")),
            Some(4)
        );
        assert_eq!(
            elapsed_secs(job.started_at, job.completed_at, at("2025-07-24T15:24:11Z")),
            Some(6)
        );

        // done: polling off, duration frozen
        job.status = JobStatus::Done;
        job.completed_at = Some(at("2025-07-24T15:24:50Z"));
        assert!(!should_poll(job.status));
        assert!(job.status.is_terminal());
        assert_eq!(
            elapsed_secs(job.started_at, job.completed_at, at("2025-07-24T18:00:00Z")),
            Some(45)
        );
    }
}
