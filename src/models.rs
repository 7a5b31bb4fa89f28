use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall job lifecycle. Progression is `Queued -> Running -> Done | Failed`;
/// terminal states never transition again. The server owns the transitions,
/// this side only renders whatever the latest snapshot says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Queued,
    Running,
    Done,
    Failed,
    /// Fallback for statuses this client does not know about yet.
    #[serde(other)]
    Unknown,
}

/// Per-step lifecycle, same shape as [`JobStatus`] but an independent
/// vocabulary (`pending -> running -> success | failed`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Pending,
    Running,
    Success,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Job {
    pub id: String,
    pub repo_url: String,
    pub branch: String,
    pub commit_sha: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Whole-job log lines, append-only on the server side.
    #[serde(default)]
    pub logs: Vec<String>,
    /// Steps in execution order; the order is significant for the timeline.
    #[serde(default)]
    pub steps: Vec<PipelineStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PipelineStep {
    /// Unique within a job's step list; the stable key for expand/collapse.
    pub name: String,
    /// Command text of the step, displayed verbatim.
    pub run: String,
    pub status: StepStatus,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// List-view projection returned by `GET /jobs`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JobSummary {
    pub id: String,
    pub repo_name: String,
    pub branch: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    /// Duration in whole seconds, present once the job is terminal.
    #[serde(default)]
    pub duration: Option<u64>,
}
