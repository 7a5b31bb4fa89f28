//! Canned fixtures for running the dashboard without a server.
//!
//! The data goes through the same serde model as live responses, so mock mode
//! exercises the exact wire shapes the API serves.

use crate::api::ApiError;
use crate::models::{Job, JobSummary};
use anyhow::Result;
use serde_json::json;

#[derive(Clone)]
pub struct MockSource {
    summaries: Vec<JobSummary>,
    detail: Job,
}

impl MockSource {
    pub fn new() -> Result<Self> {
        let summaries = serde_json::from_value(json!([
            {
                "id": "8f27a832",
                "repo_name": "octocat/Hello-World",
                "branch": "main",
                "status": "running",
                "created_at": "2025-07-24T15:24:00Z"
            },
            {
                "id": "443656dc",
                "repo_name": "user/test-repo",
                "branch": "feature/new-api",
                "status": "queued",
                "created_at": "2025-07-24T15:30:00Z"
            },
            {
                "id": "1b428ada",
                "repo_name": "company/backend",
                "branch": "main",
                "status": "failed",
                "created_at": "2025-07-24T15:25:00Z",
                "duration": 120
            }
        ]))?;
        let detail = serde_json::from_value(json!({
            "id": "8f27a832",
            "repo_url": "https://github.com/octocat/Hello-World.git",
            "branch": "main",
            "commit_sha": "abc123def456",
            "status": "running",
            "created_at": "2025-07-24T15:24:00Z",
            "started_at": "2025-07-24T15:24:05Z",
            "logs": [
                "[2025-07-24 15:24:05] Starting job for https://github.com/octocat/Hello-World.git@main",
                "[2025-07-24 15:24:05] Security scan: 0 issues found, Risk: LOW",
                "[2025-07-24 15:24:06] Pipeline loaded with 3 steps"
            ],
            "steps": [
                {
                    "name": "check_python",
                    "run": "python --version",
                    "status": "success",
                    "logs": ["Python 3.12.2"],
                    "started_at": "2025-07-24T15:24:06Z",
                    "completed_at": "2025-07-24T15:24:06Z"
                },
                {
                    "name": "list_files",
                    "run": "ls -la",
                    "status": "running",
                    "logs": [
                        "total 12",
                        "drwxr-xr-x 2 ci ci 4096 Jul 24 15:24 .",
                        "-rw-r--r-- 1 ci ci 1234 Jul 24 15:24 README.md"
                    ],
                    "started_at": "2025-07-24T15:24:07Z"
                },
                {
                    "name": "test_echo",
                    "run": "echo \"Pipeline completed successfully!\"",
                    "status": "pending",
                    "logs": []
                }
            ]
        }))?;
        Ok(Self { summaries, detail })
    }

    pub fn jobs(&self) -> Result<Vec<JobSummary>, ApiError> {
        Ok(self.summaries.clone())
    }

    pub fn job(&self, job_id: &str) -> Result<Job, ApiError> {
        if job_id == self.detail.id {
            Ok(self.detail.clone())
        } else {
            Err(ApiError::NotFound(format!("jobs/{job_id}")))
        }
    }

    pub fn job_logs(&self, job_id: &str) -> Result<Vec<String>, ApiError> {
        self.job(job_id).map(|job| job.logs)
    }
}
