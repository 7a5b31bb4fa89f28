use crate::mock::MockSource;
use crate::models::{Job, JobSummary};
use anyhow::Result;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A missing job is a distinct display state, not a generic fetch failure;
/// everything else keeps the previous snapshot on screen.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("http error {status}: {message}")]
    Http { status: StatusCode, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response shape")]
    Unexpected,
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(url));
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let message = resp
                .text()
                .await
                .unwrap_or_else(|_| "request failed".to_string());
            return Err(ApiError::Http { status, message });
        }
        resp.json::<T>().await.map_err(|_| ApiError::Unexpected)
    }

    pub async fn jobs(&self) -> Result<Vec<JobSummary>, ApiError> {
        self.get("/jobs").await
    }

    pub async fn job(&self, job_id: &str) -> Result<Job, ApiError> {
        self.get(&format!("/jobs/{job_id}")).await
    }

    pub async fn job_logs(&self, job_id: &str) -> Result<Vec<String>, ApiError> {
        self.get(&format!("/jobs/{job_id}/logs")).await
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Where snapshots come from: the live API, or canned data when running
/// without a server.
#[derive(Clone)]
pub enum JobSource {
    Api(ApiClient),
    Mock(MockSource),
}

impl JobSource {
    pub async fn jobs(&self) -> Result<Vec<JobSummary>, ApiError> {
        match self {
            JobSource::Api(client) => client.jobs().await,
            JobSource::Mock(mock) => mock.jobs(),
        }
    }

    pub async fn job(&self, job_id: &str) -> Result<Job, ApiError> {
        match self {
            JobSource::Api(client) => client.job(job_id).await,
            JobSource::Mock(mock) => mock.job(job_id),
        }
    }

    pub async fn job_logs(&self, job_id: &str) -> Result<Vec<String>, ApiError> {
        match self {
            JobSource::Api(client) => client.job_logs(job_id).await,
            JobSource::Mock(mock) => mock.job_logs(job_id),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            JobSource::Api(client) => client.base_url().to_string(),
            JobSource::Mock(_) => "mock data".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8080/api/".to_string()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api");
    }

    #[test]
    fn not_found_is_distinguishable() {
        let err = ApiError::NotFound("http://localhost:8080/api/jobs/nope".into());
        assert!(err.is_not_found());
        let err = ApiError::Http {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".into(),
        };
        assert!(!err.is_not_found());
    }
}
