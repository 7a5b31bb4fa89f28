mod api;
mod app;
mod mock;
mod models;
mod state;
mod ui;
mod view;

use anyhow::Result;
use api::{ApiClient, JobSource};
use app::App;
use mock::MockSource;
use std::env;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .try_init();

    let api_base =
        env::var("JOBDASH_API_BASE").unwrap_or_else(|_| "http://localhost:8080/api".to_string());
    let refresh_secs = env::var("JOBDASH_REFRESH_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(2);
    let use_mock = env::var("JOBDASH_MOCK")
        .map(|v| v != "0" && v.to_lowercase() != "false")
        .unwrap_or(false);
    let initial_job = env::var("JOBDASH_JOB_ID").ok();

    let source = if use_mock {
        JobSource::Mock(MockSource::new()?)
    } else {
        JobSource::Api(ApiClient::new(api_base)?)
    };
    let mut app = App::new(source, Duration::from_secs(refresh_secs));
    app.run(initial_job).await
}
