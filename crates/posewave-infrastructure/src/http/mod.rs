mod classifier;
mod data_service;

pub use classifier::HttpPoseClassifier;
pub use data_service::DataServiceClient;

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

pub(crate) const USER_AGENT: &str = concat!("PoseWave/", env!("CARGO_PKG_VERSION"));

/// Client for request/response calls, bounded by a total timeout.
pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")
}

/// Client for long-lived change streams: connect timeout only, the body is
/// expected to stay open indefinitely.
pub(crate) fn build_stream_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(10))
        .build()
        .context("Failed to create streaming HTTP client")
}
