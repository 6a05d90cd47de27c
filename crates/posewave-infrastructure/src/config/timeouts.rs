use std::time::Duration;

/// Configuration for various timeout durations across the application
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// General HTTP request timeout (account & data service)
    pub http_request: Duration,

    /// Per-frame classification request timeout; a slow classifier must
    /// never hold the capture loop for a full round
    pub classifier_request: Duration,

    /// Database query timeout
    pub db_query: Duration,

    /// Wait before re-opening a dropped change-stream connection
    pub subscribe_reconnect: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            http_request: Duration::from_secs(30),
            classifier_request: Duration::from_secs(8),
            db_query: Duration::from_secs(10),
            subscribe_reconnect: Duration::from_secs(5),
        }
    }
}

impl TimeoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the global timeout configuration
    pub fn global() -> &'static Self {
        &GLOBAL_TIMEOUT_CONFIG
    }
}

/// Global timeout configuration instance
static GLOBAL_TIMEOUT_CONFIG: TimeoutConfig = TimeoutConfig {
    http_request: Duration::from_secs(30),
    classifier_request: Duration::from_secs(8),
    db_query: Duration::from_secs(10),
    subscribe_reconnect: Duration::from_secs(5),
};
