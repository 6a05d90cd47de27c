mod timeouts;

use std::path::PathBuf;

pub use timeouts::TimeoutConfig;

/// Endpoints and paths, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL of the account & data service.
    pub data_service_url: String,
    /// Pose-classification endpoint (multipart upload).
    pub classifier_url: String,
    /// SQLite file backing the on-device cache.
    pub local_db_path: PathBuf,
    /// Directory for rotated log files.
    pub log_dir: PathBuf,
}

impl ServiceConfig {
    pub const DATA_URL_VAR: &'static str = "POSEWAVE_DATA_URL";
    pub const CLASSIFIER_URL_VAR: &'static str = "POSEWAVE_CLASSIFIER_URL";
    pub const DB_PATH_VAR: &'static str = "POSEWAVE_DB_PATH";

    /// Environment overrides on top of platform defaults.
    pub fn from_env() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("posewave");

        Self {
            data_service_url: std::env::var(Self::DATA_URL_VAR)
                .unwrap_or_else(|_| "https://posewave-data.example.app".to_string()),
            classifier_url: std::env::var(Self::CLASSIFIER_URL_VAR)
                .unwrap_or_else(|_| "https://posewave-classify.example.app/predict".to_string()),
            local_db_path: std::env::var(Self::DB_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join("posewave.db")),
            log_dir: data_dir.join("logs"),
        }
    }
}
