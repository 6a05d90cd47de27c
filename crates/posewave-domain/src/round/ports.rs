use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::shared::DomainError;

/// One captured camera frame, ready for upload.
#[derive(Debug, Clone)]
pub struct Frame {
    bytes: Vec<u8>,
    mime_type: String,
}

impl Frame {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self::new(bytes, "image/jpeg")
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

/// What the classifier said about one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub pose_class: String,
    pub confidence_score: f64,
}

/// Port onto the pose-classification service.
///
/// Failures mean "no classification this frame"; the round never stops for
/// them and no retry is attempted.
#[async_trait]
pub trait PoseClassifier: Send + Sync {
    async fn classify(&self, frame: &Frame) -> Result<Classification, DomainError>;
}

/// Port onto the camera.
///
/// `Ok(None)` means the device is not ready yet; the capture loop skips the
/// frame and tries again on the next interval.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn capture_frame(&self) -> Result<Option<Frame>, DomainError>;
}
