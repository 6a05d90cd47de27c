use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use posewave_domain::round::{Classification, Frame, PoseClassifier};
use posewave_domain::shared::DomainError;

use crate::config::TimeoutConfig;

/// HTTP implementation of the pose-classifier port.
///
/// One multipart upload per frame, no authentication, no retry: a failed or
/// malformed response is simply "no classification this frame" and the
/// round carries on.
pub struct HttpPoseClassifier {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct ClassifierResponse {
    pose_class: String,
    confidence_score: f64,
}

impl HttpPoseClassifier {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, DomainError> {
        let client = crate::http::build_client(TimeoutConfig::global().classifier_request)
            .map_err(|e| DomainError::Infrastructure(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl PoseClassifier for HttpPoseClassifier {
    async fn classify(&self, frame: &Frame) -> Result<Classification, DomainError> {
        let failed = |e: &dyn std::fmt::Display| DomainError::ClassificationFailed(e.to_string());

        let part = Part::bytes(frame.bytes().to_vec())
            .file_name("frame.jpg")
            .mime_str(frame.mime_type())
            .map_err(|e| failed(&e))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| failed(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::ClassificationFailed(format!(
                "Classifier returned status {}",
                status
            )));
        }

        let body: ClassifierResponse = response.json().await.map_err(|e| failed(&e))?;

        Ok(Classification {
            pose_class: body.pose_class,
            confidence_score: body.confidence_score,
        })
    }
}
