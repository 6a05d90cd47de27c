use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use posewave_domain::round::{Frame, FrameSource};
use posewave_domain::shared::DomainError;

/// Wraps a camera device so only one capture session can hold it at a time.
///
/// The active round screen owns the device through a [`CameraLease`];
/// dropping the lease (round teardown) releases it before any navigation
/// completes.
pub struct ExclusiveCamera {
    device: Arc<dyn FrameSource>,
    in_use: Arc<AtomicBool>,
}

impl ExclusiveCamera {
    pub fn new(device: Arc<dyn FrameSource>) -> Self {
        Self {
            device,
            in_use: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn acquire(&self) -> Result<CameraLease, DomainError> {
        if self.in_use.swap(true, Ordering::AcqRel) {
            return Err(DomainError::Infrastructure(
                "Camera is already owned by an active capture session".to_string(),
            ));
        }

        Ok(CameraLease {
            device: self.device.clone(),
            in_use: self.in_use.clone(),
        })
    }

    pub fn is_in_use(&self) -> bool {
        self.in_use.load(Ordering::Acquire)
    }
}

/// Stand-in device for hosts that have not wired a real camera yet:
/// reports "not ready" for every frame, so the capture loop idles.
pub struct NullCamera;

#[async_trait]
impl FrameSource for NullCamera {
    async fn capture_frame(&self) -> Result<Option<Frame>, DomainError> {
        Ok(None)
    }
}

/// Exclusive handle onto the camera; frames can only be captured through a
/// live lease.
pub struct CameraLease {
    device: Arc<dyn FrameSource>,
    in_use: Arc<AtomicBool>,
}

impl Drop for CameraLease {
    fn drop(&mut self) {
        self.in_use.store(false, Ordering::Release);
    }
}

#[async_trait]
impl FrameSource for CameraLease {
    async fn capture_frame(&self) -> Result<Option<Frame>, DomainError> {
        self.device.capture_frame().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubDevice;

    #[async_trait]
    impl FrameSource for StubDevice {
        async fn capture_frame(&self) -> Result<Option<Frame>, DomainError> {
            Ok(Some(Frame::jpeg(vec![0xff, 0xd8])))
        }
    }

    #[tokio::test]
    async fn test_single_lease_at_a_time() {
        let camera = ExclusiveCamera::new(Arc::new(StubDevice));

        let lease = camera.acquire().expect("first acquire succeeds");
        assert!(camera.is_in_use());
        assert!(camera.acquire().is_err());

        drop(lease);
        assert!(!camera.is_in_use());
        assert!(camera.acquire().is_ok());
    }

    #[tokio::test]
    async fn test_lease_captures_frames() {
        let camera = ExclusiveCamera::new(Arc::new(StubDevice));
        let lease = camera.acquire().unwrap();
        let frame = lease.capture_frame().await.unwrap().unwrap();
        assert_eq!(frame.mime_type(), "image/jpeg");
    }
}
