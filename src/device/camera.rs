use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

/// Hardware tracks handed out by one successful [`CameraDevice::open`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHandle {
    pub stream_id: u64,
    pub track_ids: Vec<u32>,
}

/// Platform camera access. Implementations bind the opened stream to their
/// own render target; this core only needs frames and the tracks to stop.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Request exclusive access to one video input.
    /// Denied or absent hardware is `AppError::DeviceUnavailable`.
    async fn open(&self) -> AppResult<StreamHandle>;

    /// Rasterize the frame currently shown on `stream` as JPEG
    fn grab_jpeg(&self, stream: &StreamHandle, quality: u8) -> AppResult<Vec<u8>>;

    fn stop_track(&self, stream: &StreamHandle, track_id: u32);
}

/// One snapshot, owned by the capture session until it is verified and
/// submitted, retaken, or rejected.
#[derive(Clone, PartialEq)]
pub struct CapturedPhoto {
    id: Uuid,
    jpeg: Vec<u8>,
    preview: String,
    captured_at: DateTime<Utc>,
}

impl CapturedPhoto {
    pub fn from_jpeg(jpeg: Vec<u8>) -> AppResult<Self> {
        if jpeg.len() < JPEG_SOI.len() || jpeg[..2] != JPEG_SOI {
            return Err(AppError::DeviceUnavailable(
                "camera returned a frame that is not JPEG".to_string(),
            ));
        }

        let preview = format!("data:image/jpeg;base64,{}", STANDARD.encode(&jpeg));
        Ok(Self {
            id: Uuid::new_v4(),
            jpeg,
            preview,
            captured_at: Utc::now(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Upload payload
    pub fn jpeg(&self) -> &[u8] {
        &self.jpeg
    }

    /// `data:` URL for display
    pub fn preview(&self) -> &str {
        &self.preview
    }

    pub fn len(&self) -> usize {
        self.jpeg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jpeg.is_empty()
    }
}

// Keep image bytes out of logs and panic messages
impl std::fmt::Debug for CapturedPhoto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedPhoto")
            .field("id", &self.id)
            .field("bytes", &self.jpeg.len())
            .field("captured_at", &self.captured_at)
            .finish()
    }
}

/// Exclusive owner of the camera stream for one acquire/release cycle
pub struct CameraCapture {
    device: Arc<dyn CameraDevice>,
    active: Option<StreamHandle>,
    jpeg_quality: u8,
}

impl CameraCapture {
    pub fn new(device: Arc<dyn CameraDevice>, jpeg_quality: u8) -> Self {
        Self {
            device,
            active: None,
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Start the camera, stopping any stream this capture already holds first
    pub async fn acquire(&mut self) -> AppResult<()> {
        if self.active.is_some() {
            log::debug!("Camera already active, restarting stream");
            self.release();
        }

        let stream = self.device.open().await.inspect_err(|e| {
            log::warn!("Camera acquisition failed: {}", e);
        })?;

        log::info!(
            "Camera stream {} acquired with {} track(s)",
            stream.stream_id,
            stream.track_ids.len()
        );
        self.active = Some(stream);
        Ok(())
    }

    pub fn capture_frame(&self) -> AppResult<CapturedPhoto> {
        let stream = self
            .active
            .as_ref()
            .ok_or_else(|| AppError::DeviceUnavailable("camera is not active".to_string()))?;

        let jpeg = self.device.grab_jpeg(stream, self.jpeg_quality)?;
        let photo = CapturedPhoto::from_jpeg(jpeg)?;
        log::debug!("Captured frame {} ({} bytes)", photo.id(), photo.len());
        Ok(photo)
    }

    /// Stop every track of the current stream. Returns how many were stopped;
    /// calling it with no active stream is a no-op.
    pub fn release(&mut self) -> usize {
        let Some(stream) = self.active.take() else {
            return 0;
        };

        for track_id in &stream.track_ids {
            self.device.stop_track(&stream, *track_id);
        }

        log::info!(
            "Camera stream {} released ({} track(s) stopped)",
            stream.stream_id,
            stream.track_ids.len()
        );
        stream.track_ids.len()
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        self.release();
    }
}
