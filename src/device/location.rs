use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::GeolocationSample;

/// One-shot platform geolocation query
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> AppResult<GeolocationSample>;
}

/// Caches the last good sample; a failed re-probe keeps the previous one.
pub struct LocationProbe {
    provider: Arc<dyn LocationProvider>,
    last: Option<GeolocationSample>,
}

impl LocationProbe {
    pub fn new(provider: Arc<dyn LocationProvider>) -> Self {
        Self {
            provider,
            last: None,
        }
    }

    pub fn sample(&self) -> Option<&GeolocationSample> {
        self.last.as_ref()
    }

    /// Return the cached sample, querying the device only when there is none
    pub async fn probe(&mut self) -> AppResult<GeolocationSample> {
        match &self.last {
            Some(sample) => Ok(sample.clone()),
            None => self.reprobe().await,
        }
    }

    pub async fn reprobe(&mut self) -> AppResult<GeolocationSample> {
        let sample = self.provider.current_position().await.inspect_err(|e| {
            log::warn!("Location probe failed: {}", e);
        })?;

        if !sample.is_valid() {
            log::warn!(
                "Discarding out-of-range location {},{}",
                sample.latitude,
                sample.longitude
            );
            return Err(AppError::DeviceUnavailable(
                "location service returned invalid coordinates".to_string(),
            ));
        }

        log::debug!("Location acquired: {}", sample.to_form_value());
        self.last = Some(sample.clone());
        Ok(sample)
    }
}
