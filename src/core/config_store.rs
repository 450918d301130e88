use crate::camera_config::{CameraConfigUpdate, CameraConfiguration};
use crate::errors::AppError;
use log::{debug, info};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Holds the live camera configuration.
///
/// Readers get an `Arc` snapshot that never changes underneath them; updates build a
/// new configuration and swap it in under the write lock, so no reader can observe a
/// half-applied update.
pub struct CameraConfigStore {
    current: RwLock<Arc<CameraConfiguration>>,
}

impl CameraConfigStore {
    pub fn new(initial: CameraConfiguration) -> Self {
        CameraConfigStore {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    pub async fn get(&self) -> Arc<CameraConfiguration> {
        Arc::clone(&*self.current.read().await)
    }

    /// Applies only the supplied fields and returns the new full configuration.
    /// On error (unknown protocol) the stored configuration is left as it was.
    pub async fn update(&self, update: &CameraConfigUpdate) -> Result<Arc<CameraConfiguration>, AppError> {
        let mut guard = self.current.write().await;
        let next = Arc::new(guard.merged(update)?);
        if next.protocol != guard.protocol {
            info!("🔀 Active protocol switched from {} to {}.", guard.protocol, next.protocol);
        }
        debug!("Camera configuration updated: host={} protocol={}", next.host, next.protocol);
        *guard = Arc::clone(&next);
        Ok(next)
    }
}
