use crate::adapters::AdapterSet;
use crate::app_config::ApplicationConfig;
use crate::camera_config::CameraConfiguration;
use crate::core::config_store::CameraConfigStore;
use crate::errors::AppError;
use crate::ptz::{normalize, DispatchResult, MotionIntent};
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

/// Routes motion intents to the adapter for the active protocol.
///
/// Dispatches are independent: nothing is queued or ordered, and concurrent calls may
/// overlap freely. When two moves race, whichever reaches the device last takes effect.
/// There is no retry and no fallback to another protocol.
pub struct Dispatcher {
    store: Arc<CameraConfigStore>,
    adapters: AdapterSet,
}

impl Dispatcher {
    pub fn new(store: Arc<CameraConfigStore>, app: &ApplicationConfig) -> Result<Self, AppError> {
        Ok(Dispatcher {
            store,
            adapters: AdapterSet::new(app)?,
        })
    }

    pub fn store(&self) -> &Arc<CameraConfigStore> {
        &self.store
    }

    /// Normalizes `input` and hands it to the active adapter.
    ///
    /// `Err` is reserved for caller mistakes (`InvalidCommand`); every transport problem
    /// comes back as a result with `outcome: error`.
    pub async fn dispatch(&self, input: &MotionIntent) -> Result<DispatchResult, AppError> {
        // One snapshot for the whole dispatch; later updates do not affect this call.
        let config = self.store.get().await;
        self.dispatch_with(config, input).await
    }

    /// Same as [`Dispatcher::dispatch`] against a snapshot the caller already took.
    pub async fn dispatch_with(
        &self,
        config: Arc<CameraConfiguration>,
        input: &MotionIntent,
    ) -> Result<DispatchResult, AppError> {
        let start = Instant::now();
        let command = normalize(input)?;

        if command.is_idle() {
            debug!("💤 Idle motion intent, no adapter invoked ({}).", config.protocol);
            return Ok(DispatchResult::idle(config.protocol));
        }

        let adapter = self.adapters.select(config.protocol);
        debug!("🎯 Dispatching '{}' via {}.", command, adapter.protocol());
        let result = adapter.execute(&command, &config).await;
        info!(
            "📡 '{}' via {} -> {} in {:?}.",
            command,
            result.protocol_used,
            result.outcome,
            start.elapsed()
        );
        Ok(result)
    }
}
