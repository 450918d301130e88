use crate::config_loader::MasterConfig;
use crate::core::{CameraConfigStore, Dispatcher};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Builds the shared configuration store and dispatcher every operation runs against.
pub fn build_dispatcher(master_config: &MasterConfig) -> Result<Arc<Dispatcher>> {
    let start_time = Instant::now();
    let store = Arc::new(CameraConfigStore::new(master_config.camera.clone()));
    let dispatcher = Dispatcher::new(store, &master_config.app_settings)
        .context("Failed to initialize protocol adapters")?;
    info!(
        "🛠️ Dispatcher ready for {} (active protocol: {}) in {:?}.",
        master_config.camera.host,
        master_config.camera.protocol,
        start_time.elapsed()
    );
    Ok(Arc::new(dispatcher))
}

/// Serializes `value` as a single JSON line for stdout consumers.
pub fn to_json_line<T: Serialize>(value: &T) -> Result<String> {
    let line = serde_json::to_string(value).context("Failed to serialize response as JSON")?;
    debug!("→ {}", line);
    Ok(line)
}
