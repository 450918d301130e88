use crate::app_config::ApplicationConfig;
use crate::camera_config::{CameraConfiguration, Protocol};
use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Instant;

pub const DEFAULT_CONFIG_PATH: &str = "config/rptz.yaml";

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct MasterConfig {
    #[serde(rename = "application")]
    pub app_settings: ApplicationConfig,
    pub camera: CameraConfiguration,
}

/// Loads the YAML configuration, applies `CAMERA_*` environment overrides and validates.
///
/// A missing file at the default location is not an error: built-in defaults are used
/// instead. A path the operator named explicitly must exist and parse.
pub fn load_config(path: &str, explicit: bool) -> Result<MasterConfig> {
    debug!("📄 Attempting to load config from: {}", path);
    let start_time = Instant::now();

    let mut config = if !explicit && !Path::new(path).exists() {
        info!("ℹ️ No configuration file at '{}', using built-in defaults.", path);
        MasterConfig::default()
    } else {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file '{}'. 📖", path))?;
        debug!("Read config file in {:?}", start_time.elapsed());
        parse_config(&config_str)
            .with_context(|| format!("Failed to parse YAML configuration from '{}'. 💔", path))?
    };

    apply_env_overrides(&mut config, |key| env::var(key).ok())?;

    validate_master_config(&config).with_context(|| "Master configuration validation failed 👎")?;

    info!("✅ Configuration ready from '{}' in {:?}", path, start_time.elapsed());
    Ok(config)
}

pub fn parse_config(config_str: &str) -> Result<MasterConfig> {
    let parse_start_time = Instant::now();
    let config: MasterConfig = serde_yaml::from_str(config_str)?;
    debug!("Parsed YAML in {:?}", parse_start_time.elapsed());
    Ok(config)
}

/// Overrides camera fields from `CAMERA_IP`, `CAMERA_PORT`, `CAMERA_USER`, `CAMERA_PASS`
/// and `CAMERA_PROTOCOL`. `lookup` is injectable so tests do not touch the process env.
pub fn apply_env_overrides<F>(config: &mut MasterConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let camera = &mut config.camera;
    if let Some(host) = lookup("CAMERA_IP") {
        debug!("CAMERA_IP overrides host: {}", host);
        camera.host = host;
    }
    if let Some(port) = lookup("CAMERA_PORT") {
        camera.http_port = port
            .parse()
            .with_context(|| format!("CAMERA_PORT '{}' is not a valid port", port))?;
    }
    // An empty value clears the credential instead of sending an empty one.
    if let Some(user) = lookup("CAMERA_USER") {
        camera.username = Some(user).filter(|u| !u.is_empty());
    }
    if let Some(pass) = lookup("CAMERA_PASS") {
        camera.password = Some(pass).filter(|p| !p.is_empty());
    }
    if let Some(protocol) = lookup("CAMERA_PROTOCOL") {
        camera.protocol = protocol.parse::<Protocol>()?;
    }
    Ok(())
}

pub fn validate_master_config(config: &MasterConfig) -> Result<()> {
    debug!("🕵️ Validating master configuration...");
    let app = &config.app_settings;
    let camera = &config.camera;

    if camera.host.trim().is_empty() {
        bail!("❌ Camera host cannot be empty.");
    }
    for (name, port) in [
        ("http_port", camera.http_port),
        ("onvif_port", camera.onvif_port),
        ("visca_port", camera.visca_port),
    ] {
        if port == 0 {
            bail!("❌ Camera {} cannot be 0.", name);
        }
    }
    if app.request_timeout_ms == 0 {
        bail!("❌ request_timeout_ms must be greater than 0.");
    }
    if app.visca_linger_ms >= app.request_timeout_ms {
        bail!(
            "❌ visca_linger_ms ({}) must be shorter than request_timeout_ms ({}).",
            app.visca_linger_ms,
            app.request_timeout_ms
        );
    }
    if app.onvif_profile_token.trim().is_empty() {
        bail!("❌ onvif_profile_token cannot be empty.");
    }
    for (name, path) in [
        ("onvif_service_path", &app.onvif_service_path),
        ("cgi_control_path", &app.cgi_control_path),
    ] {
        if !path.starts_with('/') {
            bail!("❌ {} '{}' must start with '/'.", name, path);
        }
    }
    if camera.username.is_some() != camera.password.is_some() {
        warn!("⚠️ Only one of username/password is set; requests will be sent without authentication.");
    }
    Ok(())
}
