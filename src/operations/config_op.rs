use crate::config_loader::MasterConfig;
use anyhow::{Context, Result};
use log::info;

pub fn render_effective_config(master_config: &MasterConfig) -> Result<String> {
    let mut shown = master_config.clone();
    shown.camera = shown.camera.masked();
    serde_yaml::to_string(&shown).context("Failed to render configuration as YAML")
}

pub fn handle_show_config_cli(master_config: &MasterConfig) -> Result<()> {
    let rendered = render_effective_config(master_config)?;
    print!("{}", rendered);
    info!(
        "📄 Active protocol: {} ({} credentials).",
        master_config.camera.protocol,
        if master_config.camera.credentials().is_some() { "with" } else { "without" }
    );
    Ok(())
}
