use anyhow::{bail, Result};
use log::{debug, error, info};
use rptz::camera_config::Protocol;
use rptz::cli;
use rptz::common::logging_setup;
use rptz::config_loader::{self, DEFAULT_CONFIG_PATH};
use rptz::operations;
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<()> {
    let main_start_time = Instant::now();
    // Parse CLI arguments early for potential use in logging or config path
    let matches = cli::build_cli().get_matches();

    let explicit_config = matches.get_one::<String>("config").map(|s| s.as_str());
    let config_path = explicit_config.unwrap_or(DEFAULT_CONFIG_PATH);

    let config_load_start_time = Instant::now();
    let mut master_config = match config_loader::load_config(config_path, explicit_config.is_some()) {
        Ok(cfg) => {
            logging_setup::initialize_logging(Some(&cfg), &matches);
            info!("✅ Configuration loaded from: {} in {:?}", config_path, config_load_start_time.elapsed());
            cfg
        }
        Err(e) => {
            logging_setup::initialize_logging(None, &matches);
            error!("❌ Failed to load master configuration from '{}': {:#}. Exiting.", config_path, e);
            return Err(e.context(format!("Failed to load master configuration from '{}'", config_path)));
        }
    };

    if let Some(protocol) = matches.get_one::<String>("protocol") {
        let protocol: Protocol = protocol.parse()?;
        debug!("Active protocol overridden on the command line: {}", protocol);
        master_config.camera.protocol = protocol;
    }

    info!(
        "🚀 RPTZ starting for camera {} (active protocol: {}).",
        master_config.camera.host, master_config.camera.protocol
    );

    if let Some((operation_name, sub_matches)) = matches.subcommand() {
        debug!("🎬 Dispatching to subcommand: {}", operation_name);
        let op_start_time = Instant::now();

        let op_result: Result<()> = match operation_name {
            "move" => operations::move_op::handle_move_cli(&master_config, sub_matches).await,
            "session" => operations::session_op::handle_session_cli(&master_config).await,
            "config" => operations::config_op::handle_show_config_cli(&master_config),
            "test" => operations::diagnostic_op::handle_diagnostic_cli(&master_config).await,
            _ => bail!("Subcommand '{}' not implemented.", operation_name),
        };

        if let Err(e) = op_result {
            error!("❌ Operation '{}' failed after {:?}: {:#}", operation_name, op_start_time.elapsed(), e);
            return Err(e);
        }
        info!("✅ Operation '{}' completed in {:?}.", operation_name, op_start_time.elapsed());
    } else {
        info!("🤔 No subcommand provided. Try `rptz move --command home` or `rptz --help`.");
    }

    info!("🏁 RPTZ finished in {:?}.", main_start_time.elapsed());
    Ok(())
}
