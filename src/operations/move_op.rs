use crate::config_loader::MasterConfig;
use crate::operations::op_helper::{build_dispatcher, to_json_line};
use crate::ptz::{MotionIntent, Outcome};
use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use log::{debug, error, info, warn};
use std::time::Instant;

pub fn intent_from_args(args: &ArgMatches) -> MotionIntent {
    MotionIntent {
        command: args.get_one::<String>("command").cloned(),
        pan: args.get_one::<f64>("pan").copied(),
        tilt: args.get_one::<f64>("tilt").copied(),
        zoom: args.get_one::<f64>("zoom").copied(),
    }
}

pub async fn handle_move_cli(master_config: &MasterConfig, args: &ArgMatches) -> Result<()> {
    let op_start_time = Instant::now();
    let intent = intent_from_args(args);
    debug!("Move intent from CLI: {:?}", intent);

    let dispatcher = build_dispatcher(master_config)?;
    let result = dispatcher
        .dispatch(&intent)
        .await
        .context("Motion command was rejected")?;

    println!("{}", to_json_line(&result)?);

    match result.outcome {
        Outcome::Sent => {
            info!("✅ Command sent via {} in {:?}.", result.protocol_used, op_start_time.elapsed());
            Ok(())
        }
        Outcome::Idle => {
            warn!("💤 Nothing sent via {}: {}", result.protocol_used, result.detail.as_deref().unwrap_or("idle"));
            Ok(())
        }
        Outcome::Error => {
            error!("❌ Command did not reach the camera after {:?}.", op_start_time.elapsed());
            bail!(
                "{} dispatch failed: {}",
                result.protocol_used,
                result.detail.unwrap_or_default()
            )
        }
    }
}
