use crate::config_loader::MasterConfig;
use env_logger::Builder;
use log::LevelFilter;

/// Resolves the level from the `--debug` flag, then the config file, then `info`.
pub fn resolve_level(config: Option<&MasterConfig>, debug_flag: bool) -> LevelFilter {
    let log_level_str = if debug_flag {
        "debug".to_string()
    } else {
        config
            .and_then(|c| c.app_settings.log_level.clone())
            .unwrap_or_else(|| "info".to_string())
    };

    match log_level_str.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        s => {
            eprintln!("Unrecognized log level '{}', defaulting to info.", s);
            LevelFilter::Info
        }
    }
}

pub fn initialize_logging(config: Option<&MasterConfig>, cli_matches: &clap::ArgMatches) {
    let mut builder = Builder::new();
    builder.filter_level(resolve_level(config, cli_matches.get_flag("debug")));
    // RUST_LOG still refines individual modules, e.g. RUST_LOG=rptz::adapters=trace
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    // Logs go to stderr so stdout stays clean JSON for `move` and `session`.
    builder.target(env_logger::Target::Stderr);

    builder.try_init().unwrap_or_else(|e| {
        eprintln!("Failed to initialize logger: {}. Logging might not work as expected.", e);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_beats_config() {
        let mut cfg = MasterConfig::default();
        cfg.app_settings.log_level = Some("warn".to_string());
        assert_eq!(resolve_level(Some(&cfg), true), LevelFilter::Debug);
        assert_eq!(resolve_level(Some(&cfg), false), LevelFilter::Warn);
    }

    #[test]
    fn unknown_or_missing_level_defaults_to_info() {
        let mut cfg = MasterConfig::default();
        cfg.app_settings.log_level = Some("chatty".to_string());
        assert_eq!(resolve_level(Some(&cfg), false), LevelFilter::Info);
        assert_eq!(resolve_level(None, false), LevelFilter::Info);
    }
}
