use crate::config_loader::DEFAULT_CONFIG_PATH;
use clap::{Arg, ArgAction, Command};
use log::debug;
use std::time::Instant;

pub fn build_cli() -> Command {
    debug!("⚙️ Building CLI interface...");
    let start_time = Instant::now();
    let cmd = Command::new("rptz")
        .version("0.1.0")
        .author("RPTZ Developers")
        .about("Steers a pan/tilt/zoom camera over vendor HTTP-CGI, ONVIF SOAP or VISCA.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help(format!("Sets a custom configuration file (default: {})", DEFAULT_CONFIG_PATH))
                .global(true)
                .action(ArgAction::Set)
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Enable debug logging")
                .global(true)
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("protocol")
                .short('p')
                .long("protocol")
                .value_name("PROTOCOL")
                .help("Overrides the configured active protocol for this run")
                .value_parser(["http", "onvif", "visca"])
                .global(true)
                .action(ArgAction::Set)
        )
        .subcommand(
            Command::new("move")
                .about("Sends one motion command and prints the dispatch result as JSON")
                .arg(Arg::new("command").long("command").value_name("ACTION").help("Named action: left, right, up, down, zoomin, zoomout, home, focus, stop").action(ArgAction::Set))
                .arg(Arg::new("pan").long("pan").value_name("VELOCITY").help("Pan velocity in [-1, 1]").value_parser(clap::value_parser!(f64)).allow_negative_numbers(true).action(ArgAction::Set))
                .arg(Arg::new("tilt").long("tilt").value_name("VELOCITY").help("Tilt velocity in [-1, 1]").value_parser(clap::value_parser!(f64)).allow_negative_numbers(true).action(ArgAction::Set))
                .arg(Arg::new("zoom").long("zoom").value_name("VALUE").help("Zoom velocity in [-1, 1], or an absolute zoom ratio in [1, 10] when larger").value_parser(clap::value_parser!(f64)).allow_negative_numbers(true).action(ArgAction::Set))
        )
        .subcommand(
            Command::new("session")
                .about("Reads JSON requests (move/config/show) line by line from stdin and answers on stdout")
        )
        .subcommand(
            Command::new("config")
                .about("Prints the effective configuration with secrets masked")
        )
        .subcommand(
            Command::new("test")
                .about("Runs a reachability diagnostic against every protocol port without moving the camera")
        );
    debug!("✅ CLI interface built in {:?}", start_time.elapsed());
    cmd
}
