//! Pan/tilt/zoom command dispatch: normalizes operator motion intents and translates them
//! into vendor HTTP-CGI requests, ONVIF SOAP calls or VISCA packets.

pub mod adapters;
pub mod app_config;
pub mod camera_config;
pub mod cli;
pub mod common;
pub mod config_loader;
pub mod core;
pub mod errors;
pub mod operations;
pub mod ptz;
