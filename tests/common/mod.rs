// Shared fixtures for the integration tests.
#![allow(dead_code)]

use rptz::app_config::ApplicationConfig;
use rptz::camera_config::{CameraConfiguration, Protocol};
use rptz::core::{CameraConfigStore, Dispatcher};
use std::net::SocketAddr;
use std::sync::Arc;

/// Application settings with a short request timeout so failure paths stay fast.
pub fn app_settings(timeout_ms: u64) -> ApplicationConfig {
    ApplicationConfig {
        request_timeout_ms: timeout_ms,
        visca_linger_ms: 50,
        ..Default::default()
    }
}

/// A camera whose every protocol port points at `addr`.
pub fn camera_at(addr: SocketAddr, protocol: Protocol) -> CameraConfiguration {
    CameraConfiguration {
        host: addr.ip().to_string(),
        http_port: addr.port(),
        onvif_port: addr.port(),
        visca_port: addr.port(),
        username: None,
        password: None,
        protocol,
    }
}

pub fn dispatcher_for(app: &ApplicationConfig, camera: CameraConfiguration) -> Arc<Dispatcher> {
    let store = Arc::new(CameraConfigStore::new(camera));
    Arc::new(Dispatcher::new(store, app).unwrap())
}

/// A localhost port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
