use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ApplicationConfig {
    pub log_level: Option<String>, // Optional so the CLI or env var can take precedence
    pub request_timeout_ms: u64, // Absolute bound on every adapter call
    pub visca_linger_ms: u64, // Grace period between VISCA write and socket close
    pub onvif_profile_token: String,
    pub onvif_service_path: String, // e.g., "/onvif/ptz_service"
    pub cgi_control_path: String, // e.g., "/cgi-bin/api.cgi"
    pub cgi_status_query: String, // Query used by the diagnostic probe
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        ApplicationConfig {
            log_level: Some("info".to_string()),
            request_timeout_ms: 5000,
            visca_linger_ms: 200,
            onvif_profile_token: "PTZ_Profile_1".to_string(),
            onvif_service_path: "/onvif/ptz_service".to_string(),
            cgi_control_path: "/cgi-bin/api.cgi".to_string(),
            cgi_status_query: "action=getStatus".to_string(),
        }
    }
}

impl ApplicationConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn visca_linger(&self) -> Duration {
        Duration::from_millis(self.visca_linger_ms)
    }
}
