use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_HTTP_PORT: u16 = 81;
pub const DEFAULT_ONVIF_PORT: u16 = 2000;
pub const DEFAULT_VISCA_PORT: u16 = 52381;

/// Wire protocol used to reach the camera. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Onvif,
    Visca,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Onvif => "onvif",
            Protocol::Visca => "visca",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(Protocol::Http),
            "onvif" => Ok(Protocol::Onvif),
            "visca" => Ok(Protocol::Visca),
            other => Err(AppError::UnknownProtocol(format!(
                "'{}' is not one of http, onvif, visca",
                other
            ))),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CameraConfiguration {
    pub host: String,
    pub http_port: u16,
    pub onvif_port: u16,
    pub visca_port: u16,
    pub username: Option<String>,
    pub password: Option<String>, // Prefer the CAMERA_PASS env var over the file
    pub protocol: Protocol,
}

impl Default for CameraConfiguration {
    fn default() -> Self {
        CameraConfiguration {
            host: "192.168.1.11".to_string(),
            http_port: DEFAULT_HTTP_PORT,
            onvif_port: DEFAULT_ONVIF_PORT,
            visca_port: DEFAULT_VISCA_PORT,
            username: None,
            password: None,
            protocol: Protocol::Http,
        }
    }
}

impl CameraConfiguration {
    /// Username/password pair, present only when both halves are non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }

    /// Returns a copy with `update` merged in. Fields absent from the update are kept.
    pub fn merged(&self, update: &CameraConfigUpdate) -> Result<CameraConfiguration, AppError> {
        let mut next = self.clone();
        if let Some(host) = &update.host {
            if host.trim().is_empty() {
                return Err(AppError::Config("host cannot be empty".to_string()));
            }
            next.host = host.trim().to_string();
        }
        if let Some(port) = update.http_port {
            next.http_port = port;
        }
        if let Some(port) = update.onvif_port {
            next.onvif_port = port;
        }
        if let Some(port) = update.visca_port {
            next.visca_port = port;
        }
        if let Some(user) = &update.user {
            next.username = non_empty(user);
        }
        if let Some(pass) = &update.pass {
            next.password = non_empty(pass);
        }
        if let Some(protocol) = &update.protocol {
            next.protocol = protocol.parse()?;
        }
        if [next.http_port, next.onvif_port, next.visca_port].contains(&0) {
            return Err(AppError::Config("ports must be non-zero".to_string()));
        }
        Ok(next)
    }

    pub fn masked(&self) -> CameraConfiguration {
        let mut copy = self.clone();
        if copy.password.is_some() {
            copy.password = Some("********".to_string());
        }
        copy
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Partial configuration update as received from the operator.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CameraConfigUpdate {
    pub host: Option<String>,
    pub http_port: Option<u16>,
    pub onvif_port: Option<u16>,
    pub visca_port: Option<u16>,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub protocol: Option<String>,
}

impl CameraConfigUpdate {
    pub fn is_empty(&self) -> bool {
        *self == CameraConfigUpdate::default()
    }
}
