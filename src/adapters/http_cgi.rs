use super::PtzAdapter;
use crate::app_config::ApplicationConfig;
use crate::camera_config::{CameraConfiguration, Protocol};
use crate::errors::AppError;
use crate::ptz::{ContinuousMotion, DiscreteAction, DispatchResult, PtzCommand};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use reqwest::Client;
use std::time::{Duration, Instant};

/// Vendor CGI control endpoint: one GET per command, any HTTP response counts as sent.
pub struct HttpCgiAdapter {
    client: Client,
    control_path: String,
    timeout: Duration,
}

impl HttpCgiAdapter {
    pub fn new(app: &ApplicationConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(app.request_timeout())
            .build()
            .map_err(|e| AppError::Config(format!("http client build failed: {}", e)))?;
        Ok(HttpCgiAdapter {
            client,
            control_path: app.cgi_control_path.clone(),
            timeout: app.request_timeout(),
        })
    }

    /// Fixed parameter for each discrete action; `None` when the CGI has no such control.
    pub fn discrete_param(action: DiscreteAction) -> Option<&'static str> {
        match action {
            DiscreteAction::PanLeft => Some("panLeft=1"),
            DiscreteAction::PanRight => Some("panRight=1"),
            DiscreteAction::TiltUp => Some("tiltUp=1"),
            DiscreteAction::TiltDown => Some("tiltDown=1"),
            DiscreteAction::ZoomIn => Some("zoomIn=1"),
            DiscreteAction::ZoomOut => Some("zoomOut=1"),
            DiscreteAction::Home => Some("presetGoto=1"),
            DiscreteAction::AutoFocus => Some("autoFocus=1"),
            DiscreteAction::Stop => None,
        }
    }

    /// Pan/tilt scaled by 100, zoom (velocity or target ratio) by 10, all rounded.
    pub fn continuous_params(motion: &ContinuousMotion) -> String {
        let zoom = motion.zoom_target.unwrap_or(motion.zoom_velocity);
        format!(
            "pan={}&tilt={}&zoom={}",
            round_half_up(motion.pan_velocity * 100.0),
            round_half_up(motion.tilt_velocity * 100.0),
            round_half_up(zoom * 10.0)
        )
    }

    pub fn query_for(command: &PtzCommand) -> Option<String> {
        match command {
            PtzCommand::Discrete(action) => Self::discrete_param(*action).map(str::to_string),
            PtzCommand::Continuous(motion) => Some(Self::continuous_params(motion)),
            PtzCommand::Idle => None,
        }
    }

    pub fn control_url(&self, config: &CameraConfiguration, params: &str) -> String {
        format!(
            "http://{}:{}{}?action=ptzControl&{}",
            config.host, config.http_port, self.control_path, params
        )
    }

    async fn send(&self, url: &str, config: &CameraConfiguration) -> Result<reqwest::StatusCode, AppError> {
        let mut request = self.client.get(url);
        if let Some((user, pass)) = config.credentials() {
            request = request.basic_auth(user, Some(pass));
        }
        match tokio::time::timeout(self.timeout, request.send()).await {
            Ok(Ok(response)) => Ok(response.status()),
            Ok(Err(e)) => Err(AppError::from_reqwest(&e)),
            Err(_) => Err(AppError::TransportTimeout(format!(
                "no response from {} within {:?}",
                url, self.timeout
            ))),
        }
    }
}

/// Halves round toward +inf (-12.5 -> -12), which is what the CGI firmware expects.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[async_trait]
impl PtzAdapter for HttpCgiAdapter {
    fn protocol(&self) -> Protocol {
        Protocol::Http
    }

    async fn execute(&self, command: &PtzCommand, config: &CameraConfiguration) -> DispatchResult {
        let params = match Self::query_for(command) {
            Some(params) => params,
            None if command.is_idle() => return DispatchResult::idle(Protocol::Http),
            None => {
                warn!("HTTP-CGI [{}]: '{}' has no CGI parameter, reporting idle.", config.host, command);
                return DispatchResult::unsupported(Protocol::Http, command);
            }
        };

        let url = self.control_url(config, &params);
        debug!("HTTP-CGI [{}]: GET {}", config.host, url);
        let start = Instant::now();

        match self.send(&url, config).await {
            Ok(status) => {
                if status.is_success() {
                    info!("HTTP-CGI [{}]: '{}' sent (HTTP {}) in {:?}.", config.host, command, status.as_u16(), start.elapsed());
                } else {
                    // Vendor error bodies are not interpreted; the command still reached the device.
                    warn!("HTTP-CGI [{}]: '{}' answered HTTP {} in {:?}.", config.host, command, status.as_u16(), start.elapsed());
                }
                DispatchResult::sent(Protocol::Http, format!("HTTP {}", status.as_u16()))
            }
            Err(e) => {
                error!("HTTP-CGI [{}]: '{}' failed after {:?}: {}", config.host, command, start.elapsed(), e);
                DispatchResult::failed(Protocol::Http, &e)
            }
        }
    }
}
