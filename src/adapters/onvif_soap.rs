use super::{xml_escape, PtzAdapter};
use crate::app_config::ApplicationConfig;
use crate::camera_config::{CameraConfiguration, Protocol};
use crate::errors::AppError;
use crate::ptz::{DiscreteAction, DispatchResult, PtzCommand};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};

pub const SOAP_ENV_NS: &str = "http://www.w3.org/2003/05/soap-envelope";
pub const PTZ_NS: &str = "http://www.onvif.org/ver10/ptz/wsdl";
pub const SCHEMA_NS: &str = "http://www.onvif.org/ver10/schema";
pub const SOAP_CONTENT_TYPE: &str = "application/soap+xml";

/// Speeds used when a discrete action is rendered as a continuous move.
pub const DISCRETE_PAN_TILT_SPEED: f64 = 0.5;
pub const DISCRETE_ZOOM_SPEED: f64 = 0.3;

/// The PTZ service operations this adapter can render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OnvifRequest {
    ContinuousMove { pan: f64, tilt: f64, zoom: f64 },
    /// Zoom-only absolute move; `position` is normalised to [0, 1].
    AbsoluteZoom { position: f64 },
    GotoHomePosition,
    Stop,
}

impl OnvifRequest {
    pub fn operation(&self) -> &'static str {
        match self {
            OnvifRequest::ContinuousMove { .. } => "ContinuousMove",
            OnvifRequest::AbsoluteZoom { .. } => "AbsoluteMove",
            OnvifRequest::GotoHomePosition => "GotoHomePosition",
            OnvifRequest::Stop => "Stop",
        }
    }

    /// Maps a canonical command onto a PTZ service operation.
    ///
    /// `auto-focus` belongs to the imaging service, not PTZ, so it has no rendering here
    /// and the adapter reports it as idle/unsupported instead of dropping it silently.
    pub fn for_command(command: &PtzCommand) -> Option<OnvifRequest> {
        let s = DISCRETE_PAN_TILT_SPEED;
        let z = DISCRETE_ZOOM_SPEED;
        match command {
            PtzCommand::Idle => Some(OnvifRequest::Stop),
            PtzCommand::Discrete(action) => match action {
                DiscreteAction::PanLeft => Some(OnvifRequest::ContinuousMove { pan: -s, tilt: 0.0, zoom: 0.0 }),
                DiscreteAction::PanRight => Some(OnvifRequest::ContinuousMove { pan: s, tilt: 0.0, zoom: 0.0 }),
                DiscreteAction::TiltUp => Some(OnvifRequest::ContinuousMove { pan: 0.0, tilt: s, zoom: 0.0 }),
                DiscreteAction::TiltDown => Some(OnvifRequest::ContinuousMove { pan: 0.0, tilt: -s, zoom: 0.0 }),
                DiscreteAction::ZoomIn => Some(OnvifRequest::ContinuousMove { pan: 0.0, tilt: 0.0, zoom: z }),
                DiscreteAction::ZoomOut => Some(OnvifRequest::ContinuousMove { pan: 0.0, tilt: 0.0, zoom: -z }),
                DiscreteAction::Home => Some(OnvifRequest::GotoHomePosition),
                DiscreteAction::Stop => Some(OnvifRequest::Stop),
                DiscreteAction::AutoFocus => None,
            },
            PtzCommand::Continuous(m) => match m.zoom_target {
                Some(target) if m.pan_velocity == 0.0 && m.tilt_velocity == 0.0 => {
                    Some(OnvifRequest::AbsoluteZoom { position: (target - 1.0) / 9.0 })
                }
                _ => Some(OnvifRequest::ContinuousMove {
                    pan: m.pan_velocity,
                    tilt: m.tilt_velocity,
                    zoom: m.zoom_velocity,
                }),
            },
        }
    }

    /// The zoom target a `ContinuousMove` leaves out: a velocity move has no way to carry
    /// an absolute zoom ratio, so it is dropped when pan or tilt is also moving.
    pub fn ignored_zoom_target(command: &PtzCommand, request: &OnvifRequest) -> Option<f64> {
        match (command, request) {
            (PtzCommand::Continuous(m), OnvifRequest::ContinuousMove { .. }) => m.zoom_target,
            _ => None,
        }
    }

    pub fn body(&self, profile_token: &str) -> String {
        let token = xml_escape(profile_token);
        match self {
            OnvifRequest::ContinuousMove { pan, tilt, zoom } => format!(
                r#"<tptz:ContinuousMove><tptz:ProfileToken>{token}</tptz:ProfileToken><tptz:Velocity><tt:PanTilt x="{pan}" y="{tilt}"/><tt:Zoom x="{zoom}"/></tptz:Velocity></tptz:ContinuousMove>"#
            ),
            OnvifRequest::AbsoluteZoom { position } => format!(
                r#"<tptz:AbsoluteMove><tptz:ProfileToken>{token}</tptz:ProfileToken><tptz:Position><tt:Zoom x="{position}"/></tptz:Position></tptz:AbsoluteMove>"#
            ),
            OnvifRequest::GotoHomePosition => format!(
                r#"<tptz:GotoHomePosition><tptz:ProfileToken>{token}</tptz:ProfileToken></tptz:GotoHomePosition>"#
            ),
            OnvifRequest::Stop => format!(
                r#"<tptz:Stop><tptz:ProfileToken>{token}</tptz:ProfileToken><tptz:PanTilt>true</tptz:PanTilt><tptz:Zoom>true</tptz:Zoom></tptz:Stop>"#
            ),
        }
    }
}

/// Wraps a PTZ body in a SOAP 1.2 envelope.
pub fn build_envelope(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<s:Envelope xmlns:s="{SOAP_ENV_NS}" xmlns:tptz="{PTZ_NS}" xmlns:tt="{SCHEMA_NS}">
  <s:Body>
    {body}
  </s:Body>
</s:Envelope>
"#
    )
}

/// Pulls the human-readable reason out of a SOAP fault, if the body is one.
pub fn fault_reason(body: &str) -> Option<String> {
    let doc = roxmltree::Document::parse(body).ok()?;
    let fault = doc.descendants().find(|n| n.tag_name().name() == "Fault")?;
    fault
        .descendants()
        .find(|n| matches!(n.tag_name().name(), "Text" | "faultstring"))
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

pub struct OnvifSoapAdapter {
    client: Client,
    service_path: String,
    profile_token: String,
    timeout: Duration,
}

impl OnvifSoapAdapter {
    pub fn new(app: &ApplicationConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(app.request_timeout())
            .build()
            .map_err(|e| AppError::Config(format!("soap client build failed: {}", e)))?;
        Ok(OnvifSoapAdapter {
            client,
            service_path: app.onvif_service_path.clone(),
            profile_token: app.onvif_profile_token.clone(),
            timeout: app.request_timeout(),
        })
    }

    pub fn endpoint(&self, config: &CameraConfiguration) -> String {
        format!("http://{}:{}{}", config.host, config.onvif_port, self.service_path)
    }

    pub fn envelope_for(&self, request: &OnvifRequest) -> String {
        build_envelope(&request.body(&self.profile_token))
    }

    /// Only HTTP 200 counts as accepted; anything else is an error carrying the fault reason.
    async fn exchange(request: reqwest::RequestBuilder) -> Result<(), AppError> {
        let response = request.send().await.map_err(|e| AppError::from_reqwest(&e))?;
        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        let reason = fault_reason(&body).map(|r| format!(": {}", r)).unwrap_or_default();
        Err(AppError::TransportError(format!(
            "device answered HTTP {}{}",
            status.as_u16(),
            reason
        )))
    }

    async fn post(&self, endpoint: &str, envelope: String, config: &CameraConfiguration) -> Result<(), AppError> {
        let mut request = self
            .client
            .post(endpoint)
            .header(reqwest::header::CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .body(envelope);
        if let Some((user, pass)) = config.credentials() {
            request = request.basic_auth(user, Some(pass));
        }

        match tokio::time::timeout(self.timeout, Self::exchange(request)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::TransportTimeout(format!(
                "no response from {} within {:?}",
                endpoint, self.timeout
            ))),
        }
    }
}

#[async_trait]
impl PtzAdapter for OnvifSoapAdapter {
    fn protocol(&self) -> Protocol {
        Protocol::Onvif
    }

    async fn execute(&self, command: &PtzCommand, config: &CameraConfiguration) -> DispatchResult {
        let request = match OnvifRequest::for_command(command) {
            Some(request) => request,
            None => {
                warn!("ONVIF [{}]: '{}' has no PTZ service operation, reporting idle.", config.host, command);
                return DispatchResult::unsupported(Protocol::Onvif, command);
            }
        };

        let ignored_zoom = OnvifRequest::ignored_zoom_target(command, &request);
        if let Some(target) = ignored_zoom {
            warn!("ONVIF [{}]: zoom target {} dropped; ContinuousMove carries pan/tilt only.", config.host, target);
        }

        let endpoint = self.endpoint(config);
        let envelope = self.envelope_for(&request);
        debug!("ONVIF [{}]: POST {} {}\n{}", config.host, endpoint, request.operation(), envelope);
        let start = Instant::now();

        match self.post(&endpoint, envelope, config).await {
            Ok(()) => {
                info!("ONVIF [{}]: {} for '{}' accepted in {:?}.", config.host, request.operation(), command, start.elapsed());
                let detail = match ignored_zoom {
                    Some(target) => format!(
                        "{} HTTP 200 (zoom target {} ignored while panning/tilting)",
                        request.operation(),
                        target
                    ),
                    None => format!("{} HTTP 200", request.operation()),
                };
                DispatchResult::sent(Protocol::Onvif, detail)
            }
            Err(e) => {
                error!("ONVIF [{}]: {} for '{}' failed after {:?}: {}", config.host, request.operation(), command, start.elapsed(), e);
                DispatchResult::failed(Protocol::Onvif, &e)
            }
        }
    }
}
