//! Protocol adapters: each renders a [`PtzCommand`] into one wire protocol and drives
//! the matching transport. Adapters never fail past their own boundary; every transport
//! problem is folded into the returned [`DispatchResult`].

pub mod http_cgi;
pub mod onvif_soap;
pub mod visca;

use crate::app_config::ApplicationConfig;
use crate::camera_config::{CameraConfiguration, Protocol};
use crate::errors::AppError;
use crate::ptz::{DispatchResult, PtzCommand};
use async_trait::async_trait;

pub use http_cgi::HttpCgiAdapter;
pub use onvif_soap::OnvifSoapAdapter;
pub use visca::{ViscaAdapter, ViscaState};

#[async_trait]
pub trait PtzAdapter: Send + Sync {
    fn protocol(&self) -> Protocol;

    /// Encodes and transmits one command against a configuration snapshot.
    async fn execute(&self, command: &PtzCommand, config: &CameraConfiguration) -> DispatchResult;
}

/// The three adapters, built once and shared by every dispatch.
pub struct AdapterSet {
    pub http: HttpCgiAdapter,
    pub onvif: OnvifSoapAdapter,
    pub visca: ViscaAdapter,
}

impl AdapterSet {
    pub fn new(app: &ApplicationConfig) -> Result<Self, AppError> {
        Ok(AdapterSet {
            http: HttpCgiAdapter::new(app)?,
            onvif: OnvifSoapAdapter::new(app)?,
            visca: ViscaAdapter::new(app),
        })
    }

    pub fn select(&self, protocol: Protocol) -> ProtocolAdapter<'_> {
        match protocol {
            Protocol::Http => ProtocolAdapter::Http(&self.http),
            Protocol::Onvif => ProtocolAdapter::Onvif(&self.onvif),
            Protocol::Visca => ProtocolAdapter::Visca(&self.visca),
        }
    }
}

/// Closed set of adapters, selected by a plain match on the active protocol.
#[derive(Clone, Copy)]
pub enum ProtocolAdapter<'a> {
    Http(&'a HttpCgiAdapter),
    Onvif(&'a OnvifSoapAdapter),
    Visca(&'a ViscaAdapter),
}

impl ProtocolAdapter<'_> {
    pub fn protocol(&self) -> Protocol {
        match self {
            ProtocolAdapter::Http(a) => a.protocol(),
            ProtocolAdapter::Onvif(a) => a.protocol(),
            ProtocolAdapter::Visca(a) => a.protocol(),
        }
    }

    pub async fn execute(&self, command: &PtzCommand, config: &CameraConfiguration) -> DispatchResult {
        match self {
            ProtocolAdapter::Http(a) => a.execute(command, config).await,
            ProtocolAdapter::Onvif(a) => a.execute(command, config).await,
            ProtocolAdapter::Visca(a) => a.execute(command, config).await,
        }
    }
}

/// Escapes text for inclusion in XML character data or attribute values.
pub(crate) fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_matches_protocol() {
        let adapters = AdapterSet::new(&ApplicationConfig::default()).unwrap();
        for protocol in [Protocol::Http, Protocol::Onvif, Protocol::Visca] {
            assert_eq!(adapters.select(protocol).protocol(), protocol);
        }
    }

    #[test]
    fn xml_escape_covers_markup() {
        assert_eq!(xml_escape(r#"a<b>&"c'"#), "a&lt;b&gt;&amp;&quot;c&apos;");
        assert_eq!(xml_escape("PTZ_Profile_1"), "PTZ_Profile_1");
    }
}
