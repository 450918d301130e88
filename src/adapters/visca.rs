use super::PtzAdapter;
use crate::app_config::ApplicationConfig;
use crate::camera_config::{CameraConfiguration, Protocol};
use crate::errors::AppError;
use crate::ptz::{DiscreteAction, DispatchResult, PtzCommand};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

pub const CAMERA_ADDRESS: u8 = 0x81;
pub const COMMAND_BYTE: u8 = 0x01;
pub const TERMINATOR: u8 = 0xFF;

// Pan/tilt speed bytes used by the step commands.
const PAN_SPEED: u8 = 0x08;
const TILT_SPEED: u8 = 0x08;

const PAN_LEFT: [u8; 9] = [CAMERA_ADDRESS, COMMAND_BYTE, 0x06, 0x01, PAN_SPEED, TILT_SPEED, 0x01, 0x03, TERMINATOR];
const PAN_RIGHT: [u8; 9] = [CAMERA_ADDRESS, COMMAND_BYTE, 0x06, 0x01, PAN_SPEED, TILT_SPEED, 0x02, 0x03, TERMINATOR];
const TILT_UP: [u8; 9] = [CAMERA_ADDRESS, COMMAND_BYTE, 0x06, 0x01, PAN_SPEED, TILT_SPEED, 0x03, 0x01, TERMINATOR];
const TILT_DOWN: [u8; 9] = [CAMERA_ADDRESS, COMMAND_BYTE, 0x06, 0x01, PAN_SPEED, TILT_SPEED, 0x03, 0x02, TERMINATOR];
const PAN_TILT_STOP: [u8; 9] = [CAMERA_ADDRESS, COMMAND_BYTE, 0x06, 0x01, PAN_SPEED, TILT_SPEED, 0x03, 0x03, TERMINATOR];
const ZOOM_TELE: [u8; 6] = [CAMERA_ADDRESS, COMMAND_BYTE, 0x04, 0x07, 0x02, TERMINATOR];
const ZOOM_WIDE: [u8; 6] = [CAMERA_ADDRESS, COMMAND_BYTE, 0x04, 0x07, 0x03, TERMINATOR];
const HOME: [u8; 5] = [CAMERA_ADDRESS, COMMAND_BYTE, 0x06, 0x04, TERMINATOR];
const AUTO_FOCUS: [u8; 6] = [CAMERA_ADDRESS, COMMAND_BYTE, 0x04, 0x38, 0x02, TERMINATOR];

/// Static command table. Every packet is `81 01 .. FF`.
pub fn packet_for(action: DiscreteAction) -> Option<&'static [u8]> {
    match action {
        DiscreteAction::PanLeft => Some(&PAN_LEFT),
        DiscreteAction::PanRight => Some(&PAN_RIGHT),
        DiscreteAction::TiltUp => Some(&TILT_UP),
        DiscreteAction::TiltDown => Some(&TILT_DOWN),
        DiscreteAction::ZoomIn => Some(&ZOOM_TELE),
        DiscreteAction::ZoomOut => Some(&ZOOM_WIDE),
        DiscreteAction::Home => Some(&HOME),
        DiscreteAction::AutoFocus => Some(&AUTO_FOCUS),
        DiscreteAction::Stop => Some(&PAN_TILT_STOP),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViscaState {
    Closed,
    Connecting,
    Connected,
    Sending,
    Lingering,
    Failed,
}

/// One fire-and-forget exchange: connect, write, linger, close.
///
/// The socket lives only inside `run`, so every exit path drops it: an early `?`, the
/// explicit close after lingering, or the surrounding timeout cancelling the future.
struct ViscaTransport {
    state: ViscaState,
    trace: Vec<ViscaState>,
}

impl ViscaTransport {
    fn new() -> Self {
        ViscaTransport {
            state: ViscaState::Closed,
            trace: vec![ViscaState::Closed],
        }
    }

    fn transition(&mut self, next: ViscaState) {
        debug!("VISCA transport: {:?} -> {:?}", self.state, next);
        self.state = next;
        self.trace.push(next);
    }

    async fn run(&mut self, host: &str, port: u16, packet: &[u8], linger: Duration) -> Result<(), AppError> {
        self.transition(ViscaState::Connecting);
        let mut stream = TcpStream::connect((host, port))
            .await
            .map_err(|e| AppError::TransportError(format!("connect to {}:{} failed: {}", host, port, e)))?;
        if let Err(e) = stream.set_nodelay(true) {
            debug!("VISCA transport: set_nodelay on {}:{} reported {}", host, port, e);
        }
        self.transition(ViscaState::Connected);

        self.transition(ViscaState::Sending);
        stream
            .write_all(packet)
            .await
            .map_err(|e| AppError::TransportError(format!("write to {}:{} failed: {}", host, port, e)))?;

        self.transition(ViscaState::Lingering);
        tokio::time::sleep(linger).await;

        // The packet is already out; a failed FIN only means the peer left first.
        if let Err(e) = stream.shutdown().await {
            debug!("VISCA transport: shutdown after linger reported {}", e);
        }
        drop(stream);
        self.transition(ViscaState::Closed);
        Ok(())
    }

    fn fail(&mut self) {
        self.transition(ViscaState::Failed);
    }
}

pub struct ViscaAdapter {
    timeout: Duration,
    linger: Duration,
}

impl ViscaAdapter {
    pub fn new(app: &ApplicationConfig) -> Self {
        ViscaAdapter {
            timeout: app.request_timeout(),
            linger: app.visca_linger(),
        }
    }

    /// Like [`PtzAdapter::execute`], also returning every transport state visited.
    /// The trace is empty when no packet was attempted.
    pub async fn execute_traced(
        &self,
        command: &PtzCommand,
        config: &CameraConfiguration,
    ) -> (DispatchResult, Vec<ViscaState>) {
        let packet = match command {
            PtzCommand::Idle => return (DispatchResult::idle(Protocol::Visca), Vec::new()),
            PtzCommand::Continuous(_) => {
                warn!("VISCA [{}]: continuous motion has no step command, reporting idle.", config.host);
                return (DispatchResult::unsupported(Protocol::Visca, command), Vec::new());
            }
            PtzCommand::Discrete(action) => match packet_for(*action) {
                Some(packet) => packet,
                None => return (DispatchResult::unsupported(Protocol::Visca, command), Vec::new()),
            },
        };

        debug!("VISCA [{}:{}]: '{}' -> {:02X?}", config.host, config.visca_port, command, packet);
        let start = Instant::now();
        let mut transport = ViscaTransport::new();
        let outcome = tokio::time::timeout(
            self.timeout,
            transport.run(&config.host, config.visca_port, packet, self.linger),
        )
        .await;

        let result = match outcome {
            Ok(Ok(())) => {
                info!("VISCA [{}:{}]: '{}' sent in {:?}.", config.host, config.visca_port, command, start.elapsed());
                DispatchResult::sent(Protocol::Visca, format!("{} bytes written", packet.len()))
            }
            Ok(Err(e)) => {
                transport.fail();
                error!("VISCA [{}:{}]: '{}' failed after {:?}: {}", config.host, config.visca_port, command, start.elapsed(), e);
                DispatchResult::failed(Protocol::Visca, &e)
            }
            Err(_) => {
                let stalled_in = transport.state;
                transport.fail();
                let e = AppError::TransportTimeout(format!(
                    "{:?} did not complete within {:?}",
                    stalled_in, self.timeout
                ));
                error!("VISCA [{}:{}]: '{}' timed out: {}", config.host, config.visca_port, command, e);
                DispatchResult::failed(Protocol::Visca, &e)
            }
        };
        (result, transport.trace)
    }
}

#[async_trait]
impl PtzAdapter for ViscaAdapter {
    fn protocol(&self) -> Protocol {
        Protocol::Visca
    }

    async fn execute(&self, command: &PtzCommand, config: &CameraConfiguration) -> DispatchResult {
        self.execute_traced(command, config).await.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_packet_is_framed() {
        for action in DiscreteAction::ALL {
            let packet = packet_for(action).unwrap();
            assert_eq!(packet[0], CAMERA_ADDRESS, "{}", action);
            assert_eq!(packet[1], COMMAND_BYTE, "{}", action);
            assert_eq!(*packet.last().unwrap(), TERMINATOR, "{}", action);
            // The terminator never appears inside the frame.
            assert!(!packet[..packet.len() - 1].contains(&TERMINATOR), "{}", action);
        }
    }

    #[test]
    fn home_packet_matches_wire_format() {
        assert_eq!(packet_for(DiscreteAction::Home).unwrap(), &[0x81, 0x01, 0x06, 0x04, 0xFF]);
        assert_eq!(packet_for(DiscreteAction::ZoomIn).unwrap(), &[0x81, 0x01, 0x04, 0x07, 0x02, 0xFF]);
    }

    #[tokio::test]
    async fn continuous_reports_idle_without_connecting() {
        let adapter = ViscaAdapter::new(&ApplicationConfig::default());
        let cmd = crate::ptz::normalize(&crate::ptz::MotionIntent::velocity(0.4, 0.0, 0.0)).unwrap();
        let config = CameraConfiguration {
            host: "192.0.2.1".to_string(),
            ..Default::default()
        };
        let (result, trace) = adapter.execute_traced(&cmd, &config).await;
        assert_eq!(result.outcome, crate::ptz::Outcome::Idle);
        assert!(result.detail.unwrap().contains("UnsupportedCommand"));
        assert!(trace.is_empty());
    }
}
