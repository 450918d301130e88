use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const VELOCITY_MIN: f64 = -1.0;
pub const VELOCITY_MAX: f64 = 1.0;
pub const ZOOM_TARGET_MIN: f64 = 1.0;
pub const ZOOM_TARGET_MAX: f64 = 10.0;

/// Motion intent as sent by the UI: `{ command?, pan?, tilt?, zoom? }`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MotionIntent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
}

impl MotionIntent {
    pub fn discrete(name: &str) -> Self {
        MotionIntent {
            command: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn velocity(pan: f64, tilt: f64, zoom: f64) -> Self {
        MotionIntent {
            command: None,
            pan: Some(pan),
            tilt: Some(tilt),
            zoom: Some(zoom),
        }
    }
}

/// Named one-shot camera action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscreteAction {
    PanLeft,
    PanRight,
    TiltUp,
    TiltDown,
    ZoomIn,
    ZoomOut,
    Home,
    AutoFocus,
    Stop,
}

impl DiscreteAction {
    pub const ALL: [DiscreteAction; 9] = [
        DiscreteAction::PanLeft,
        DiscreteAction::PanRight,
        DiscreteAction::TiltUp,
        DiscreteAction::TiltDown,
        DiscreteAction::ZoomIn,
        DiscreteAction::ZoomOut,
        DiscreteAction::Home,
        DiscreteAction::AutoFocus,
        DiscreteAction::Stop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiscreteAction::PanLeft => "pan-left",
            DiscreteAction::PanRight => "pan-right",
            DiscreteAction::TiltUp => "tilt-up",
            DiscreteAction::TiltDown => "tilt-down",
            DiscreteAction::ZoomIn => "zoom-in",
            DiscreteAction::ZoomOut => "zoom-out",
            DiscreteAction::Home => "home",
            DiscreteAction::AutoFocus => "auto-focus",
            DiscreteAction::Stop => "stop",
        }
    }
}

impl fmt::Display for DiscreteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscreteAction {
    type Err = AppError;

    /// Case-insensitive; `-`, `_` and spaces are ignored so "Pan-Left", "pan_left",
    /// "panleft" and the short UI form "left" all resolve to the same action.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "left" | "panleft" => Ok(DiscreteAction::PanLeft),
            "right" | "panright" => Ok(DiscreteAction::PanRight),
            "up" | "tiltup" => Ok(DiscreteAction::TiltUp),
            "down" | "tiltdown" => Ok(DiscreteAction::TiltDown),
            "zoomin" => Ok(DiscreteAction::ZoomIn),
            "zoomout" => Ok(DiscreteAction::ZoomOut),
            "home" => Ok(DiscreteAction::Home),
            "focus" | "autofocus" => Ok(DiscreteAction::AutoFocus),
            "stop" => Ok(DiscreteAction::Stop),
            _ => Err(AppError::InvalidCommand(format!("unrecognized action '{}'", s))),
        }
    }
}

/// Velocity vector plus an optional absolute zoom ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinuousMotion {
    pub pan_velocity: f64,
    pub tilt_velocity: f64,
    pub zoom_velocity: f64,
    /// Absolute zoom ratio in [1.0, 10.0]; a target, not a speed.
    pub zoom_target: Option<f64>,
}

impl ContinuousMotion {
    pub fn is_still(&self) -> bool {
        self.pan_velocity == 0.0
            && self.tilt_velocity == 0.0
            && self.zoom_velocity == 0.0
            && self.zoom_target.is_none()
    }
}

/// Canonical, protocol-neutral motion command. Built per request and never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PtzCommand {
    Discrete(DiscreteAction),
    Continuous(ContinuousMotion),
    /// Nothing to do; the dispatcher returns before any adapter runs.
    Idle,
}

impl PtzCommand {
    pub fn is_idle(&self) -> bool {
        matches!(self, PtzCommand::Idle)
    }
}

impl fmt::Display for PtzCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PtzCommand::Discrete(action) => write!(f, "{}", action),
            PtzCommand::Continuous(m) => write!(
                f,
                "continuous(pan={}, tilt={}, zoom={}, zoom_target={:?})",
                m.pan_velocity, m.tilt_velocity, m.zoom_velocity, m.zoom_target
            ),
            PtzCommand::Idle => f.write_str("idle"),
        }
    }
}

fn finite(value: f64, field: &str) -> Result<f64, AppError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AppError::InvalidCommand(format!("{} must be a finite number", field)))
    }
}

/// Canonicalizes a UI motion intent.
///
/// A named action wins over any velocity fields. Velocities are clamped to [-1, 1].
/// A `zoom` above 1 is read as an absolute zoom ratio and clamped to [1, 10]; a `zoom`
/// below -1 is clamped to a full-speed zoom-out velocity. Velocity fields that are present
/// but all zero yield [`PtzCommand::Idle`]; an intent with no action and no motion fields
/// at all is `InvalidCommand`.
pub fn normalize(input: &MotionIntent) -> Result<PtzCommand, AppError> {
    if let Some(name) = input.command.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        return name.parse().map(PtzCommand::Discrete);
    }

    if input.pan.is_none() && input.tilt.is_none() && input.zoom.is_none() {
        return Err(AppError::InvalidCommand(
            "expected a command name or at least one of pan, tilt, zoom".to_string(),
        ));
    }

    let pan = finite(input.pan.unwrap_or(0.0), "pan")?;
    let tilt = finite(input.tilt.unwrap_or(0.0), "tilt")?;
    let zoom = finite(input.zoom.unwrap_or(0.0), "zoom")?;

    // Only a positive zoom can name a ratio in [1, 10]; negatives stay zoom-out velocities.
    let (zoom_velocity, zoom_target) = if zoom > VELOCITY_MAX {
        (0.0, Some(zoom.min(ZOOM_TARGET_MAX)))
    } else {
        (zoom.max(VELOCITY_MIN), None)
    };

    let motion = ContinuousMotion {
        pan_velocity: pan.clamp(VELOCITY_MIN, VELOCITY_MAX),
        tilt_velocity: tilt.clamp(VELOCITY_MIN, VELOCITY_MAX),
        zoom_velocity,
        zoom_target,
    };

    if motion.is_still() {
        Ok(PtzCommand::Idle)
    } else {
        Ok(PtzCommand::Continuous(motion))
    }
}
