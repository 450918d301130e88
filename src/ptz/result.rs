use crate::camera_config::Protocol;
use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The command reached the device transport.
    Sent,
    /// Nothing was sent, either by request or because the protocol has no encoding.
    Idle,
    /// The command did not reach the device.
    Error,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Sent => "sent",
            Outcome::Idle => "idle",
            Outcome::Error => "error",
        })
    }
}

/// Outcome of one dispatch, serialized as `{ status, protocol, detail? }`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DispatchResult {
    #[serde(rename = "status")]
    pub outcome: Outcome,
    #[serde(rename = "protocol")]
    pub protocol_used: Protocol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl DispatchResult {
    pub fn sent(protocol: Protocol, detail: impl Into<String>) -> Self {
        DispatchResult {
            outcome: Outcome::Sent,
            protocol_used: protocol,
            detail: Some(detail.into()),
        }
    }

    pub fn idle(protocol: Protocol) -> Self {
        DispatchResult {
            outcome: Outcome::Idle,
            protocol_used: protocol,
            detail: None,
        }
    }

    /// Idle because the active protocol has no encoding for the command.
    pub fn unsupported(protocol: Protocol, what: impl fmt::Display) -> Self {
        DispatchResult {
            outcome: Outcome::Idle,
            protocol_used: protocol,
            detail: Some(
                AppError::UnsupportedCommand(format!("{} has no {} encoding", what, protocol))
                    .to_string(),
            ),
        }
    }

    pub fn failed(protocol: Protocol, err: &AppError) -> Self {
        DispatchResult {
            outcome: Outcome::Error,
            protocol_used: protocol,
            detail: Some(err.to_string()),
        }
    }

    pub fn is_sent(&self) -> bool {
        self.outcome == Outcome::Sent
    }
}
