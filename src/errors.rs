use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    /// The normalizer could not interpret the motion intent.
    #[error("InvalidCommand: {0}")]
    InvalidCommand(String),

    /// A recognized command with no mapping for the active protocol.
    #[error("UnsupportedCommand: {0}")]
    UnsupportedCommand(String),

    #[error("TransportTimeout: {0}")]
    TransportTimeout(String),

    #[error("TransportError: {0}")]
    TransportError(String),

    #[error("UnknownProtocol: {0}")]
    UnknownProtocol(String),

    #[error("Configuration Error: {0}")]
    Config(String),
}

impl AppError {
    /// Classifies a reqwest failure into the transport half of the taxonomy.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        let mut message = err.to_string();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        if err.is_timeout() {
            AppError::TransportTimeout(message)
        } else {
            AppError::TransportError(message)
        }
    }
}
