//! Error types for elastic-container

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackError {
    #[error("Kibana was not ready after {attempts} attempts: max retries exceeded")]
    ReadinessTimeout { attempts: u32 },

    #[error("Detection engine setup failed: {0}")]
    FeatureEnableRejected(String),

    #[error("Transport failure calling {endpoint}: {message}")]
    TransportFailure { endpoint: String, message: String },

    #[error("Interrupted while waiting for Kibana")]
    Interrupted,

    #[error("Docker error: {0}")]
    Docker(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not install the Ctrl+C handler: {0}")]
    SignalHandler(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StackError {
    /// Build a transport failure for a named endpoint from a reqwest error
    pub fn transport(endpoint: &str, err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out ({err})")
        } else if err.is_connect() {
            format!("connection failed ({err})")
        } else {
            err.to_string()
        };
        StackError::TransportFailure {
            endpoint: endpoint.to_string(),
            message,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        1
    }
}

pub type Result<T> = std::result::Result<T, StackError>;
