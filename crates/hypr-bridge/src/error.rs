//! Error types for Hyprland IPC operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when talking to the Hyprland compositor
#[derive(Debug, Error)]
pub enum HyprError {
    /// A required environment variable is not set
    #[error("{var} environment variable not set - is Hyprland running?")]
    EnvNotSet { var: &'static str },

    /// The socket path does not exist
    #[error("Hyprland socket not found at {path}")]
    SocketNotFound { path: PathBuf },

    /// Failed to connect to a Hyprland socket
    #[error("Failed to connect to Hyprland socket at {path}: {source}")]
    ConnectionFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The compositor closed the event stream
    #[error("Hyprland disconnected")]
    Disconnected,

    /// A line on the event stream is not a valid `event>>payload` record
    #[error("Malformed event line {line:?}: {reason}")]
    FrameFormat { line: String, reason: &'static str },

    /// A registered callback failed while handling an event
    #[error("Listener for event {event:?} failed: {source}")]
    Callback {
        event: String,
        #[source]
        source: anyhow::Error,
    },

    /// Failed to send a request to Hyprland
    #[error("Failed to send request to Hyprland: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Failed to receive data from Hyprland
    #[error("Failed to receive data from Hyprland: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Hyprland did not recognise the command
    #[error("Unknown request: {command}")]
    RequestRejected { command: String },

    /// The `hyprctl` utility could not be run or exited with an error
    #[error("hyprctl {command} failed: {message}")]
    CommandFailed { command: String, message: String },

    /// Failed to deserialize a JSON reply
    #[error("Failed to deserialize reply: {0}")]
    DeserializeFailed(#[source] serde_json::Error),

    /// Hyprland answered `ok` where data was expected
    #[error("Hyprland returned no data for {command}")]
    EmptyReply { command: String },

    /// No monitor reported itself as focused
    #[error("No focused monitor found")]
    NoFocusedMonitor,
}

impl HyprError {
    /// Whether this error was raised while establishing a connection
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            HyprError::EnvNotSet { .. }
                | HyprError::SocketNotFound { .. }
                | HyprError::ConnectionFailed { .. }
        )
    }
}
