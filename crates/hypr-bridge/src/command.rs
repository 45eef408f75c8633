//! Command channel
//!
//! Hyprland answers one request per connection on `.socket.sock`: the client
//! writes the command, the compositor writes its reply and closes. The same
//! requests can be issued through the `hyprctl` utility.
//!
//! Commands are sent with the `j/` prefix (or `-j` for `hyprctl`) so data
//! replies come back as JSON.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::process::Command;
use tracing::debug;

use super::socket::command_socket_path;
use super::types::{Monitor, Workspace};
use super::HyprError;

/// Read size for command replies
const REPLY_CHUNK_SIZE: usize = 8192;

/// Replies Hyprland uses for commands it does not understand
const REJECTED_REPLIES: [&str; 2] = ["unknown request", "invalid command"];

/// Outcome of a successful command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Hyprland acknowledged the command with `ok`
    Ok,
    /// Hyprland returned data (JSON for `j/` requests)
    Data(String),
}

impl Reply {
    /// The reply data, treating a bare `ok` as an error
    pub fn into_data(self, command: &str) -> Result<String, HyprError> {
        match self {
            Reply::Data(data) => Ok(data),
            Reply::Ok => Err(HyprError::EmptyReply {
                command: command.to_string(),
            }),
        }
    }
}

/// Classify a raw reply to `command`
///
/// A single trailing newline is ignored when recognising `ok` and the
/// rejection strings; data replies are returned untouched.
pub fn parse_reply(command: &str, raw: &str) -> Result<Reply, HyprError> {
    let trimmed = raw.strip_suffix('\n').unwrap_or(raw);

    if trimmed == "ok" {
        return Ok(Reply::Ok);
    }
    if REJECTED_REPLIES.contains(&trimmed) {
        return Err(HyprError::RequestRejected {
            command: command.to_string(),
        });
    }
    Ok(Reply::Data(raw.to_string()))
}

/// Client for Hyprland's request/response interfaces
#[derive(Debug, Clone)]
pub struct CommandClient {
    socket_path: PathBuf,
    hyprctl: PathBuf,
}

impl CommandClient {
    /// Create a client for the instance named by the environment
    ///
    /// # Errors
    ///
    /// Returns `HyprError::EnvNotSet` or `HyprError::SocketNotFound` if the
    /// command socket cannot be located.
    pub fn new() -> Result<Self, HyprError> {
        Ok(Self::with_socket(command_socket_path()?))
    }

    /// Create a client for an explicit command socket
    pub fn with_socket(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            hyprctl: PathBuf::from("hyprctl"),
        }
    }

    /// Use a different `hyprctl` executable
    pub fn hyprctl_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.hyprctl = program.into();
        self
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Send `command` over the command socket and read the full reply
    ///
    /// # Errors
    ///
    /// Returns `HyprError::ConnectionFailed` if the socket refuses the
    /// connection, `HyprError::SendFailed` / `HyprError::ReceiveFailed` on
    /// I/O errors and `HyprError::RequestRejected` if Hyprland does not
    /// recognise the command.
    pub async fn send(&self, command: &str) -> Result<Reply, HyprError> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|e| HyprError::ConnectionFailed {
                path: self.socket_path.clone(),
                source: e,
            })?;

        let request = format!("j/{command}");
        debug!(request = %request, "Sending Hyprland command");

        stream
            .write_all(request.as_bytes())
            .await
            .map_err(HyprError::SendFailed)?;
        stream.flush().await.map_err(HyprError::SendFailed)?;

        // Hyprland closes the connection once the reply is written
        let mut reply = Vec::new();
        let mut buf = vec![0; REPLY_CHUNK_SIZE];
        loop {
            let n = stream
                .read(&mut buf)
                .await
                .map_err(HyprError::ReceiveFailed)?;
            if n == 0 {
                break;
            }
            reply.extend_from_slice(&buf[..n]);
        }

        parse_reply(command, &String::from_utf8_lossy(&reply))
    }

    /// Run `hyprctl -j <command>` and classify its output
    ///
    /// The command is split on whitespace into arguments.
    ///
    /// # Errors
    ///
    /// Returns `HyprError::CommandFailed` if `hyprctl` cannot be started or
    /// exits unsuccessfully, and `HyprError::RequestRejected` if Hyprland
    /// does not recognise the command.
    pub async fn hyprctl(&self, command: &str) -> Result<Reply, HyprError> {
        debug!(program = %self.hyprctl.display(), command = %command, "Running hyprctl");

        let output = Command::new(&self.hyprctl)
            .arg("-j")
            .args(command.split_whitespace())
            .output()
            .await
            .map_err(|e| HyprError::CommandFailed {
                command: command.to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(HyprError::CommandFailed {
                command: command.to_string(),
                message: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        parse_reply(command, &String::from_utf8_lossy(&output.stdout))
    }

    async fn query<T: DeserializeOwned>(&self, command: &str) -> Result<T, HyprError> {
        let data = self.send(command).await?.into_data(command)?;
        serde_json::from_str(&data).map_err(HyprError::DeserializeFailed)
    }

    /// All monitors, including disabled ones
    pub async fn monitors(&self) -> Result<Vec<Monitor>, HyprError> {
        self.query("monitors all").await
    }

    /// The monitor that currently has focus
    ///
    /// # Errors
    ///
    /// Returns `HyprError::NoFocusedMonitor` if no monitor reports focus.
    pub async fn focused_monitor(&self) -> Result<Monitor, HyprError> {
        self.monitors()
            .await?
            .into_iter()
            .find(|m| m.focused)
            .ok_or(HyprError::NoFocusedMonitor)
    }

    pub async fn workspaces(&self) -> Result<Vec<Workspace>, HyprError> {
        self.query("workspaces").await
    }

    pub async fn active_workspace(&self) -> Result<Workspace, HyprError> {
        self.query("activeworkspace").await
    }
}
