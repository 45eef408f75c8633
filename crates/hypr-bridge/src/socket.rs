//! Socket discovery
//!
//! Hyprland creates both of its IPC sockets in a per-instance directory:
//!
//! - `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock` for commands
//! - `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket2.sock` for events
//!
//! The variables are read every time a path is requested, so a session
//! always connects to the instance named by the current environment.

use std::path::{Path, PathBuf};

use super::HyprError;

/// Environment variable holding the running compositor's instance signature
pub const INSTANCE_SIGNATURE_ENV: &str = "HYPRLAND_INSTANCE_SIGNATURE";

/// Environment variable holding the user's runtime directory
pub const RUNTIME_DIR_ENV: &str = "XDG_RUNTIME_DIR";

const COMMAND_SOCKET_NAME: &str = ".socket.sock";
const EVENT_SOCKET_NAME: &str = ".socket2.sock";

fn read_env(var: &'static str) -> Result<String, HyprError> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(HyprError::EnvNotSet { var }),
    }
}

/// Resolve the per-instance socket directory from the environment
///
/// # Errors
///
/// Returns `HyprError::EnvNotSet` if either variable is unset or empty.
pub fn instance_dir() -> Result<PathBuf, HyprError> {
    let runtime_dir = read_env(RUNTIME_DIR_ENV)?;
    let signature = read_env(INSTANCE_SIGNATURE_ENV)?;

    Ok(PathBuf::from(runtime_dir).join("hypr").join(signature))
}

fn existing_socket(dir: &Path, name: &str) -> Result<PathBuf, HyprError> {
    let path = dir.join(name);
    if !path.exists() {
        return Err(HyprError::SocketNotFound { path });
    }
    Ok(path)
}

/// Path of the event socket (`.socket2.sock`)
///
/// # Errors
///
/// Returns `HyprError::EnvNotSet` if the environment is incomplete.
/// Returns `HyprError::SocketNotFound` if the socket does not exist.
pub fn event_socket_path() -> Result<PathBuf, HyprError> {
    existing_socket(&instance_dir()?, EVENT_SOCKET_NAME)
}

/// Path of the command socket (`.socket.sock`)
///
/// # Errors
///
/// Returns `HyprError::EnvNotSet` if the environment is incomplete.
/// Returns `HyprError::SocketNotFound` if the socket does not exist.
pub fn command_socket_path() -> Result<PathBuf, HyprError> {
    existing_socket(&instance_dir()?, COMMAND_SOCKET_NAME)
}
