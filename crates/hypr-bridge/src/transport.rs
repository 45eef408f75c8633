//! Event socket transport
//!
//! `EventTransport` owns the single non-blocking connection of a session.
//! Reads are gated on socket readiness: the session waits with
//! `wait_readable()` and then drains one chunk with `read_chunk()`.
//! The connection is closed when the transport is dropped, whichever way
//! the session ends.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::net::UnixStream;
use tracing::{debug, trace};

use super::socket::event_socket_path;
use super::HyprError;

/// Maximum number of bytes taken from the socket per read
pub const READ_CHUNK_SIZE: usize = 4096;

/// Non-blocking connection to the Hyprland event socket
#[derive(Debug)]
pub struct EventTransport {
    stream: UnixStream,
    buf: Vec<u8>,
    socket_path: PathBuf,
}

impl EventTransport {
    /// Connect to the event socket of the instance named by the environment
    ///
    /// # Errors
    ///
    /// Returns `HyprError::EnvNotSet` if the environment is incomplete.
    /// Returns `HyprError::SocketNotFound` if the socket does not exist.
    /// Returns `HyprError::ConnectionFailed` if the connection is refused.
    pub async fn connect() -> Result<Self, HyprError> {
        let socket_path = event_socket_path()?;
        Self::connect_to(&socket_path).await
    }

    /// Connect to an event socket at an explicit path
    ///
    /// # Errors
    ///
    /// Returns `HyprError::SocketNotFound` if the path does not exist.
    /// Returns `HyprError::ConnectionFailed` if the connection is refused.
    pub async fn connect_to(socket_path: &Path) -> Result<Self, HyprError> {
        if !socket_path.exists() {
            return Err(HyprError::SocketNotFound {
                path: socket_path.to_path_buf(),
            });
        }

        // tokio sockets are registered with the reactor in non-blocking mode
        let stream = UnixStream::connect(socket_path)
            .await
            .map_err(|e| HyprError::ConnectionFailed {
                path: socket_path.to_path_buf(),
                source: e,
            })?;

        debug!(path = %socket_path.display(), "Connected to Hyprland event socket");

        Ok(Self {
            stream,
            buf: vec![0; READ_CHUNK_SIZE],
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Path this transport is connected to
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Wait until the socket has data or the peer has closed it
    ///
    /// There is no timeout; this is the only point where a session suspends.
    pub async fn wait_readable(&self) -> Result<(), HyprError> {
        self.stream.readable().await.map_err(HyprError::ReceiveFailed)
    }

    /// Take at most one chunk of bytes without blocking
    ///
    /// Returns `Ok(None)` if the readiness turned out to be spurious.
    ///
    /// # Errors
    ///
    /// Returns `HyprError::Disconnected` if the peer closed the stream.
    /// Returns `HyprError::ReceiveFailed` for any other socket error.
    pub fn read_chunk(&mut self) -> Result<Option<&[u8]>, HyprError> {
        match self.stream.try_read(&mut self.buf) {
            Ok(0) => Err(HyprError::Disconnected),
            Ok(n) => {
                trace!(bytes = n, "Read from event socket");
                Ok(Some(&self.buf[..n]))
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(HyprError::ReceiveFailed(e)),
        }
    }

    /// Wait for and return the next non-empty chunk
    ///
    /// # Errors
    ///
    /// Same as `wait_readable()` and `read_chunk()`.
    pub async fn next_chunk(&mut self) -> Result<&[u8], HyprError> {
        loop {
            self.wait_readable().await?;
            let len = match self.read_chunk()? {
                Some(chunk) => chunk.len(),
                None => continue,
            };
            return Ok(&self.buf[..len]);
        }
    }
}
