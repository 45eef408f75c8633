//! Event sessions
//!
//! A session is one connection to the event socket together with its
//! framing state. Two loops drive it:
//!
//! - `run` (persistent): dispatches every frame to the registered listeners
//!   until the connection fails. It never returns successfully.
//! - `wait_for` (one-shot): returns after the first frame for a single
//!   target event has been handled.
//!
//! Both loops are single-attempt: a disconnect ends the session with
//! `HyprError::Disconnected` and nothing reconnects. Handlers run inline;
//! the socket is not read again until every handler for the current frame
//! has returned.

use std::convert::Infallible;
use std::path::Path;

use tracing::debug;

use super::{Batch, Dispatcher, EventTransport, FrameBuffer, HyprError, Listener, ListenerRegistry};

/// One connection to the event socket and its pending bytes
#[derive(Debug)]
pub struct EventSession {
    transport: EventTransport,
    buffer: FrameBuffer,
}

impl EventSession {
    /// Open a session on the event socket named by the environment
    ///
    /// # Errors
    ///
    /// Returns a connection error (see `HyprError::is_connection_error`)
    /// if the socket cannot be located or reached.
    pub async fn connect() -> Result<Self, HyprError> {
        Ok(Self::new(EventTransport::connect().await?))
    }

    /// Open a session on an explicit socket path
    ///
    /// # Errors
    ///
    /// Returns `HyprError::SocketNotFound` or `HyprError::ConnectionFailed`.
    pub async fn connect_to(socket_path: &Path) -> Result<Self, HyprError> {
        Ok(Self::new(EventTransport::connect_to(socket_path).await?))
    }

    fn new(transport: EventTransport) -> Self {
        Self {
            transport,
            buffer: FrameBuffer::new(),
        }
    }

    /// Wait for the next read and return the lines it completed
    ///
    /// The batch yields frames in reverse stream order, as produced by
    /// `FrameBuffer`. It is empty if the read only carried part of a line.
    pub async fn next_batch(&mut self) -> Result<Batch, HyprError> {
        let chunk = self.transport.next_chunk().await?;
        Ok(self.buffer.ingest(chunk))
    }

    /// Dispatch events to `listeners` until the session fails
    ///
    /// # Errors
    ///
    /// Always ends with an error: `HyprError::Disconnected` when Hyprland
    /// closes the socket, `HyprError::FrameFormat` for a malformed line, or
    /// `HyprError::Callback` when a handler fails.
    pub async fn run(self, listeners: &[Listener]) -> Result<Infallible, HyprError> {
        self.run_with(Dispatcher::new(ListenerRegistry::build(listeners)))
            .await
    }

    /// Same as `run`, with a prepared dispatcher
    pub async fn run_with(mut self, mut dispatcher: Dispatcher) -> Result<Infallible, HyprError> {
        debug!(
            path = %self.transport.socket_path().display(),
            events = dispatcher.registry().len(),
            process_all = dispatcher.registry().is_process_all(),
            "Listening for Hyprland events"
        );

        loop {
            for frame in self.next_batch().await? {
                dispatcher.dispatch(&frame?)?;
            }
        }
    }

    /// Handle the first frame for `listener`'s event and return
    ///
    /// Frames for other events are skipped.
    ///
    /// # Errors
    ///
    /// Returns `HyprError::Disconnected` if Hyprland closes the socket
    /// before the event arrives, `HyprError::FrameFormat` if a malformed
    /// line is reached first, or `HyprError::Callback` if the handler fails.
    pub async fn wait_for(mut self, listener: &Listener) -> Result<(), HyprError> {
        debug!(
            path = %self.transport.socket_path().display(),
            event = %String::from_utf8_lossy(listener.event()),
            "Waiting for Hyprland event"
        );

        loop {
            for frame in self.next_batch().await? {
                let frame = frame?;
                if frame.event() == listener.event() {
                    return listener
                        .call(frame.payload())
                        .map_err(|source| HyprError::Callback {
                            event: frame.event_name(),
                            source,
                        });
                }
            }
        }
    }
}

/// Connect to Hyprland and dispatch events to `listeners` until failure
///
/// The registry is built before connecting, so the session is ready to
/// dispatch as soon as the first bytes arrive.
///
/// # Example
///
/// ```ignore
/// let listeners = [Listener::new("workspace", |name: &str| -> anyhow::Result<()> {
///     println!("Switched to workspace {name}");
///     Ok(())
/// })];
/// let err = hypr_bridge::listen(&listeners).await.unwrap_err();
/// eprintln!("Event session ended: {err}");
/// ```
pub async fn listen(listeners: &[Listener]) -> Result<Infallible, HyprError> {
    let dispatcher = Dispatcher::new(ListenerRegistry::build(listeners));
    EventSession::connect().await?.run_with(dispatcher).await
}

/// Connect to Hyprland and wait for a single occurrence of `listener`'s event
///
/// # Example
///
/// ```ignore
/// let listener = Listener::new("configreloaded", |_: &str| -> anyhow::Result<()> { Ok(()) });
/// hypr_bridge::one_shot(&listener).await?;
/// ```
pub async fn one_shot(listener: &Listener) -> Result<(), HyprError> {
    EventSession::connect().await?.wait_for(listener).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::UnixListener;
    use tokio::task::JoinHandle;

    use crate::socket::tests::{fake_instance, EnvGuard, ENV_MUTEX};
    use crate::Frame;

    type Log = Arc<Mutex<Vec<String>>>;

    fn recording(event: &str, log: &Log) -> Listener {
        let log = log.clone();
        let tag = event.to_string();
        Listener::new(event, move |payload: &str| -> anyhow::Result<()> {
            log.lock().unwrap().push(format!("{tag}:{payload}"));
            Ok(())
        })
    }

    /// Fake compositor: accepts one client and writes each chunk separately.
    ///
    /// With `hold_open` the server keeps the connection until the client
    /// hangs up; otherwise it closes right after the last chunk.
    fn fake_hyprland(path: PathBuf, chunks: Vec<&'static str>, hold_open: bool) -> JoinHandle<()> {
        let listener = UnixListener::bind(&path).unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            for chunk in chunks {
                stream.write_all(chunk.as_bytes()).await.unwrap();
                stream.flush().await.unwrap();
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            if hold_open {
                let mut rest = Vec::new();
                let _ = stream.read_to_end(&mut rest).await;
            }
        })
    }

    fn socket_in(dir: &TempDir) -> PathBuf {
        dir.path().join(".socket2.sock")
    }

    #[tokio::test]
    async fn test_persistent_session_dispatches_then_disconnects() {
        let temp_dir = TempDir::new().unwrap();
        let path = socket_in(&temp_dir);
        let server = fake_hyprland(
            path.clone(),
            vec!["workspace>>1\nactivewindow>>kitty,~\nworkspace>>2\n"],
            false,
        );

        let log = Log::default();
        let listeners = [recording("workspace", &log), recording("activewindow", &log)];

        let session = EventSession::connect_to(&path).await.unwrap();
        let err = session.run(&listeners).await.unwrap_err();

        assert!(matches!(err, HyprError::Disconnected), "got: {:?}", err);
        // One read, dispatched last line first
        assert_eq!(
            *log.lock().unwrap(),
            vec!["workspace:2", "activewindow:kitty,~", "workspace:1"]
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_frames_split_across_reads() {
        let temp_dir = TempDir::new().unwrap();
        let path = socket_in(&temp_dir);
        let server =
            fake_hyprland(path.clone(), vec!["work", "space>>5\nfocused", "mon>>DP-1,5\n"], false);

        let log = Log::default();
        let listeners = [recording("workspace", &log), recording("focusedmon", &log)];

        let err = EventSession::connect_to(&path)
            .await
            .unwrap()
            .run(&listeners)
            .await
            .unwrap_err();

        assert!(matches!(err, HyprError::Disconnected));
        // Reads may coalesce, which would reverse the two frames
        let mut seen = log.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec!["focusedmon:DP-1,5", "workspace:5"]);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_process_all_session_fires_once_per_event() {
        let temp_dir = TempDir::new().unwrap();
        let path = socket_in(&temp_dir);
        let server = fake_hyprland(
            path.clone(),
            vec![
                "workspace>>1\n",
                "workspace>>2\n",
                "activewindow>>firefox,Mozilla\n",
                "workspace>>3\nactivewindow>>kitty,~\n",
            ],
            false,
        );

        let log = Log::default();
        let listeners = [
            recording("workspace", &log).process_all(true),
            recording("activewindow", &log),
        ];

        let session = EventSession::connect_to(&path).await.unwrap();
        let err = session.run(&listeners).await.unwrap_err();

        assert!(matches!(err, HyprError::Disconnected));
        let seen = log.lock().unwrap().clone();
        assert_eq!(seen.len(), 2, "got: {:?}", seen);
        assert_eq!(seen.iter().filter(|e| e.starts_with("workspace:")).count(), 1);
        assert_eq!(seen.iter().filter(|e| e.starts_with("activewindow:")).count(), 1);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_line_ends_session_after_later_frames() {
        let temp_dir = TempDir::new().unwrap();
        let path = socket_in(&temp_dir);
        let server = fake_hyprland(path.clone(), vec!["noseparatorhere\nworkspace>>1\n"], true);

        let log = Log::default();
        let listeners = [recording("workspace", &log)];

        let err = EventSession::connect_to(&path)
            .await
            .unwrap()
            .run(&listeners)
            .await
            .unwrap_err();

        assert!(matches!(err, HyprError::FrameFormat { .. }), "got: {:?}", err);
        // The batch runs last line first, so the valid frame fires before the error
        assert_eq!(*log.lock().unwrap(), vec!["workspace:1"]);
        // Session dropped its socket, so the fake compositor sees EOF
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_one_shot_matches_before_reaching_malformed_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = socket_in(&temp_dir);
        let server = fake_hyprland(path.clone(), vec!["noseparatorhere\nworkspace>>2\n"], true);

        let log = Log::default();
        let listener = recording("workspace", &log);

        EventSession::connect_to(&path)
            .await
            .unwrap()
            .wait_for(&listener)
            .await
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["workspace:2"]);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_one_shot_malformed_line_before_match() {
        let temp_dir = TempDir::new().unwrap();
        let path = socket_in(&temp_dir);
        let server = fake_hyprland(path.clone(), vec!["workspace>>2\nnoseparatorhere\n"], true);

        let log = Log::default();
        let listener = recording("workspace", &log);

        let err = EventSession::connect_to(&path)
            .await
            .unwrap()
            .wait_for(&listener)
            .await
            .unwrap_err();

        assert!(matches!(err, HyprError::FrameFormat { .. }), "got: {:?}", err);
        assert!(log.lock().unwrap().is_empty());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_callback_error_ends_session() {
        let temp_dir = TempDir::new().unwrap();
        let path = socket_in(&temp_dir);
        let server = fake_hyprland(path.clone(), vec!["workspace>>1\n"], true);

        let listeners = [Listener::new("workspace", |payload: &str| -> anyhow::Result<()> {
            anyhow::bail!("refusing workspace {payload}")
        })];

        let err = EventSession::connect_to(&path)
            .await
            .unwrap()
            .run(&listeners)
            .await
            .unwrap_err();

        match err {
            HyprError::Callback { event, source } => {
                assert_eq!(event, "workspace");
                assert_eq!(source.to_string(), "refusing workspace 1");
            }
            other => panic!("Expected Callback error, got: {:?}", other),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_one_shot_ignores_similar_event_names() {
        let temp_dir = TempDir::new().unwrap();
        let path = socket_in(&temp_dir);
        let server = fake_hyprland(path.clone(), vec!["workspacev>>1\n", "workspace>>2\n"], true);

        let log = Log::default();
        let listener = recording("workspace", &log);

        EventSession::connect_to(&path)
            .await
            .unwrap()
            .wait_for(&listener)
            .await
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["workspace:2"]);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_one_shot_disconnect_before_match() {
        let temp_dir = TempDir::new().unwrap();
        let path = socket_in(&temp_dir);
        let server = fake_hyprland(path.clone(), vec!["workspacev>>1\n"], false);

        let log = Log::default();
        let listener = recording("workspace", &log);

        let err = EventSession::connect_to(&path)
            .await
            .unwrap()
            .wait_for(&listener)
            .await
            .unwrap_err();

        assert!(matches!(err, HyprError::Disconnected));
        assert!(log.lock().unwrap().is_empty());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_listen_uses_environment_socket() {
        let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let _env = EnvGuard::capture();
        let temp_dir = TempDir::new().unwrap();

        let dir = fake_instance(temp_dir.path(), "test_sig");
        let server = fake_hyprland(dir.join(".socket2.sock"), vec!["urgent>>0xdead\n"], false);

        let log = Log::default();
        let err = listen(&[recording("urgent", &log)]).await.unwrap_err();

        assert!(matches!(err, HyprError::Disconnected));
        assert_eq!(*log.lock().unwrap(), vec!["urgent:0xdead"]);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_one_shot_without_socket_is_connection_error() {
        let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let _env = EnvGuard::capture();
        let temp_dir = TempDir::new().unwrap();

        fake_instance(temp_dir.path(), "no_socket");

        let listener = Listener::new("workspace", |_: &str| -> anyhow::Result<()> { Ok(()) });
        let err = one_shot(&listener).await.unwrap_err();

        assert!(err.is_connection_error(), "got: {:?}", err);
    }

    #[tokio::test]
    async fn test_next_batch_empty_for_partial_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = socket_in(&temp_dir);
        let listener = UnixListener::bind(&path).unwrap();

        let mut session = EventSession::connect_to(&path).await.unwrap();
        let (mut server, _) = listener.accept().await.unwrap();

        server.write_all(b"openwindow>>80a6f50,2,kitty,").await.unwrap();
        assert!(session.next_batch().await.unwrap().is_empty());

        server.write_all(b"~\n").await.unwrap();
        let frames: Vec<Frame> = session
            .next_batch()
            .await
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(frames, vec![Frame::new("openwindow", "80a6f50,2,kitty,~")]);

        drop(server);
    }
}
