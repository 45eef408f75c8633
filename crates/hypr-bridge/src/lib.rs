//! Hyprland IPC bridge
//!
//! This crate subscribes to the Hyprland event socket and routes each
//! compositor event to the callbacks registered for it.
//!
//! ## Architecture
//!
//! - `EventTransport`: non-blocking connection to `.socket2.sock`
//! - `FrameBuffer`: splits the byte stream into `event>>payload` frames
//! - `ListenerRegistry` / `Dispatcher`: route frames to `Listener` callbacks
//! - `listen` / `one_shot`: the persistent and single-event session loops
//! - `CommandClient`: request/response queries on `.socket.sock` and `hyprctl`
//!
//! ## Protocol
//!
//! Hyprland writes one event per line to the event socket:
//!
//! ```text
//! workspace>>2
//! activewindow>>kitty,~/src
//! ```
//!
//! There is no length prefix and no escaping; a line always carries exactly
//! one event name and its payload.

mod command;
mod dispatch;
mod error;
mod frame;
mod listener;
mod registry;
mod session;
mod socket;
mod transport;
mod types;

pub use command::{parse_reply, CommandClient, Reply};
pub use dispatch::Dispatcher;
pub use error::HyprError;
pub use frame::{Batch, Frame, FrameBuffer, EVENT_SEPARATOR};
pub use listener::{EventHandler, Listener};
pub use registry::ListenerRegistry;
pub use session::{listen, one_shot, EventSession};
pub use socket::{
    command_socket_path, event_socket_path, instance_dir, INSTANCE_SIGNATURE_ENV,
    RUNTIME_DIR_ENV,
};
pub use transport::{EventTransport, READ_CHUNK_SIZE};
pub use types::{Monitor, Workspace, WorkspaceRef};
