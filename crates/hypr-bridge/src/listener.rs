//! Listener records
//!
//! A `Listener` pairs an event name with the handler that should run when
//! the event arrives. Listeners are cheap to clone and never mutated once
//! built, so the same set can be handed to several sessions.

use std::fmt;
use std::sync::Arc;

/// Something that reacts to the payload of an event
///
/// Closures of the form `Fn(&str) -> anyhow::Result<()>` implement this
/// trait directly.
pub trait EventHandler: Send + Sync {
    /// Handle one event payload
    ///
    /// An error ends the session that invoked the handler.
    fn handle(&self, payload: &str) -> anyhow::Result<()>;
}

impl<F> EventHandler for F
where
    F: Fn(&str) -> anyhow::Result<()> + Send + Sync,
{
    fn handle(&self, payload: &str) -> anyhow::Result<()> {
        self(payload)
    }
}

/// An event name bound to a handler
#[derive(Clone)]
pub struct Listener {
    event: Vec<u8>,
    handler: Arc<dyn EventHandler>,
    process_all: bool,
}

impl Listener {
    /// Create a listener for `event`
    pub fn new(event: impl Into<Vec<u8>>, handler: impl EventHandler + 'static) -> Self {
        Self {
            event: event.into(),
            handler: Arc::new(handler),
            process_all: false,
        }
    }

    /// Switch the session this listener joins into process-all mode
    ///
    /// In process-all mode every event name triggers its listeners at most
    /// once for the rest of the session. The mode applies to all listeners
    /// of the session, not just this one.
    pub fn process_all(mut self, enabled: bool) -> Self {
        self.process_all = enabled;
        self
    }

    pub fn event(&self) -> &[u8] {
        &self.event
    }

    pub fn is_process_all(&self) -> bool {
        self.process_all
    }

    /// Run the handler with `payload`
    pub fn call(&self, payload: &str) -> anyhow::Result<()> {
        self.handler.handle(payload)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("event", &String::from_utf8_lossy(&self.event))
            .field("process_all", &self.process_all)
            .finish_non_exhaustive()
    }
}
