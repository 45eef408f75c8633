//! Frame dispatch
//!
//! The dispatcher routes each frame to the listeners registered for its
//! event name and runs their handlers inline.
//!
//! In process-all mode it works from a consume-once copy of the registry:
//! the first frame for an event name takes that name's listeners out of the
//! copy, so later frames with the same name find nothing and are dropped.

use std::collections::HashMap;

use tracing::trace;

use super::{Frame, HyprError, Listener, ListenerRegistry};

/// Routes frames to listeners for one session
#[derive(Debug)]
pub struct Dispatcher {
    registry: ListenerRegistry,
    /// Present only in process-all mode
    remaining: Option<HashMap<Vec<u8>, Vec<Listener>>>,
}

impl Dispatcher {
    pub fn new(registry: ListenerRegistry) -> Self {
        let remaining = registry.is_process_all().then(|| registry.snapshot());
        Self {
            registry,
            remaining,
        }
    }

    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    /// Run every handler registered for the frame's event
    ///
    /// Handlers run in registration order. Frames without listeners are
    /// dropped silently. Returns the number of handlers that ran.
    ///
    /// # Errors
    ///
    /// Returns `HyprError::Callback` as soon as a handler fails; the
    /// remaining handlers for the frame are not run.
    pub fn dispatch(&mut self, frame: &Frame) -> Result<usize, HyprError> {
        let consumed;
        let listeners: &[Listener] = match &mut self.remaining {
            Some(remaining) => match remaining.remove(frame.event()) {
                Some(bucket) => {
                    consumed = bucket;
                    &consumed
                }
                None => return Ok(Self::dropped(frame)),
            },
            None => match self.registry.get(frame.event()) {
                Some(bucket) => bucket,
                None => return Ok(Self::dropped(frame)),
            },
        };

        for listener in listeners {
            listener.call(frame.payload()).map_err(|source| HyprError::Callback {
                event: frame.event_name(),
                source,
            })?;
        }

        trace!(event = %frame.event_name(), handlers = listeners.len(), "Dispatched event");
        Ok(listeners.len())
    }

    fn dropped(frame: &Frame) -> usize {
        trace!(event = %frame.event_name(), "No listeners for event, dropping");
        0
    }
}
