//! Listener registry
//!
//! Groups the listeners of a session by event name. Within a group the
//! listeners keep the order in which they were supplied.

use std::collections::HashMap;

use super::Listener;

/// Event name to listeners mapping for one session
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    buckets: HashMap<Vec<u8>, Vec<Listener>>,
    process_all: bool,
}

impl ListenerRegistry {
    /// Build the registry from the listeners of a session
    ///
    /// Process-all mode is decided here, once: it is on if any listener
    /// asked for it.
    pub fn build<'a>(listeners: impl IntoIterator<Item = &'a Listener>) -> Self {
        let mut buckets: HashMap<Vec<u8>, Vec<Listener>> = HashMap::new();
        let mut process_all = false;

        for listener in listeners {
            process_all |= listener.is_process_all();
            buckets
                .entry(listener.event().to_vec())
                .or_default()
                .push(listener.clone());
        }

        Self {
            buckets,
            process_all,
        }
    }

    /// Listeners registered for `event`, in registration order
    pub fn get(&self, event: &[u8]) -> Option<&[Listener]> {
        self.buckets.get(event).map(Vec::as_slice)
    }

    /// Whether the session runs in process-all mode
    pub fn is_process_all(&self) -> bool {
        self.process_all
    }

    /// Number of distinct event names
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Copy of the buckets for consume-once dispatch
    pub(crate) fn snapshot(&self) -> HashMap<Vec<u8>, Vec<Listener>> {
        self.buckets.clone()
    }
}
