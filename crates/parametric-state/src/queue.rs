//! Pending debounced updates.

use std::collections::HashMap;

use parametric_model::ParameterUpdateEvent;

/// Insertion-ordered buffer of parameter updates, keyed by
/// `(componentId, parameter)`.
///
/// A later update to the same key replaces the queued event in place, so a
/// burst of writes collapses into one event that keeps its original position.
type QueueKey = (String, String);

#[derive(Debug, Default)]
pub(crate) struct UpdateQueue {
    order: Vec<QueueKey>,
    entries: HashMap<QueueKey, ParameterUpdateEvent>,
}

impl UpdateQueue {
    pub(crate) fn push(&mut self, event: ParameterUpdateEvent) {
        let key = event.queue_key();
        match self.entries.insert(key.clone(), event) {
            None => self.order.push(key),
            Some(replaced) => tracing::trace!(update = %replaced.path(), "Coalesced queued update"),
        }
    }

    /// Take every queued event in insertion order.
    pub(crate) fn drain(&mut self) -> Vec<ParameterUpdateEvent> {
        let mut entries = std::mem::take(&mut self.entries);
        std::mem::take(&mut self.order)
            .into_iter()
            .filter_map(|key| entries.remove(&key))
            .collect()
    }

    /// Drop queued events of one component.
    pub(crate) fn discard_component(&mut self, component_id: &str) {
        self.entries.retain(|_, e| e.component_id != component_id);
        let entries = &self.entries;
        self.order.retain(|key| entries.contains_key(key));
    }

    pub(crate) fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
