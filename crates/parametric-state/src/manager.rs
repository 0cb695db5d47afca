//! Component and global-parameter state with debounced batching.
//!
//! # Update pipeline
//!
//! Every parameter write goes through one `apply` step that records the old
//! value, stores the new one and bumps `updatedAt`. What happens next depends
//! on the [`Dispatch`] policy:
//!
//! - [`Dispatch::Immediate`]: `ParameterUpdated` is emitted before returning.
//! - [`Dispatch::Debounced`]: the event is queued per component and
//!   parameter (last value wins) and the single debounce timer is re-armed. When it fires, the flush records a history snapshot, emits
//!   the queued events in insertion order and persists once for the batch.
//!
//! The instance map is written eagerly in both cases, so readers always see
//! the latest value; only notification and persistence are deferred.
//!
//! # Undo
//!
//! History snapshots are taken at flush boundaries. `undo` rewinds to the
//! state captured by the previous flush, not to the state before each
//! individual write.
//!
//! # Locking
//!
//! State lives behind one mutex that is never held while handlers run or
//! while persistence is awaited, so handlers may call back into the manager.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use parametric_model::{
    ComponentInstance, ParamValue, ParameterMap, ParameterUpdateEvent, StateEvent, StateSnapshot,
};
use parametric_persistence::{PersistenceProvider, load_json, save_json};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::StateConfig;
use crate::emitter::EventEmitter;
use crate::error::{Result, StateError};
use crate::history::History;
use crate::queue::UpdateQueue;

/// When a parameter write is announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dispatch {
    /// Emit `ParameterUpdated` synchronously.
    Immediate,
    /// Queue the event and flush after the debounce window.
    #[default]
    Debounced,
}

struct State {
    components: BTreeMap<String, ComponentInstance>,
    globals: ParameterMap,
    queue: UpdateQueue,
    history: History,
    timer: Option<JoinHandle<()>>,
    /// Bumped each time the timer is re-armed; a timer only owns the batch
    /// while its generation is current.
    timer_generation: u64,
}

impl State {
    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            timestamp: Utc::now(),
            components: self.components.clone(),
            global_parameters: self.globals.clone(),
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// What started a flush.
#[derive(Debug, Clone, Copy)]
enum Trigger {
    Explicit,
    Timer(u64),
}

enum PersistOp {
    Save(StateSnapshot),
    Delete,
}

struct Shared<P> {
    config: StateConfig,
    provider: Arc<P>,
    events: EventEmitter<StateEvent>,
    state: Mutex<State>,
    /// Sequence number handed to each persistence write, in issue order.
    persist_seq: AtomicU64,
    /// Sequence number of the last write that reached the provider.
    persist_gate: tokio::sync::Mutex<u64>,
}

impl<P: PersistenceProvider> Shared<P> {
    /// Run one persistence write unless a newer one already landed.
    async fn persist_ordered(&self, seq: u64, op: PersistOp) -> Result<bool> {
        let mut last_written = self.persist_gate.lock().await;
        if *last_written > seq {
            tracing::trace!(seq, "Skipping superseded persistence write");
            return Ok(false);
        }
        let key = &self.config.persistence_key;
        match op {
            PersistOp::Save(snapshot) => save_json(&*self.provider, key, &snapshot).await?,
            PersistOp::Delete => self.provider.delete(key).await?,
        }
        *last_written = seq;
        Ok(true)
    }

    fn next_seq(&self) -> u64 {
        self.persist_seq.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Owner of every component instance and global parameter.
///
/// Cloning yields another handle to the same state.
pub struct StateManager<P> {
    shared: Arc<Shared<P>>,
}

impl<P> Clone for StateManager<P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<P: PersistenceProvider> StateManager<P> {
    pub fn new(config: StateConfig, provider: Arc<P>) -> Self {
        let history = History::new(config.max_history);
        Self {
            shared: Arc::new(Shared {
                config,
                provider,
                events: EventEmitter::new(),
                state: Mutex::new(State {
                    components: BTreeMap::new(),
                    globals: ParameterMap::new(),
                    queue: UpdateQueue::default(),
                    history,
                    timer: None,
                    timer_generation: 0,
                }),
                persist_seq: AtomicU64::new(0),
                persist_gate: tokio::sync::Mutex::new(0),
            }),
        }
    }

    pub fn config(&self) -> &StateConfig {
        &self.shared.config
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.shared.provider
    }

    /// Subscription point for every state event.
    pub fn events(&self) -> &EventEmitter<StateEvent> {
        &self.shared.events
    }

    /// Emit an event produced outside the manager (e.g. `ComponentCreated`).
    pub fn emit(&self, event: &StateEvent) {
        self.shared.events.emit(event);
    }

    // ---------------------------------------------------------------------
    // Component lifecycle
    // ---------------------------------------------------------------------

    /// Insert an instance, replacing any instance with the same id.
    pub fn register_component(&self, instance: ComponentInstance) {
        let event = StateEvent::ComponentRegistered {
            component_id: instance.id.clone(),
            component_type: instance.component_type.clone(),
        };
        {
            let mut state = self.shared.state.lock();
            if state.components.insert(instance.id.clone(), instance).is_some() {
                tracing::debug!("Replaced existing component instance");
            }
        }
        self.shared.events.emit(&event);
        self.auto_persist();
    }

    /// Remove an instance and any updates still queued for it.
    pub fn unregister_component(&self, component_id: &str) -> Result<ComponentInstance> {
        let removed = {
            let mut state = self.shared.state.lock();
            let removed = state.components.remove(component_id).ok_or_else(|| {
                StateError::ComponentNotFound {
                    component_id: component_id.to_string(),
                }
            })?;
            state.queue.discard_component(component_id);
            removed
        };
        self.shared.events.emit(&StateEvent::ComponentUnregistered {
            component_id: removed.id.clone(),
            component_type: removed.component_type.clone(),
        });
        self.auto_persist();
        Ok(removed)
    }

    /// Read-only copy of one instance.
    pub fn get_component(&self, component_id: &str) -> Option<ComponentInstance> {
        self.shared.state.lock().components.get(component_id).cloned()
    }

    pub fn get_components_by_type(&self, component_type: &str) -> Vec<ComponentInstance> {
        self.shared
            .state
            .lock()
            .components
            .values()
            .filter(|c| c.component_type == component_type)
            .cloned()
            .collect()
    }

    /// Every instance, ordered by id.
    pub fn components(&self) -> Vec<ComponentInstance> {
        self.shared
            .state
            .lock()
            .components
            .values()
            .cloned()
            .collect()
    }

    pub fn component_ids(&self) -> Vec<String> {
        self.shared.state.lock().components.keys().cloned().collect()
    }

    /// Schema id of an instance, without cloning its parameters.
    pub fn component_type(&self, component_id: &str) -> Option<String> {
        self.shared
            .state
            .lock()
            .components
            .get(component_id)
            .map(|c| c.component_type.clone())
    }

    pub fn contains_component(&self, component_id: &str) -> bool {
        self.shared.state.lock().components.contains_key(component_id)
    }

    // ---------------------------------------------------------------------
    // Parameter updates
    // ---------------------------------------------------------------------

    /// Write one parameter.
    ///
    /// The component and key are checked before anything is queued, so an
    /// unknown id fails here even on the debounced path.
    pub fn update_parameter(
        &self,
        component_id: &str,
        key: &str,
        value: ParamValue,
        dispatch: Dispatch,
    ) -> Result<ParameterUpdateEvent> {
        let mut events = self.apply(component_id, vec![(key.to_string(), value)], dispatch)?;
        Ok(events.remove(0))
    }

    /// Write several parameters of one component. Either every key exists and
    /// all are written, or nothing changes.
    pub fn update_parameters(
        &self,
        component_id: &str,
        updates: ParameterMap,
        dispatch: Dispatch,
    ) -> Result<Vec<ParameterUpdateEvent>> {
        self.apply(component_id, updates.into_iter().collect(), dispatch)
    }

    /// The single write primitive behind both dispatch policies.
    fn apply(
        &self,
        component_id: &str,
        updates: Vec<(String, ParamValue)>,
        dispatch: Dispatch,
    ) -> Result<Vec<ParameterUpdateEvent>> {
        let events = {
            let mut state = self.shared.state.lock();
            let instance = state.components.get_mut(component_id).ok_or_else(|| {
                StateError::ComponentNotFound {
                    component_id: component_id.to_string(),
                }
            })?;

            if let Some((missing, _)) = updates
                .iter()
                .find(|(key, _)| !instance.parameters.contains_key(key))
            {
                return Err(StateError::UnknownParameter {
                    component_id: component_id.to_string(),
                    component_type: instance.component_type.clone(),
                    parameter: missing.clone(),
                });
            }

            instance.metadata.touch();
            let timestamp = instance.metadata.updated_at;
            let mut events = Vec::with_capacity(updates.len());
            for (key, value) in updates {
                let Some(slot) = instance.parameters.get_mut(&key) else {
                    continue;
                };
                let old_value = std::mem::replace(slot, value.clone());
                events.push(ParameterUpdateEvent {
                    component_id: instance.id.clone(),
                    component_type: instance.component_type.clone(),
                    parameter: key,
                    old_value,
                    new_value: value,
                    timestamp,
                });
            }

            if dispatch == Dispatch::Debounced {
                for event in &events {
                    state.queue.push(event.clone());
                }
            }
            events
        };

        match dispatch {
            Dispatch::Immediate => {
                for event in &events {
                    self.shared
                        .events
                        .emit(&StateEvent::ParameterUpdated(event.clone()));
                }
                self.auto_persist();
            }
            Dispatch::Debounced => self.schedule_flush(),
        }
        Ok(events)
    }

    /// Number of queued, not yet emitted updates.
    pub fn pending_count(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    /// (Re)arm the debounce timer. Without an async runtime the queue waits
    /// for an explicit [`flush`](Self::flush).
    fn schedule_flush(&self) {
        let Ok(runtime) = Handle::try_current() else {
            tracing::debug!("No async runtime; queued updates wait for an explicit flush");
            return;
        };
        let manager = self.clone();
        let delay = self.shared.config.debounce();

        let mut state = self.shared.state.lock();
        state.cancel_timer();
        state.timer_generation += 1;
        let generation = state.timer_generation;
        state.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            manager.flush_batch(Trigger::Timer(generation));
        }));
    }

    /// Drain the queue now: record history, emit queued events in order, and
    /// persist in the background. Returns how many events were emitted.
    pub fn flush(&self) -> usize {
        self.flush_batch(Trigger::Explicit)
    }

    /// Like [`flush`](Self::flush) but awaits the persistence write and
    /// reports its failure.
    pub async fn flush_and_persist(&self) -> Result<usize> {
        let Some((events, snapshot)) = self.drain(Trigger::Explicit) else {
            return Ok(0);
        };
        self.emit_updates(&events);
        let seq = self.shared.next_seq();
        self.shared
            .persist_ordered(seq, PersistOp::Save(snapshot))
            .await?;
        Ok(events.len())
    }

    fn flush_batch(&self, trigger: Trigger) -> usize {
        let Some((events, snapshot)) = self.drain(trigger) else {
            return 0;
        };
        self.emit_updates(&events);
        if self.shared.config.auto_persist {
            self.persist_in_background(PersistOp::Save(snapshot));
        }
        events.len()
    }

    fn drain(&self, trigger: Trigger) -> Option<(Vec<ParameterUpdateEvent>, StateSnapshot)> {
        let mut state = self.shared.state.lock();
        match trigger {
            Trigger::Explicit => state.cancel_timer(),
            // Re-armed after this timer woke up; the newer timer owns the batch.
            Trigger::Timer(generation) if generation != state.timer_generation => {
                tracing::trace!(generation, "Stale debounce timer fired");
                return None;
            }
            // Called from the timer task itself; just forget the handle.
            Trigger::Timer(_) => state.timer = None,
        }
        if state.queue.is_empty() {
            return None;
        }
        let snapshot = state.snapshot();
        if self.shared.config.undo_enabled {
            state.history.push(snapshot.clone());
        }
        let events = state.queue.drain();
        tracing::debug!(count = events.len(), "Flushing batched parameter updates");
        Some((events, snapshot))
    }

    fn emit_updates(&self, events: &[ParameterUpdateEvent]) {
        for event in events {
            self.shared
                .events
                .emit(&StateEvent::ParameterUpdated(event.clone()));
        }
    }

    // ---------------------------------------------------------------------
    // Global parameters
    // ---------------------------------------------------------------------

    /// Set a global parameter. Emits immediately and persists. Returns the
    /// previous value.
    pub fn set_global_parameter(&self, key: &str, value: ParamValue) -> Option<ParamValue> {
        let old_value = self
            .shared
            .state
            .lock()
            .globals
            .insert(key.to_string(), value.clone());
        self.shared.events.emit(&StateEvent::GlobalParameterUpdated {
            key: key.to_string(),
            old_value: old_value.clone(),
            new_value: value,
        });
        self.auto_persist();
        old_value
    }

    pub fn get_global_parameter(&self, key: &str) -> Option<ParamValue> {
        self.shared.state.lock().globals.get(key).cloned()
    }

    pub fn global_parameters(&self) -> ParameterMap {
        self.shared.state.lock().globals.clone()
    }

    // ---------------------------------------------------------------------
    // Snapshots, undo, clear
    // ---------------------------------------------------------------------

    /// Full copy of component and global state.
    pub fn get_snapshot(&self) -> StateSnapshot {
        self.shared.state.lock().snapshot()
    }

    /// Replace all state with `snapshot`.
    ///
    /// Queued updates are discarded and the timer cancelled: they describe
    /// writes the restore has overwritten.
    pub fn restore_snapshot(&self, snapshot: StateSnapshot) {
        self.restore(snapshot, self.shared.config.auto_persist);
    }

    fn restore(&self, snapshot: StateSnapshot, persist: bool) {
        let timestamp = snapshot.timestamp;
        {
            let mut state = self.shared.state.lock();
            state.cancel_timer();
            state.queue.clear();
            state.components.clear();
            state.globals.clear();
            state.components.extend(snapshot.components);
            state.globals.extend(snapshot.global_parameters);
        }
        tracing::debug!(%timestamp, "Restored state snapshot");
        self.shared
            .events
            .emit(&StateEvent::StateRestored { timestamp });
        if persist {
            self.auto_persist();
        }
    }

    /// Roll back to the snapshot recorded by the previous flush.
    ///
    /// # Errors
    ///
    /// [`StateError::NothingToUndo`] when fewer than two snapshots exist.
    pub fn undo(&self) -> Result<StateSnapshot> {
        let target = {
            let mut state = self.shared.state.lock();
            let depth = state.history.len();
            state
                .history
                .rewind()
                .ok_or(StateError::NothingToUndo { depth })?
        };
        self.restore_snapshot(target.clone());
        Ok(target)
    }

    /// Number of snapshots available to undo through.
    pub fn history_len(&self) -> usize {
        self.shared.state.lock().history.len()
    }

    /// Wipe every instance, global parameter, queued update and history
    /// snapshot, and delete the persisted copy.
    pub fn clear(&self) {
        {
            let mut state = self.shared.state.lock();
            state.cancel_timer();
            state.queue.clear();
            state.history.clear();
            state.components.clear();
            state.globals.clear();
        }
        self.shared.events.emit(&StateEvent::StateCleared);
        self.persist_in_background(PersistOp::Delete);
    }

    // ---------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------

    /// Write the current snapshot and wait for the provider.
    pub async fn persist(&self) -> Result<()> {
        let snapshot = self.get_snapshot();
        let seq = self.shared.next_seq();
        self.shared
            .persist_ordered(seq, PersistOp::Save(snapshot))
            .await?;
        tracing::info!(key = %self.shared.config.persistence_key, "Persisted state snapshot");
        Ok(())
    }

    /// Restore the snapshot stored under the persistence key, if any.
    /// Returns whether one was found.
    pub async fn load_persisted(&self) -> Result<bool> {
        let Some(snapshot) = self.load_snapshot().await? else {
            return Ok(false);
        };
        self.restore_loaded(snapshot);
        Ok(true)
    }

    /// Read the snapshot stored under the persistence key without applying it.
    pub async fn load_snapshot(&self) -> Result<Option<StateSnapshot>> {
        let key = &self.shared.config.persistence_key;
        let snapshot = load_json::<_, StateSnapshot>(&*self.shared.provider, key).await?;
        match &snapshot {
            Some(snapshot) => tracing::info!(
                key = %key,
                components = snapshot.components.len(),
                "Loaded persisted state"
            ),
            None => tracing::debug!(key = %key, "No persisted state found"),
        }
        Ok(snapshot)
    }

    /// Replace all state with a snapshot that came from storage. Unlike
    /// [`restore_snapshot`](Self::restore_snapshot), nothing is written back.
    pub fn restore_loaded(&self, snapshot: StateSnapshot) {
        self.restore(snapshot, false);
    }

    fn auto_persist(&self) {
        if self.shared.config.auto_persist {
            let snapshot = self.get_snapshot();
            self.persist_in_background(PersistOp::Save(snapshot));
        }
    }

    /// Best-effort write: failures are logged, never returned. In-memory
    /// state stays authoritative even when the stored copy lags.
    fn persist_in_background(&self, op: PersistOp) {
        let Ok(runtime) = Handle::try_current() else {
            tracing::debug!("No async runtime; skipping background persistence");
            return;
        };
        let seq = self.shared.next_seq();
        let shared = Arc::clone(&self.shared);
        runtime.spawn(async move {
            if let Err(error) = shared.persist_ordered(seq, op).await {
                tracing::warn!(
                    key = %shared.config.persistence_key,
                    %error,
                    "Auto-persist failed; stored state is behind memory"
                );
            }
        });
    }
}
