//! Runtime state for parametric components.
//!
//! - [`EventEmitter`]: typed synchronous pub/sub with panic isolation
//! - [`StateManager`]: instances, global parameters, debounced batching,
//!   undo history and auto-persist through a
//!   [`PersistenceProvider`](parametric_persistence::PersistenceProvider)

mod config;
mod emitter;
mod error;
mod history;
mod manager;
mod queue;

pub use config::{DEFAULT_DEBOUNCE_MS, DEFAULT_MAX_HISTORY, DEFAULT_PERSISTENCE_KEY, StateConfig};
pub use emitter::{Event, EventEmitter, HandlerId};
pub use error::{Result, StateError};
pub use manager::{Dispatch, StateManager};
