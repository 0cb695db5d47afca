//! Persistent storage for parametric component state.
//!
//! State, presets and anything else the system keeps across sessions go
//! through the [`PersistenceProvider`] contract: an async key/value store of
//! serialized JSON strings. The rest of the system never touches a concrete
//! backend.
//!
//! # Providers
//!
//! - [`MemoryProvider`]: volatile map, with failure injection for tests
//! - [`FileProvider`]: one `<key>.json` file per key, atomic writes
//!
//! # Keys
//!
//! | Key                  | Contents                         |
//! |----------------------|----------------------------------|
//! | `<persistence key>`  | full state snapshot              |
//! | `preset_<id>`        | one preset                       |
//!
//! # Example
//!
//! ```ignore
//! use parametric_persistence::{FileProvider, PersistenceProvider, load_json, save_json};
//!
//! let provider = FileProvider::new("/tmp/parametric");
//! save_json(&provider, "preset_faded", &preset).await?;
//! let loaded: Option<PresetConfig> = load_json(&provider, "preset_faded").await?;
//! ```

mod error;
mod file;
mod io;
mod memory;
mod provider;

pub use error::{PersistenceError, Result};
pub use file::FileProvider;
pub use memory::MemoryProvider;
pub use provider::{PersistenceProvider, load_json, save_json};
