//! Blocking file I/O used by [`FileProvider`](crate::FileProvider).
//!
//! This module handles:
//! - Writing entries with atomic temp-file-then-rename
//! - Reading entries that may not exist
//! - Listing stored entries

mod load;
mod save;

pub use load::{list_with_extension, read_if_exists};
pub use save::{remove_if_exists, write_atomic};
