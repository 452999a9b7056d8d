#![forbid(unsafe_code)]
//! Minimal line-oriented archive reader used as the wrapped library behind the
//! interception layer.
//!
//! The on-disk format is JSON Lines: one `{"name": ..., "contents": ...}`
//! object per line. Four factory entry points mirror the wrapped library's
//! native calling conventions; [`factory_set`] adapts them to the shared
//! factory surface.

mod entry;
mod error;
mod pack;

pub use entry::PackEntry;
pub use error::PackfileError;
pub use pack::{factory_set, from_buffer, from_file, from_reader, open, Packfile};
