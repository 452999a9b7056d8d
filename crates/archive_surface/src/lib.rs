#![forbid(unsafe_code)]
//! Shared vocabulary spoken on both sides of the archive interception boundary.
//!
//! This crate carries no policy of its own. It provides:
//! - An event hub with ordered dispatch, payload interception, and forwarding.
//! - The capability traits of produced containers and payload entries.
//! - The canonical source argument and the native factory signatures.

mod container;
mod events;
mod factory;
mod options;
mod source;

pub use container::{BoxedContainer, BoxedEntry, ContainerOps, EntryItem};
pub use events::{ContainerEvent, EventHub, EventKind, HubError};
pub use factory::{
    FactoryError, FactoryFuture, FactoryResult, FactorySet, NativeFactory, NativeSizedFactory,
};
pub use options::OpenOptions;
pub use source::{BufferSource, Source, SourceReader};
