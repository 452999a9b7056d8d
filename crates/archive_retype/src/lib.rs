#![forbid(unsafe_code)]
//! Interception layer over an archive library's asynchronous factory functions.
//!
//! The layer normalizes the four native factory shapes into one canonical
//! call, lets interception logic be written once against that shape, and can
//! transparently substitute the produced container (and the entries it
//! delivers) with retyped instances, without touching the wrapped library.
//!
//! `configure` is the entry point for the packaged behaviors; `apply_patch` /
//! `apply_patch_to_all` expose the raw patching machinery for custom
//! transforms.

mod canonical;
mod error;
mod facade;
mod namespace;
mod registry;
mod relabel;
mod retype;
mod subtype;

pub use canonical::{
    canonicalize_plain, canonicalize_sized, decanonicalize_plain, decanonicalize_sized,
    normalize_options, CanonicalCall, CanonicalFactory, FactoryDescriptor, FactoryName,
};
pub use error::PatchError;
pub use facade::{configure, ConfigureOptions};
pub use namespace::{ContainerCtor, EntryCtor, FactorySlot, Namespace};
pub use registry::{apply_patch, apply_patch_to_all};
pub use relabel::{relabel_entries, with_interception_installed};
pub use retype::retype_container;
pub use subtype::{Retyped, RetypedEntry};
