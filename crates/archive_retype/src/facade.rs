use std::sync::Arc;

use tracing::debug;

use archive_surface::{BoxedContainer, BoxedEntry};

use crate::namespace::{ContainerCtor, EntryCtor, Namespace};
use crate::registry::apply_patch_to_all;
use crate::relabel::{relabel_entries, with_interception_installed};
use crate::retype::retype_container;
use crate::subtype::{Retyped, RetypedEntry};

/// Which packaged behaviors [`configure`] installs.
#[derive(Debug, Clone, Copy)]
pub struct ConfigureOptions {
    /// Patch a shallow copy of the namespace instead of the one passed in.
    pub copy_namespace: bool,
    /// Substitute every produced container with a [`Retyped`] wrapper.
    pub retype_container: bool,
    /// Substitute every delivered payload item with a [`RetypedEntry`]
    /// wrapper. Implies `retype_container` and
    /// `enable_event_relabel_infrastructure`.
    pub retype_payload_item: bool,
    /// Install the hub interception table on every produced container without
    /// registering any interceptor.
    pub enable_event_relabel_infrastructure: bool,
}

impl Default for ConfigureOptions {
    fn default() -> Self {
        Self {
            copy_namespace: true,
            retype_container: false,
            retype_payload_item: false,
            enable_event_relabel_infrastructure: false,
        }
    }
}

/// Installs the selected behaviors on `namespace` and returns the handle the
/// caller should use from now on.
///
/// With `copy_namespace` set the original namespace is left untouched and the
/// returned handle owns its own factory table; otherwise the returned handle
/// aliases the one passed in.
pub fn configure(namespace: &Namespace, options: ConfigureOptions) -> Namespace {
    let mut options = options;
    if options.retype_payload_item {
        options.retype_container = true;
        options.enable_event_relabel_infrastructure = true;
    }
    debug!(?options, "configuring namespace");

    let namespace = if options.copy_namespace {
        namespace.shallow_copy()
    } else {
        namespace.clone()
    };

    if options.retype_container {
        let install = options.enable_event_relabel_infrastructure;
        let ctor: ContainerCtor =
            Arc::new(move |base| Box::new(Retyped::transplant(base, install)) as BoxedContainer);
        namespace.set_container_subtype(ctor.clone());
        apply_patch_to_all(&namespace, move |adapter| {
            retype_container(adapter, ctor.clone())
        });
    } else if options.enable_event_relabel_infrastructure {
        apply_patch_to_all(&namespace, with_interception_installed);
    }

    if options.retype_payload_item {
        let ctor: EntryCtor =
            Arc::new(|entry| Box::new(RetypedEntry::transplant(entry)) as BoxedEntry);
        namespace.set_entry_subtype(ctor.clone());
        // Applied after the container patch, so the interceptor lands on the
        // wrapper's hub.
        apply_patch_to_all(&namespace, move |adapter| {
            relabel_entries(adapter, ctor.clone())
        });
    }

    namespace
}
