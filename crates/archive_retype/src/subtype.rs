use std::any::Any;

use archive_surface::{BoxedContainer, BoxedEntry, ContainerOps, EntryItem, EventHub};

/// Container wrapper the facade substitutes for the wrapped library's own
/// container type.
///
/// The wrapper owns a fresh [`EventHub`]; at construction the base container's
/// hub becomes a permanent alias for it, so everything the base emits lands on
/// the wrapper's hub, with listeners registered earlier carried along. All
/// other behavior delegates to the base.
pub struct Retyped {
    inner: BoxedContainer,
    hub: EventHub,
}

impl Retyped {
    /// Takes over `base`, redirecting its event stream onto a hub owned by the
    /// wrapper. `install_interception` pre-installs the interception table on
    /// that hub before any migration happens.
    pub fn transplant(base: BoxedContainer, install_interception: bool) -> Self {
        let hub = EventHub::new();
        if install_interception {
            hub.install_interception();
        }
        base.hub().forward_to(&hub);
        Self { inner: base, hub }
    }

    /// The container this wrapper was built around.
    pub fn base(&self) -> &dyn ContainerOps {
        self.inner.as_ref()
    }
}

impl ContainerOps for Retyped {
    fn lazy_entries(&self) -> bool {
        self.inner.lazy_entries()
    }

    fn set_lazy_entries(&self, lazy: bool) {
        self.inner.set_lazy_entries(lazy);
    }

    fn read_entry(&self) {
        self.inner.read_entry();
    }

    fn close(&self) {
        self.inner.close();
    }

    fn entry_count(&self) -> usize {
        self.inner.entry_count()
    }

    fn hub(&self) -> &EventHub {
        &self.hub
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn boxed_clone(&self) -> BoxedContainer {
        Box::new(Retyped {
            inner: self.inner.boxed_clone(),
            hub: self.hub.clone(),
        })
    }
}

/// Payload-item wrapper substituted for the wrapped library's entry type.
pub struct RetypedEntry {
    inner: BoxedEntry,
}

impl RetypedEntry {
    pub fn transplant(base: BoxedEntry) -> Self {
        Self { inner: base }
    }

    pub fn base(&self) -> &dyn EntryItem {
        self.inner.as_ref()
    }
}

impl EntryItem for RetypedEntry {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn size(&self) -> u64 {
        self.inner.size()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
