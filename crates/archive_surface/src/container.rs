use std::any::Any;

use crate::events::EventHub;

/// Capability surface of one payload item in a container's entry stream.
pub trait EntryItem: Any + Send {
    fn name(&self) -> &str;
    fn size(&self) -> u64;
    /// Identity hook so retyped instances stay recognizable.
    fn as_any(&self) -> &dyn Any;
}

pub type BoxedEntry = Box<dyn EntryItem>;

/// Capability surface the interception layer needs from a produced container.
///
/// Implementations are handle-like: `boxed_clone` produces another handle to
/// the same underlying state, the way the wrapped library hands out its
/// container objects.
pub trait ContainerOps: Any + Send {
    /// Whether the container is in manual delivery mode.
    fn lazy_entries(&self) -> bool;
    fn set_lazy_entries(&self, lazy: bool);
    /// Asks the container to deliver its next payload item. Delivery is
    /// deferred to a spawned task, never performed inside this call.
    fn read_entry(&self);
    fn close(&self);
    fn entry_count(&self) -> usize;
    /// The hub this container emits on.
    fn hub(&self) -> &EventHub;
    fn as_any(&self) -> &dyn Any;
    fn boxed_clone(&self) -> BoxedContainer;
}

pub type BoxedContainer = Box<dyn ContainerOps>;
