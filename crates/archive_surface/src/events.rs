use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::container::BoxedEntry;
use crate::factory::FactoryError;

/// The named events a container can deliver.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum EventKind {
    Entry,
    End,
    Close,
    Error,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Entry,
        EventKind::End,
        EventKind::Close,
        EventKind::Error,
    ];
}

/// An event together with its payload.
pub enum ContainerEvent {
    /// One payload item was delivered.
    Entry(BoxedEntry),
    /// No more items; fires exactly once per container.
    End,
    Close,
    Error(FactoryError),
}

impl ContainerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ContainerEvent::Entry(_) => EventKind::Entry,
            ContainerEvent::End => EventKind::End,
            ContainerEvent::Close => EventKind::Close,
            ContainerEvent::Error(_) => EventKind::Error,
        }
    }
}

impl fmt::Debug for ContainerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerEvent::Entry(entry) => f.debug_tuple("Entry").field(&entry.name()).finish(),
            ContainerEvent::End => f.write_str("End"),
            ContainerEvent::Close => f.write_str("Close"),
            ContainerEvent::Error(err) => f.debug_tuple("Error").field(&err.to_string()).finish(),
        }
    }
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum HubError {
    #[error("event interception infrastructure is not installed on this hub")]
    InterceptionNotInstalled,
}

type ListenerFn = Box<dyn FnMut(&ContainerEvent) + Send>;
type InterceptorFn = Box<dyn FnMut(ContainerEvent) -> ContainerEvent + Send>;

struct ListenerSlot {
    kind: EventKind,
    callback: Arc<Mutex<ListenerFn>>,
}

struct InterceptorSlot {
    kind: EventKind,
    callback: Arc<Mutex<InterceptorFn>>,
}

#[derive(Default)]
struct HubInner {
    listeners: Vec<ListenerSlot>,
    /// `None` until [`EventHub::install_interception`] runs.
    interceptors: Option<Vec<InterceptorSlot>>,
    forward: Option<EventHub>,
    queue: VecDeque<ContainerEvent>,
    dispatching: bool,
}

/// Cheaply cloneable handle to a listener/interceptor table.
///
/// Dispatch is queue-drained: an event emitted from inside a listener is queued
/// and delivered in order after the current event finishes, never recursively.
/// Listeners run without the hub lock held.
#[derive(Clone)]
pub struct EventHub {
    inner: Arc<Mutex<HubInner>>,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHub {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HubInner::default())),
        }
    }

    /// Registers an external listener for one event kind.
    pub fn on(&self, kind: EventKind, callback: impl FnMut(&ContainerEvent) + Send + 'static) {
        self.inner.lock().listeners.push(ListenerSlot {
            kind,
            callback: Arc::new(Mutex::new(Box::new(callback))),
        });
    }

    /// Installs the interception table. Idempotent: a second call never clears
    /// interceptors already registered.
    pub fn install_interception(&self) {
        let mut inner = self.inner.lock();
        if inner.interceptors.is_none() {
            inner.interceptors = Some(Vec::new());
        }
    }

    pub fn interception_installed(&self) -> bool {
        self.inner.lock().interceptors.is_some()
    }

    /// Registers a payload-replacing interceptor. Interceptors run before any
    /// listener observes the event.
    pub fn intercept(
        &self,
        kind: EventKind,
        callback: impl FnMut(ContainerEvent) -> ContainerEvent + Send + 'static,
    ) -> Result<(), HubError> {
        let mut inner = self.inner.lock();
        match inner.interceptors.as_mut() {
            Some(table) => {
                table.push(InterceptorSlot {
                    kind,
                    callback: Arc::new(Mutex::new(Box::new(callback))),
                });
                Ok(())
            }
            None => Err(HubError::InterceptionNotInstalled),
        }
    }

    /// Turns this hub into a pure emission alias for `target`.
    ///
    /// Listeners, interceptors, and queued events registered so far migrate to
    /// `target` and keep working there. Listeners registered on this hub
    /// afterwards never fire; every later emission lands on `target`.
    pub fn forward_to(&self, target: &EventHub) {
        let (listeners, interceptors, queued) = {
            let mut inner = self.inner.lock();
            inner.forward = Some(target.clone());
            (
                std::mem::take(&mut inner.listeners),
                inner.interceptors.take(),
                std::mem::take(&mut inner.queue),
            )
        };
        {
            let mut inner = target.inner.lock();
            inner.listeners.extend(listeners);
            if let Some(migrated) = interceptors {
                match inner.interceptors.as_mut() {
                    Some(table) => table.extend(migrated),
                    None => inner.interceptors = Some(migrated),
                }
            }
        }
        for event in queued {
            target.emit(event);
        }
    }

    /// Delivers an event: interceptors for its kind first, then listeners, in
    /// registration order.
    pub fn emit(&self, event: ContainerEvent) {
        let forward = self.inner.lock().forward.clone();
        if let Some(target) = forward {
            target.emit(event);
            return;
        }
        {
            let mut inner = self.inner.lock();
            inner.queue.push_back(event);
            if inner.dispatching {
                return;
            }
            inner.dispatching = true;
        }
        self.drain();
    }

    fn drain(&self) {
        loop {
            let event = {
                let mut inner = self.inner.lock();
                match inner.queue.pop_front() {
                    Some(event) => event,
                    None => {
                        inner.dispatching = false;
                        return;
                    }
                }
            };
            let event = self.run_interceptors(event);
            let listeners: Vec<Arc<Mutex<ListenerFn>>> = {
                let inner = self.inner.lock();
                inner
                    .listeners
                    .iter()
                    .filter(|slot| slot.kind == event.kind())
                    .map(|slot| slot.callback.clone())
                    .collect()
            };
            for callback in listeners {
                (*callback.lock())(&event);
            }
        }
    }

    fn run_interceptors(&self, event: ContainerEvent) -> ContainerEvent {
        let chain: Vec<Arc<Mutex<InterceptorFn>>> = {
            let inner = self.inner.lock();
            match inner.interceptors.as_ref() {
                Some(table) => table
                    .iter()
                    .filter(|slot| slot.kind == event.kind())
                    .map(|slot| slot.callback.clone())
                    .collect(),
                None => Vec::new(),
            }
        };
        let mut event = event;
        for callback in chain {
            event = (*callback.lock())(event);
        }
        event
    }
}
