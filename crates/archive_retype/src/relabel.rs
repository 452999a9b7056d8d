use std::sync::Arc;

use archive_surface::{ContainerEvent, EventKind, FactoryError};

use crate::canonical::{CanonicalCall, CanonicalFactory};
use crate::namespace::EntryCtor;

/// Wraps a canonical factory so every entry event the produced container
/// emits carries a payload rebuilt through `ctor`.
///
/// Registration targets the hub the caller observes, so on a retyped
/// container the interceptor lands on the wrapper's hub. The hub must have
/// its interception table installed; a misconfigured pipeline surfaces as a
/// factory error rather than silently passing entries through.
pub fn relabel_entries(adapter: CanonicalFactory, ctor: EntryCtor) -> CanonicalFactory {
    Arc::new(move |call: CanonicalCall| {
        let adapter = adapter.clone();
        let ctor = ctor.clone();
        Box::pin(async move {
            let container = adapter(call).await?;
            container
                .hub()
                .intercept(EventKind::Entry, move |event| match event {
                    ContainerEvent::Entry(entry) => ContainerEvent::Entry(ctor(entry)),
                    other => other,
                })
                .map_err(|err| Box::new(err) as FactoryError)?;
            Ok(container)
        })
    })
}

/// Wraps a canonical factory so every produced container comes back with its
/// hub's interception table installed, without any other behavior change.
pub fn with_interception_installed(adapter: CanonicalFactory) -> CanonicalFactory {
    Arc::new(move |call: CanonicalCall| {
        let adapter = adapter.clone();
        Box::pin(async move {
            let container = adapter(call).await?;
            container.hub().install_interception();
            Ok(container)
        })
    })
}
