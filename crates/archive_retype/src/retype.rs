use std::sync::Arc;

use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::trace;

use archive_surface::FactoryError;

use crate::canonical::{CanonicalCall, CanonicalFactory};
use crate::error::PatchError;
use crate::namespace::ContainerCtor;

/// Wraps a canonical factory so every container it produces is rebuilt through
/// `ctor` before the caller sees it.
///
/// Unless the caller explicitly asked for manual delivery, the underlying
/// open is forced into manual mode so no entry can be delivered before the
/// rebuilt container's hub is in place. Once the swap is done the requested
/// mode is restored and a single delivery is kicked off, which in automatic
/// mode restarts the pump. Restarting the pump carries the same runtime
/// requirement as opening in automatic mode directly: the delivery task must
/// schedule behind the caller, so anywhere but a current-thread runtime the
/// call fails with [`PatchError::UnsupportedRuntime`] instead of losing
/// events.
pub fn retype_container(adapter: CanonicalFactory, ctor: ContainerCtor) -> CanonicalFactory {
    Arc::new(move |mut call: CanonicalCall| {
        let requested = call.options.lazy_entries;
        let forced = requested != Some(true);
        if forced {
            call.options.lazy_entries = Some(true);
        }
        let adapter = adapter.clone();
        let ctor = ctor.clone();
        Box::pin(async move {
            if forced {
                if let Ok(handle) = Handle::try_current() {
                    if !matches!(handle.runtime_flavor(), RuntimeFlavor::CurrentThread) {
                        return Err(Box::new(PatchError::UnsupportedRuntime) as FactoryError);
                    }
                }
            }
            let base = adapter(call).await?;
            let retyped = ctor(base);
            if forced {
                trace!("restoring requested delivery mode after container swap");
                retyped.set_lazy_entries(requested.unwrap_or(false));
                retyped.read_entry();
            }
            Ok(retyped)
        })
    })
}
