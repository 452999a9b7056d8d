use tracing::debug;

use crate::canonical::{
    canonicalize_plain, canonicalize_sized, decanonicalize_plain, decanonicalize_sized,
    CanonicalFactory, FactoryName,
};
use crate::namespace::{FactorySlot, Namespace};

/// Replaces one factory slot with a transformed version of itself.
///
/// The slot's current factory is lifted into canonical shape, handed to
/// `transform`, and the result is wrapped back into the slot's native shape,
/// so the transform never sees arity differences between the entry points.
pub fn apply_patch<F>(namespace: &Namespace, name: FactoryName, transform: F)
where
    F: Fn(CanonicalFactory) -> CanonicalFactory,
{
    debug!(factory = name.as_str(), "patching factory entry point");
    namespace.replace_slot(name, |slot| match slot {
        FactorySlot::Plain(native) => {
            FactorySlot::Plain(decanonicalize_plain(transform(canonicalize_plain(native))))
        }
        FactorySlot::Sized(native) => {
            FactorySlot::Sized(decanonicalize_sized(transform(canonicalize_sized(native))))
        }
    });
}

/// Applies one transform to all four factory entry points.
pub fn apply_patch_to_all<F>(namespace: &Namespace, transform: F)
where
    F: Fn(CanonicalFactory) -> CanonicalFactory,
{
    for name in FactoryName::ALL {
        apply_patch(namespace, name, &transform);
    }
}
