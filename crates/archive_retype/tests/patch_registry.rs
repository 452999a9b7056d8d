mod support;

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;

use archive_retype::{
    apply_patch, apply_patch_to_all, CanonicalCall, CanonicalFactory, FactoryName, PatchError,
};
use archive_surface::{BoxedContainer, ContainerOps, EventHub, OpenOptions};

use support::{call_factory, fixture_bytes, fixture_file, namespace};

fn recording_transform(
    seen: Arc<Mutex<Vec<(String, Option<u64>, OpenOptions)>>>,
    label: &'static str,
) -> impl Fn(CanonicalFactory) -> CanonicalFactory {
    move |adapter| {
        let seen = seen.clone();
        Arc::new(move |call: CanonicalCall| {
            seen.lock()
                .push((label.to_string(), call.total_size, call.options));
            adapter(call)
        })
    }
}

#[tokio::test]
async fn patched_factories_see_the_canonical_call_shape() {
    let file = fixture_file();
    let ns = namespace();
    let seen = Arc::new(Mutex::new(Vec::new()));
    apply_patch_to_all(&ns, recording_transform(seen.clone(), "probe"));

    for name in FactoryName::ALL {
        call_factory(&ns, name, file.path(), None).await.unwrap();
    }

    let calls = seen.lock().clone();
    assert_eq!(calls.len(), 4);
    let fixture_len = fixture_bytes().len() as u64;
    for ((_, total_size, options), name) in calls.iter().zip(FactoryName::ALL) {
        // Omitted options arrive defaulted.
        assert_eq!(*options, OpenOptions::default());
        if name.descriptor().accepts_total_size {
            assert_eq!(*total_size, Some(fixture_len));
        } else {
            assert_eq!(*total_size, None);
        }
    }
}

#[tokio::test]
async fn patches_can_rewrite_arguments_before_the_native_factory_runs() {
    let ns = namespace();
    apply_patch(&ns, FactoryName::FromBuffer, |adapter| {
        Arc::new(move |mut call: CanonicalCall| {
            call.options.lazy_entries = Some(true);
            adapter(call)
        })
    });

    // The caller asked for automatic delivery; the patch overrode it.
    let container = ns.from_buffer(fixture_bytes(), None).await.unwrap();
    assert!(container.lazy_entries());
}

struct Tagged {
    inner: BoxedContainer,
}

impl ContainerOps for Tagged {
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
        self.inner.hub()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn boxed_clone(&self) -> BoxedContainer {
        Box::new(Tagged {
            inner: self.inner.boxed_clone(),
        })
    }
}

#[tokio::test]
async fn patches_can_substitute_the_produced_container() {
    let file = fixture_file();
    let ns = namespace();
    apply_patch_to_all(&ns, |adapter| {
        Arc::new(move |call: CanonicalCall| {
            let adapter = adapter.clone();
            Box::pin(async move {
                let inner = adapter(call).await?;
                Ok(Box::new(Tagged { inner }) as BoxedContainer)
            })
        })
    });

    let lazy = Some(OpenOptions {
        lazy_entries: Some(true),
        ..OpenOptions::default()
    });
    for name in FactoryName::ALL {
        let container = call_factory(&ns, name, file.path(), lazy).await.unwrap();
        assert!(container.as_any().downcast_ref::<Tagged>().is_some());
    }
}

#[tokio::test]
async fn later_patches_wrap_earlier_ones() {
    let ns = namespace();
    let order = Arc::new(Mutex::new(Vec::new()));
    apply_patch(
        &ns,
        FactoryName::FromBuffer,
        recording_transform(order.clone(), "first"),
    );
    apply_patch(
        &ns,
        FactoryName::FromBuffer,
        recording_transform(order.clone(), "second"),
    );

    ns.from_buffer(fixture_bytes(), None).await.unwrap();

    let labels: Vec<String> = order.lock().iter().map(|(label, _, _)| label.clone()).collect();
    assert_eq!(labels, ["second", "first"]);
}

#[test]
fn patching_only_touches_the_named_slot() {
    let ns = namespace();
    let before: Vec<_> = FactoryName::ALL
        .into_iter()
        .map(|name| ns.slot(name))
        .collect();

    apply_patch(&ns, FactoryName::Open, |adapter| adapter);

    for (name, before) in FactoryName::ALL.into_iter().zip(&before) {
        let unchanged = ns.slot(name).ptr_eq(before);
        assert_eq!(unchanged, name != FactoryName::Open);
    }
}

#[test]
fn factory_names_resolve_from_strings() {
    assert_eq!("open".parse::<FactoryName>().unwrap(), FactoryName::Open);
    assert_eq!(
        "from_magic".parse::<FactoryName>().unwrap_err(),
        PatchError::UnknownFactory {
            name: "from_magic".to_string()
        }
    );
}
