use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use archive_surface::{
    BoxedContainer, BoxedEntry, FactoryResult, FactorySet, NativeFactory, NativeSizedFactory,
    OpenOptions, Source, SourceReader,
};

use crate::canonical::FactoryName;

/// Constructor of the container subtype the facade attaches to a namespace.
pub type ContainerCtor = Arc<dyn Fn(BoxedContainer) -> BoxedContainer + Send + Sync>;

/// Constructor of the payload-entry subtype.
pub type EntryCtor = Arc<dyn Fn(BoxedEntry) -> BoxedEntry + Send + Sync>;

#[derive(Clone)]
struct NamespaceInner {
    open: NativeFactory,
    from_file: NativeFactory,
    from_buffer: NativeFactory,
    from_reader: NativeSizedFactory,
    container_subtype: Option<ContainerCtor>,
    entry_subtype: Option<EntryCtor>,
}

/// One patchable factory slot. `ptr_eq` checks reference identity, the way a
/// caller verifies a factory was (or was not) replaced.
#[derive(Clone)]
pub enum FactorySlot {
    Plain(NativeFactory),
    Sized(NativeSizedFactory),
}

impl FactorySlot {
    pub fn ptr_eq(&self, other: &FactorySlot) -> bool {
        match (self, other) {
            (FactorySlot::Plain(a), FactorySlot::Plain(b)) => Arc::ptr_eq(a, b),
            (FactorySlot::Sized(a), FactorySlot::Sized(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Handle to the wrapped library's exported surface: the four factory slots
/// plus the subtype constructors attached at configuration time.
///
/// Clones alias the same table; [`Namespace::shallow_copy`] produces a new
/// table holding the same factory references, so patching the copy leaves the
/// original untouched.
#[derive(Clone)]
pub struct Namespace {
    inner: Arc<Mutex<NamespaceInner>>,
}

impl Namespace {
    pub fn from_factories(set: FactorySet) -> Self {
        Self {
            inner: Arc::new(Mutex::new(NamespaceInner {
                open: set.open,
                from_file: set.from_file,
                from_buffer: set.from_buffer,
                from_reader: set.from_reader,
                container_subtype: None,
                entry_subtype: None,
            })),
        }
    }

    pub fn shallow_copy(&self) -> Self {
        Self {
            inner: Arc::new(Mutex::new(self.inner.lock().clone())),
        }
    }

    /// Whether two handles alias the same factory table.
    pub fn ptr_eq(a: &Namespace, b: &Namespace) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    pub fn slot(&self, name: FactoryName) -> FactorySlot {
        let inner = self.inner.lock();
        match name {
            FactoryName::Open => FactorySlot::Plain(inner.open.clone()),
            FactoryName::FromFile => FactorySlot::Plain(inner.from_file.clone()),
            FactoryName::FromBuffer => FactorySlot::Plain(inner.from_buffer.clone()),
            FactoryName::FromReader => FactorySlot::Sized(inner.from_reader.clone()),
        }
    }

    pub(crate) fn replace_slot(
        &self,
        name: FactoryName,
        replace: impl FnOnce(FactorySlot) -> FactorySlot,
    ) {
        let replaced = replace(self.slot(name));
        let mut inner = self.inner.lock();
        match (name, replaced) {
            (FactoryName::Open, FactorySlot::Plain(f)) => inner.open = f,
            (FactoryName::FromFile, FactorySlot::Plain(f)) => inner.from_file = f,
            (FactoryName::FromBuffer, FactorySlot::Plain(f)) => inner.from_buffer = f,
            (FactoryName::FromReader, FactorySlot::Sized(f)) => inner.from_reader = f,
            _ => unreachable!("patched factory arity never changes"),
        }
    }

    pub fn container_subtype(&self) -> Option<ContainerCtor> {
        self.inner.lock().container_subtype.clone()
    }

    pub fn entry_subtype(&self) -> Option<EntryCtor> {
        self.inner.lock().entry_subtype.clone()
    }

    pub(crate) fn set_container_subtype(&self, ctor: ContainerCtor) {
        self.inner.lock().container_subtype = Some(ctor);
    }

    pub(crate) fn set_entry_subtype(&self, ctor: EntryCtor) {
        self.inner.lock().entry_subtype = Some(ctor);
    }

    /// Calls the `open` slot with a filesystem path.
    pub async fn open(
        &self,
        path: impl Into<PathBuf>,
        options: Option<OpenOptions>,
    ) -> FactoryResult {
        let factory = self.inner.lock().open.clone();
        factory(Source::Path(path.into()), options).await
    }

    /// Calls the `from_file` slot with an open file handle.
    pub async fn from_file(
        &self,
        file: std::fs::File,
        options: Option<OpenOptions>,
    ) -> FactoryResult {
        let factory = self.inner.lock().from_file.clone();
        factory(Source::File(file), options).await
    }

    /// Calls the `from_buffer` slot with in-memory bytes.
    pub async fn from_buffer(&self, bytes: Vec<u8>, options: Option<OpenOptions>) -> FactoryResult {
        let factory = self.inner.lock().from_buffer.clone();
        factory(Source::Buffer(bytes), options).await
    }

    /// Calls the `from_reader` slot with a random-access reader and its total
    /// size.
    pub async fn from_reader(
        &self,
        reader: Box<dyn SourceReader>,
        total_size: u64,
        options: Option<OpenOptions>,
    ) -> FactoryResult {
        let factory = self.inner.lock().from_reader.clone();
        factory(Source::Reader(reader), total_size, options).await
    }
}
