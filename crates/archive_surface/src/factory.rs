use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::container::BoxedContainer;
use crate::options::OpenOptions;
use crate::source::Source;

/// Opaque error crossing the factory boundary. Collaborator errors pass
/// through the interception layer boxed, never inspected or wrapped.
pub type FactoryError = Box<dyn std::error::Error + Send + Sync>;

pub type FactoryResult = Result<BoxedContainer, FactoryError>;

pub type FactoryFuture = Pin<Box<dyn Future<Output = FactoryResult> + Send>>;

/// Native three-argument factory shape: `(source, options)` plus the
/// completion carried by the future.
pub type NativeFactory = Arc<dyn Fn(Source, Option<OpenOptions>) -> FactoryFuture + Send + Sync>;

/// Native four-argument factory shape, used by the reader-backed entry point
/// which also takes the source's total size.
pub type NativeSizedFactory =
    Arc<dyn Fn(Source, u64, Option<OpenOptions>) -> FactoryFuture + Send + Sync>;

/// The wrapped library's four factory entry points in native shape.
#[derive(Clone)]
pub struct FactorySet {
    pub open: NativeFactory,
    pub from_file: NativeFactory,
    pub from_buffer: NativeFactory,
    pub from_reader: NativeSizedFactory,
}
