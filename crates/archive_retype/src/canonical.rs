use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use archive_surface::{NativeFactory, NativeSizedFactory, OpenOptions, Source};

use crate::PatchError;

/// The four patchable factory entry points.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum FactoryName {
    Open,
    FromFile,
    FromBuffer,
    FromReader,
}

impl FactoryName {
    pub const ALL: [FactoryName; 4] = [
        FactoryName::Open,
        FactoryName::FromFile,
        FactoryName::FromBuffer,
        FactoryName::FromReader,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FactoryName::Open => "open",
            FactoryName::FromFile => "from_file",
            FactoryName::FromBuffer => "from_buffer",
            FactoryName::FromReader => "from_reader",
        }
    }

    pub const fn descriptor(self) -> FactoryDescriptor {
        FactoryDescriptor {
            name: self,
            accepts_total_size: matches!(self, FactoryName::FromReader),
        }
    }
}

impl fmt::Display for FactoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FactoryName {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FactoryName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| PatchError::UnknownFactory {
                name: s.to_string(),
            })
    }
}

/// Fixed, per-factory calling convention.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct FactoryDescriptor {
    pub name: FactoryName,
    /// Whether the native shape carries the total-size argument.
    pub accepts_total_size: bool,
}

/// The unified four-argument call every patch function operates on, whichever
/// native factory it ends up driving. The completion callback of the native
/// surface is the returned future.
#[derive(Debug)]
pub struct CanonicalCall {
    pub source: Source,
    /// `None` for the factories whose native shape has no size argument.
    pub total_size: Option<u64>,
    /// Always present; omitted caller options are defaulted at the boundary.
    pub options: OpenOptions,
}

pub type CanonicalFactory =
    Arc<dyn Fn(CanonicalCall) -> archive_surface::FactoryFuture + Send + Sync>;

/// Defaults options omitted by the caller.
pub fn normalize_options(options: Option<OpenOptions>) -> OpenOptions {
    options.unwrap_or_default()
}

/// Adapts a three-argument native factory into canonical shape; the size
/// argument is dropped on the way through.
pub fn canonicalize_plain(native: NativeFactory) -> CanonicalFactory {
    Arc::new(move |call: CanonicalCall| native(call.source, Some(call.options)))
}

/// Adapts the four-argument native factory into canonical shape.
pub fn canonicalize_sized(native: NativeSizedFactory) -> CanonicalFactory {
    Arc::new(move |call: CanonicalCall| {
        // Calls built by the registry preserve whatever size the native
        // surface was given.
        let total_size = call.total_size.unwrap_or(0);
        native(call.source, total_size, Some(call.options))
    })
}

/// Wraps a canonical factory back into the three-argument native shape,
/// normalizing inbound arguments.
pub fn decanonicalize_plain(canonical: CanonicalFactory) -> NativeFactory {
    Arc::new(move |source, options| {
        canonical(CanonicalCall {
            source,
            total_size: None,
            options: normalize_options(options),
        })
    })
}

/// Wraps a canonical factory back into the four-argument native shape.
pub fn decanonicalize_sized(canonical: CanonicalFactory) -> NativeSizedFactory {
    Arc::new(move |source, total_size, options| {
        canonical(CanonicalCall {
            source,
            total_size: Some(total_size),
            options: normalize_options(options),
        })
    })
}
