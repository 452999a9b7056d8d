use std::any::Any;
use std::collections::VecDeque;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::trace;

use archive_surface::{
    BoxedContainer, ContainerEvent, ContainerOps, EventHub, EventKind, FactoryError,
    FactoryResult, FactorySet, NativeFactory, NativeSizedFactory, OpenOptions, Source,
    SourceReader,
};

use crate::entry::{parse_entries, PackEntry};
use crate::PackfileError;

struct PackState {
    pending: VecDeque<PackEntry>,
    entry_count: usize,
    lazy_entries: bool,
    ended: bool,
    closed: bool,
}

/// Handle to an opened packfile. Clones share the same entry stream.
///
/// In automatic delivery mode every entry is delivered in order followed by
/// one `End`; in manual mode each [`ContainerOps::read_entry`] delivers one.
/// Delivery always runs on a spawned task, so listeners attached right after
/// the factory resolves observe the whole stream. That ordering only holds on
/// a current-thread runtime; opening in automatic mode anywhere else fails
/// with [`PackfileError::UnsupportedRuntime`].
#[derive(Clone)]
pub struct Packfile {
    state: Arc<Mutex<PackState>>,
    hub: EventHub,
}

impl Packfile {
    fn new(entries: Vec<PackEntry>, options: &OpenOptions) -> Self {
        let entry_count = entries.len();
        let pack = Self {
            state: Arc::new(Mutex::new(PackState {
                pending: entries.into(),
                entry_count,
                lazy_entries: options.lazy_entries_or_default(),
                ended: false,
                closed: false,
            })),
            hub: EventHub::new(),
        };
        if options.auto_close_or_default() {
            // Internal lifecycle wiring: release the handle once the stream ends.
            let state = pack.state.clone();
            let hub = pack.hub.clone();
            pack.hub.on(EventKind::End, move |_| {
                let emit = {
                    let mut state = state.lock();
                    if state.closed {
                        false
                    } else {
                        state.closed = true;
                        true
                    }
                };
                if emit {
                    hub.emit(ContainerEvent::Close);
                }
            });
        }
        pack
    }

    fn deliver_next(&self) {
        loop {
            let (event, continue_auto) = {
                let mut state = self.state.lock();
                if state.closed {
                    (
                        ContainerEvent::Error(Box::new(PackfileError::Closed) as FactoryError),
                        false,
                    )
                } else if state.ended {
                    return;
                } else {
                    match state.pending.pop_front() {
                        Some(entry) => (
                            ContainerEvent::Entry(Box::new(entry)),
                            !state.lazy_entries,
                        ),
                        None => {
                            state.ended = true;
                            (ContainerEvent::End, false)
                        }
                    }
                }
            };
            self.hub.emit(event);
            if !continue_auto {
                return;
            }
        }
    }
}

impl ContainerOps for Packfile {
    fn lazy_entries(&self) -> bool {
        self.state.lock().lazy_entries
    }

    fn set_lazy_entries(&self, lazy: bool) {
        self.state.lock().lazy_entries = lazy;
    }

    fn read_entry(&self) {
        let pack = self.clone();
        tokio::spawn(async move { pack.deliver_next() });
    }

    fn close(&self) {
        let emit = {
            let mut state = self.state.lock();
            if state.closed {
                false
            } else {
                state.closed = true;
                true
            }
        };
        if emit {
            self.hub.emit(ContainerEvent::Close);
        }
    }

    fn entry_count(&self) -> usize {
        self.state.lock().entry_count
    }

    fn hub(&self) -> &EventHub {
        &self.hub
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn boxed_clone(&self) -> BoxedContainer {
        Box::new(self.clone())
    }
}

/// The delivery task is only guaranteed to run after listeners attached in
/// the caller's current code path on a current-thread runtime; elsewhere it
/// could race them and drop events.
fn ensure_current_thread() -> Result<(), PackfileError> {
    match Handle::try_current() {
        Ok(handle) if !matches!(handle.runtime_flavor(), RuntimeFlavor::CurrentThread) => {
            Err(PackfileError::UnsupportedRuntime)
        }
        _ => Ok(()),
    }
}

async fn from_bytes(bytes: Vec<u8>, options: Option<OpenOptions>) -> Result<Packfile, PackfileError> {
    let options = options.unwrap_or_default();
    let entries = parse_entries(&bytes)?;
    let pack = Packfile::new(entries, &options);
    if !options.lazy_entries_or_default() {
        ensure_current_thread()?;
        trace!(entries = pack.entry_count(), "starting automatic entry delivery");
        pack.read_entry();
    }
    Ok(pack)
}

/// Opens a packfile on disk.
pub async fn open(
    path: impl Into<PathBuf>,
    options: Option<OpenOptions>,
) -> Result<Packfile, PackfileError> {
    let bytes = tokio::fs::read(path.into()).await?;
    from_bytes(bytes, options).await
}

/// Opens a packfile from an already-open file handle.
pub async fn from_file(
    mut file: File,
    options: Option<OpenOptions>,
) -> Result<Packfile, PackfileError> {
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    from_bytes(bytes, options).await
}

/// Opens a packfile held entirely in memory.
pub async fn from_buffer(
    bytes: Vec<u8>,
    options: Option<OpenOptions>,
) -> Result<Packfile, PackfileError> {
    from_bytes(bytes, options).await
}

/// Opens a packfile through a random-access reader of known total size.
pub async fn from_reader(
    reader: Box<dyn SourceReader>,
    total_size: u64,
    options: Option<OpenOptions>,
) -> Result<Packfile, PackfileError> {
    let len = usize::try_from(total_size)
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "size out of range"))
        .map_err(PackfileError::Io)?;
    let bytes = reader.read_at(0, len)?;
    from_bytes(bytes, options).await
}

fn finish(result: Result<Packfile, PackfileError>) -> FactoryResult {
    result
        .map(|pack| Box::new(pack) as BoxedContainer)
        .map_err(|err| Box::new(err) as FactoryError)
}

fn mismatch(expected: &'static str, got: &Source) -> FactoryError {
    Box::new(PackfileError::SourceMismatch {
        expected,
        got: got.kind(),
    })
}

/// Adapts the four native factories to the shared factory surface.
pub fn factory_set() -> FactorySet {
    let open_slot: NativeFactory = Arc::new(|source, options| {
        Box::pin(async move {
            match source {
                Source::Path(path) => finish(open(path, options).await),
                other => Err(mismatch("path", &other)),
            }
        })
    });
    let from_file_slot: NativeFactory = Arc::new(|source, options| {
        Box::pin(async move {
            match source {
                Source::File(file) => finish(from_file(file, options).await),
                other => Err(mismatch("file", &other)),
            }
        })
    });
    let from_buffer_slot: NativeFactory = Arc::new(|source, options| {
        Box::pin(async move {
            match source {
                Source::Buffer(bytes) => finish(from_buffer(bytes, options).await),
                other => Err(mismatch("buffer", &other)),
            }
        })
    });
    let from_reader_slot: NativeSizedFactory = Arc::new(|source, total_size, options| {
        Box::pin(async move {
            match source {
                Source::Reader(reader) => finish(from_reader(reader, total_size, options).await),
                other => Err(mismatch("reader", &other)),
            }
        })
    });
    FactorySet {
        open: open_slot,
        from_file: from_file_slot,
        from_buffer: from_buffer_slot,
        from_reader: from_reader_slot,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use archive_surface::BufferSource;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    use super::*;

    fn fixture_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        for name in ["a.txt", "b.txt", "c.txt"] {
            writeln!(bytes, "{{\"name\":\"{name}\",\"contents\":\"data\"}}").unwrap();
        }
        bytes
    }

    fn record(hub: &EventHub) -> UnboundedReceiver<String> {
        let (tx, rx) = unbounded_channel();
        for kind in EventKind::ALL {
            let tx = tx.clone();
            hub.on(kind, move |event| {
                let label = match event {
                    ContainerEvent::Entry(entry) => format!("entry:{}", entry.name()),
                    ContainerEvent::End => "end".to_string(),
                    ContainerEvent::Close => "close".to_string(),
                    ContainerEvent::Error(err) => format!("error:{err}"),
                };
                let _ = tx.send(label);
            });
        }
        rx
    }

    async fn next(rx: &mut UnboundedReceiver<String>) -> String {
        tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed")
    }

    #[tokio::test]
    async fn automatic_delivery_fires_entries_in_order_then_end_then_close() {
        let pack = from_buffer(fixture_bytes(), None).await.unwrap();
        assert_eq!(pack.entry_count(), 3);
        let mut rx = record(pack.hub());

        assert_eq!(next(&mut rx).await, "entry:a.txt");
        assert_eq!(next(&mut rx).await, "entry:b.txt");
        assert_eq!(next(&mut rx).await, "entry:c.txt");
        assert_eq!(next(&mut rx).await, "end");
        assert_eq!(next(&mut rx).await, "close");
    }

    #[tokio::test]
    async fn manual_delivery_yields_one_entry_per_request() {
        let options = OpenOptions {
            lazy_entries: Some(true),
            ..OpenOptions::default()
        };
        let pack = from_buffer(fixture_bytes(), Some(options)).await.unwrap();
        let mut rx = record(pack.hub());

        pack.read_entry();
        assert_eq!(next(&mut rx).await, "entry:a.txt");
        pack.read_entry();
        assert_eq!(next(&mut rx).await, "entry:b.txt");
        pack.read_entry();
        assert_eq!(next(&mut rx).await, "entry:c.txt");
        pack.read_entry();
        assert_eq!(next(&mut rx).await, "end");
        assert_eq!(next(&mut rx).await, "close");
    }

    #[tokio::test]
    async fn close_is_emitted_once_and_later_reads_error() {
        let options = OpenOptions {
            lazy_entries: Some(true),
            ..OpenOptions::default()
        };
        let pack = from_buffer(fixture_bytes(), Some(options)).await.unwrap();
        let mut rx = record(pack.hub());

        pack.close();
        assert_eq!(next(&mut rx).await, "close");
        pack.close();
        pack.read_entry();
        assert_eq!(next(&mut rx).await, "error:packfile is closed");
    }

    #[tokio::test]
    async fn reader_factory_uses_the_full_source() {
        let bytes = fixture_bytes();
        let len = bytes.len() as u64;
        let pack = from_reader(Box::new(BufferSource::new(bytes)), len, None)
            .await
            .unwrap();
        assert_eq!(pack.entry_count(), 3);
    }

    #[tokio::test]
    async fn factory_set_rejects_mismatched_sources() {
        let set = factory_set();
        let Err(err) = (set.open)(Source::Buffer(fixture_bytes()), None).await else {
            panic!("expected a source mismatch");
        };
        let err = err.downcast::<PackfileError>().unwrap();
        assert!(matches!(
            *err,
            PackfileError::SourceMismatch {
                expected: "path",
                got: "buffer"
            }
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn automatic_delivery_is_rejected_off_the_current_thread_runtime() {
        let Err(err) = from_buffer(fixture_bytes(), None).await else {
            panic!("expected automatic delivery to be rejected");
        };
        assert!(matches!(err, PackfileError::UnsupportedRuntime));

        // Manual mode is unaffected: listeners attach before each request.
        let options = OpenOptions {
            lazy_entries: Some(true),
            ..OpenOptions::default()
        };
        let pack = from_buffer(fixture_bytes(), Some(options)).await.unwrap();
        let mut rx = record(pack.hub());
        pack.read_entry();
        assert_eq!(next(&mut rx).await, "entry:a.txt");
    }

    #[tokio::test]
    async fn open_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&fixture_bytes()).unwrap();
        let pack = open(file.path().to_path_buf(), None).await.unwrap();
        assert_eq!(pack.entry_count(), 3);
    }
}
