#![allow(dead_code)]

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use archive_retype::{FactoryName, Namespace, RetypedEntry};
use archive_surface::{
    BufferSource, ContainerEvent, EventHub, EventKind, FactoryResult, OpenOptions,
};

pub const FIXTURE_ENTRIES: [&str; 4] = ["alpha.txt", "beta.txt", "gamma.txt", "delta.txt"];

pub fn fixture_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    for name in FIXTURE_ENTRIES {
        let line = serde_json::json!({ "name": name, "contents": "payload" });
        writeln!(bytes, "{line}").unwrap();
    }
    bytes
}

pub fn fixture_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&fixture_bytes()).unwrap();
    file
}

pub fn namespace() -> Namespace {
    Namespace::from_factories(packfile::factory_set())
}

/// Calls one factory slot through its native shape, sourcing the fixture from
/// `path` however that slot expects it.
pub async fn call_factory(
    namespace: &Namespace,
    name: FactoryName,
    path: &Path,
    options: Option<OpenOptions>,
) -> FactoryResult {
    match name {
        FactoryName::Open => namespace.open(path, options).await,
        FactoryName::FromFile => {
            let file = std::fs::File::open(path).unwrap();
            namespace.from_file(file, options).await
        }
        FactoryName::FromBuffer => {
            let bytes = std::fs::read(path).unwrap();
            namespace.from_buffer(bytes, options).await
        }
        FactoryName::FromReader => {
            let bytes = std::fs::read(path).unwrap();
            let len = bytes.len() as u64;
            namespace
                .from_reader(Box::new(BufferSource::new(bytes)), len, options)
                .await
        }
    }
}

/// Labels every event on `hub`, marking entry payloads that went through the
/// relabel pipeline.
pub fn record_events(hub: &EventHub) -> UnboundedReceiver<String> {
    let (tx, rx) = unbounded_channel();
    for kind in EventKind::ALL {
        let tx = tx.clone();
        hub.on(kind, move |event| {
            let label = match event {
                ContainerEvent::Entry(entry) => {
                    if entry.as_any().downcast_ref::<RetypedEntry>().is_some() {
                        format!("entry:{}:retyped", entry.name())
                    } else {
                        format!("entry:{}", entry.name())
                    }
                }
                ContainerEvent::End => "end".to_string(),
                ContainerEvent::Close => "close".to_string(),
                ContainerEvent::Error(err) => format!("error:{err}"),
            };
            let _ = tx.send(label);
        });
    }
    rx
}

pub async fn next(rx: &mut UnboundedReceiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

/// Receives `count` labels in arrival order.
pub async fn collect(rx: &mut UnboundedReceiver<String>, count: usize) -> Vec<String> {
    let mut labels = Vec::with_capacity(count);
    for _ in 0..count {
        labels.push(next(rx).await);
    }
    labels
}
