use std::fmt;
use std::fs::File;
use std::io;
use std::path::PathBuf;

/// Random-access byte source, the reader-backed factory's input.
pub trait SourceReader: Send {
    fn read_at(&self, offset: u64, len: usize) -> io::Result<Vec<u8>>;
}

/// Canonical primary argument: one variant per native factory.
pub enum Source {
    Path(PathBuf),
    File(File),
    Buffer(Vec<u8>),
    Reader(Box<dyn SourceReader>),
}

impl Source {
    pub fn kind(&self) -> &'static str {
        match self {
            Source::Path(_) => "path",
            Source::File(_) => "file",
            Source::Buffer(_) => "buffer",
            Source::Reader(_) => "reader",
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Source::File(_) => f.write_str("File"),
            Source::Buffer(bytes) => f.debug_tuple("Buffer").field(&bytes.len()).finish(),
            Source::Reader(_) => f.write_str("Reader"),
        }
    }
}

/// In-memory [`SourceReader`] over an owned byte buffer.
pub struct BufferSource {
    bytes: Vec<u8>,
}

impl BufferSource {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl SourceReader for BufferSource {
    fn read_at(&self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        let start = usize::try_from(offset)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "offset out of range"))?;
        match start.checked_add(len) {
            Some(end) if end <= self.bytes.len() => Ok(self.bytes[start..end].to_vec()),
            _ => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "read past end of buffer",
            )),
        }
    }
}
