use std::any::Any;
use std::io;

use serde::Deserialize;

use archive_surface::EntryItem;

use crate::PackfileError;

/// One archive entry, as written on its own JSON line.
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
pub struct PackEntry {
    pub name: String,
    pub contents: String,
}

impl EntryItem for PackEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.contents.len() as u64
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) fn parse_entries(bytes: &[u8]) -> Result<Vec<PackEntry>, PackfileError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    let mut entries = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.chars().all(|ch| ch.is_whitespace()) {
            continue;
        }
        let entry = serde_json::from_str(line).map_err(|source| PackfileError::Parse {
            line_number: idx + 1,
            source,
        })?;
        entries.push(entry);
    }
    Ok(entries)
}
