/// Options accepted by every factory.
///
/// Fields are tri-state: `None` means the caller did not set the option, which
/// the interception layer distinguishes from an explicit value when it
/// overrides and later restores the delivery mode.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct OpenOptions {
    /// Manual delivery mode: entries are only delivered on `read_entry`.
    /// Defaults to automatic delivery.
    pub lazy_entries: Option<bool>,
    /// Emit `Close` once the entry stream ends. Defaults to on.
    pub auto_close: Option<bool>,
}

impl OpenOptions {
    pub fn lazy_entries_or_default(&self) -> bool {
        self.lazy_entries.unwrap_or(false)
    }

    pub fn auto_close_or_default(&self) -> bool {
        self.auto_close.unwrap_or(true)
    }
}
