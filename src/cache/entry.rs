//! Cache entry definitions.

/// The checksum slot of one file identity.
///
/// An entry is filled at most once. `served` records whether the stored
/// checksum has been handed out to a caller yet, which is what separates a
/// first lookup of a prefetched value from a genuine reuse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheEntry {
    /// The stored checksum, if it has been computed
    pub checksum: Option<String>,
    /// Whether a lookup has already returned the checksum
    pub served: bool,
}

impl CacheEntry {
    /// Whether a checksum is stored.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.checksum.is_some()
    }

    /// Store a freshly computed checksum.
    ///
    /// `served` is true when the value goes straight back to a caller, false
    /// when it was computed ahead of need.
    pub fn fill(&mut self, checksum: String, served: bool) {
        self.checksum = Some(checksum);
        self.served = served;
    }

    /// Hand out the stored checksum.
    ///
    /// Returns the checksum and whether this lookup is a reuse, i.e. some
    /// earlier lookup already received it.
    pub fn serve(&mut self) -> Option<(String, bool)> {
        let checksum = self.checksum.clone()?;
        let reused = self.served;
        self.served = true;
        Some((checksum, reused))
    }
}
