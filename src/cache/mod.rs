//! Checksum caching for a comparison session.
//!
//! Every checksum a session needs goes through one [`ChecksumCache`], so a
//! file is hashed at most once no matter how many queries it is compared
//! against, or whether it shows up as a query file, a canonical file, or
//! both.
//!
//! # Architecture
//!
//! * [`entry`]: The per-identity slot and its served/reused bookkeeping.
//! * [`memory`]: The in-memory cache, its counters and parallel prefetch.
//!
//! # Cache Invalidation
//!
//! Entries are keyed by [`FileIdentity`](crate::scanner::FileIdentity):
//! * File path
//! * File size
//! * Modification time (mtime)
//!
//! A file changed between scans gets a new identity, hence a new entry. The
//! cache lives only as long as its session; nothing is written to disk.

pub mod entry;
pub mod memory;

pub use entry::CacheEntry;
pub use memory::ChecksumCache;
