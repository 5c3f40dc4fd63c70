//! Session module tying scans, indexing and comparison together.
//!
//! A [`CompareSession`] owns everything one comparison needs: the two scanned
//! populations, the canonical [`ScanIndex`](crate::duplicates::ScanIndex),
//! the [`ChecksumCache`](crate::cache::ChecksumCache) and the classification
//! results. Each phase is driven step by step, so callers can report
//! progress between steps or stop early.
//!
//! # Lifecycle
//!
//! 1. [`CompareSession::new`] validates the options; nothing is scanned yet.
//! 2. [`CompareSession::run_query_scan`] and
//!    [`CompareSession::run_canonical_scan`] fill the two populations.
//! 3. [`CompareSession::run_compare`] classifies every query file. It may be
//!    called again with another configuration; the checksum cache is kept.
//!
//! # Architecture
//!
//! * [`data`]: Step checkpoints and session options.
//! * [`compare`]: The session itself and its errors.

pub mod compare;
pub mod data;

pub use compare::{CompareSession, ConfigurationError, SessionError};
pub use data::{SessionOptions, Step, DEFAULT_REPORT_FREQUENCY};
