//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Composite keys built from the enabled comparison switches ([`key`])
//! - Indexing the canonical population by key ([`groups`])
//! - Classifying query files against the index ([`finder`])
//! - The classification results and their error reasons ([`results`])

pub mod finder;
pub mod groups;
pub mod key;
pub mod results;

pub use finder::{CompareSteps, ComparisonEngine};
pub use groups::ScanIndex;
pub use key::{ComparisonConfig, CompositeKey};
pub use results::{Classification, SourceError};
