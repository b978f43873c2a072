//! Endpoint deduplication
//!
//! [`fingerprint`] reduces a descriptor to the fields that decide which
//! endpoint it reaches; [`DedupRegistry`] keeps the first descriptor seen
//! for each key.

pub mod fingerprint;
pub mod registry;

pub use fingerprint::{fingerprint, FingerprintKey};
pub use registry::{DedupRegistry, InsertOutcome};
