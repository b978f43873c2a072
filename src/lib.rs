pub mod dedup;
pub mod models;
pub mod parser;
pub mod settings;
pub mod utils;

// Re-export the main proxy types for easier access
pub use models::{Proxy, ProxyType};

pub use dedup::{fingerprint, DedupRegistry, FingerprintKey, InsertOutcome};
pub use parser::{convert, deduplicate, process, ConvertError, ParseError, ParseSettings};
pub use settings::Settings;
