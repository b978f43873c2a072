pub mod base64;
pub mod url;

// Re-export common utilities
pub use self::base64::{decode_link_body, decode_subscription, try_base64_decode};
pub use self::url::url_decode;
