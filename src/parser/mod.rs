pub mod error;
pub mod explodes;
pub mod node_manip;
pub mod parse_settings;
pub mod subparser;

pub use error::{ConvertError, ParseError};
pub use node_manip::{uniquify, NameRegistry};
pub use parse_settings::ParseSettings;
pub use subparser::{convert, deduplicate, process};
