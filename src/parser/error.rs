use thiserror::Error;

/// Why a single subscription record was dropped.
///
/// None of these abort a batch; the dispatcher logs them and moves on.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("record has no scheme separator")]
    MissingSeparator,

    #[error("no parser registered for scheme '{0}'")]
    UnknownScheme(String),

    #[error("failed to decode record body: {0}")]
    Decode(String),

    #[error("malformed URI: {0}")]
    Url(#[from] url::ParseError),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid value '{value}' for field '{field}'")]
    InvalidField { field: &'static str, value: String },

    #[error("invalid share-link JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid proxy mapping: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ParseError {
    pub fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        ParseError::InvalidField {
            field,
            value: value.into(),
        }
    }

    /// Whether the record was understood but rejected, as opposed to
    /// belonging to a scheme nobody handles.
    pub fn is_malformed(&self) -> bool {
        !matches!(
            self,
            ParseError::UnknownScheme(_) | ParseError::MissingSeparator
        )
    }
}

/// The only failure a whole conversion can report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("convert subscription error: no valid proxies found")]
    NoValidProxies,
}
