//! Nested transport option blocks of a proxy descriptor.
//!
//! Each block keeps the keys it does not model in `extra` so a descriptor
//! read from a config map serializes back without losing fields.

use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

use super::deserialize::{deserialize_string_or_number, deserialize_string_or_seq};

/// `ws-opts`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WsOpts {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<LinkedHashMap<String, String>>,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl WsOpts {
    pub fn new(path: Option<String>, host: Option<String>) -> Self {
        let headers = host.map(|host| {
            let mut headers = LinkedHashMap::new();
            headers.insert("Host".to_string(), host);
            headers
        });
        WsOpts {
            path,
            headers,
            extra: Mapping::new(),
        }
    }

    /// The `Host` header, looked up with its canonical spelling.
    pub fn host_header(&self) -> Option<&str> {
        self.headers
            .as_ref()
            .and_then(|headers| headers.get("Host"))
            .map(String::as_str)
    }
}

/// `http-opts`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HttpOpts {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_seq"
    )]
    pub path: Option<Vec<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub method: Option<String>,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl HttpOpts {
    pub fn first_path(&self) -> Option<&str> {
        self.path
            .as_ref()
            .and_then(|paths| paths.first())
            .map(String::as_str)
    }
}

/// `grpc-opts`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GrpcOpts {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub grpc_service_name: Option<String>,
    #[serde(flatten)]
    pub extra: Mapping,
}

/// `obfs-opts`, used by snell-style obfuscation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ObfsOpts {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub mode: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub host: Option<String>,
    #[serde(flatten)]
    pub extra: Mapping,
}

/// `reality-opts`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RealityOpts {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub public_key: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub short_id: Option<String>,
    #[serde(flatten)]
    pub extra: Mapping,
}
