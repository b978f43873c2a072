//! Proxy model definitions
//!
//! Contains the canonical descriptor every parser produces and every
//! downstream consumer reads. Field names and their serialized spelling
//! follow Clash/Mihomo proxy mappings.

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;
use std::fmt;

use super::deserialize::{
    deserialize_port, deserialize_string, deserialize_string_or_number,
    deserialize_string_or_seq, deserialize_truthy, deserialize_u32,
};
use super::opts::{GrpcOpts, HttpOpts, ObfsOpts, RealityOpts, WsOpts};

/// Represents the type of a proxy.
/// Serialized as the lowercase protocol tag used in config mappings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProxyType {
    Shadowsocks,
    VMess,
    Vless,
    Trojan,
    Hysteria2,
    Mieru,
    // protocols without a dedicated parser still pass through config maps
    Other(String),
}

impl ProxyType {
    pub fn as_str(&self) -> &str {
        match self {
            ProxyType::Shadowsocks => "ss",
            ProxyType::VMess => "vmess",
            ProxyType::Vless => "vless",
            ProxyType::Trojan => "trojan",
            ProxyType::Hysteria2 => "hysteria2",
            ProxyType::Mieru => "mieru",
            ProxyType::Other(tag) => tag,
        }
    }
}

impl From<&str> for ProxyType {
    fn from(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "ss" | "shadowsocks" => ProxyType::Shadowsocks,
            "vmess" => ProxyType::VMess,
            "vless" => ProxyType::Vless,
            "trojan" => ProxyType::Trojan,
            "hysteria2" | "hy2" => ProxyType::Hysteria2,
            "mieru" => ProxyType::Mieru,
            other => ProxyType::Other(other.to_string()),
        }
    }
}

impl From<String> for ProxyType {
    fn from(tag: String) -> Self {
        ProxyType::from(tag.as_str())
    }
}

impl From<ProxyType> for String {
    fn from(proxy_type: ProxyType) -> Self {
        proxy_type.as_str().to_string()
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One relay endpoint.
///
/// Only `name`, `type` and `server` are always present; `port` and
/// `port-range` are mutually exclusive and at least one of them is set on
/// every descriptor a parser hands out. Keys not modelled here are kept in
/// `extra`, in their original order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Proxy {
    #[serde(default, deserialize_with = "deserialize_string")]
    pub name: String,
    #[serde(rename = "type")]
    pub proxy_type: ProxyType,
    #[serde(default, deserialize_with = "deserialize_string")]
    pub server: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_port"
    )]
    pub port: Option<u16>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub port_range: Option<String>,
    /// Port hopping list, e.g. `20000-30000,443`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub ports: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub uuid: Option<String>,
    #[serde(
        rename = "alterId",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_u32"
    )]
    pub alter_id: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub cipher: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub password: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub psk: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub token: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub username: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub auth_str: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub private_key: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub flow: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub network: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub transport: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub multiplexing: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_truthy"
    )]
    pub tls: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub servername: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub sni: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub host: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_truthy"
    )]
    pub skip_cert_verify: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub client_fingerprint: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_seq"
    )]
    pub alpn: Option<Vec<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_truthy"
    )]
    pub udp: Option<bool>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub obfs: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub obfs_password: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub plugin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_opts: Option<Mapping>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ws_opts: Option<WsOpts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_opts: Option<HttpOpts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grpc_opts: Option<GrpcOpts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obfs_opts: Option<ObfsOpts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reality_opts: Option<RealityOpts>,

    #[serde(flatten)]
    pub extra: Mapping,
}

impl Proxy {
    pub fn new(proxy_type: ProxyType, server: impl Into<String>) -> Self {
        Proxy {
            name: String::new(),
            proxy_type,
            server: server.into(),
            port: None,
            port_range: None,
            ports: None,
            uuid: None,
            alter_id: None,
            cipher: None,
            password: None,
            psk: None,
            token: None,
            username: None,
            auth_str: None,
            private_key: None,
            flow: None,
            network: None,
            transport: None,
            multiplexing: None,
            tls: None,
            servername: None,
            sni: None,
            host: None,
            skip_cert_verify: None,
            client_fingerprint: None,
            alpn: None,
            udp: None,
            obfs: None,
            obfs_password: None,
            plugin: None,
            plugin_opts: None,
            ws_opts: None,
            http_opts: None,
            grpc_opts: None,
            obfs_opts: None,
            reality_opts: None,
            extra: Mapping::new(),
        }
    }

    /// Name of the first required field this descriptor lacks, if any.
    pub fn missing_required(&self) -> Option<&'static str> {
        if self.proxy_type.as_str().is_empty() {
            return Some("type");
        }
        if self.server.trim().is_empty() {
            return Some("server");
        }
        let has_range = self
            .port_range
            .as_deref()
            .map_or(false, |range| !range.trim().is_empty());
        if self.port.is_none() && !has_range {
            return Some("port");
        }
        None
    }

    /// The port slot of the descriptor: the port, else the port range.
    pub fn port_label(&self) -> String {
        match (self.port, self.port_range.as_deref()) {
            (Some(port), _) => port.to_string(),
            (None, Some(range)) => range.trim().to_string(),
            (None, None) => String::new(),
        }
    }
}

/// Wrapper used when emitting a `proxies:` document.
#[derive(Debug, Clone, Serialize)]
pub struct ProxyList<'a> {
    pub proxies: &'a [Proxy],
}
