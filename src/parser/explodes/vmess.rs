use serde::Deserialize;

use super::common::{fallback_name, SchemeParser};
use super::transport::{apply_transport, TransportParams};
use crate::models::deserialize::deserialize_string_or_number;
use crate::models::{Proxy, ProxyType};
use crate::parser::ParseError;
use crate::utils::base64::try_base64_decode;

/// `vmess://` links in the V2RayN Base64-JSON form.
pub struct VmessParser;

impl SchemeParser for VmessParser {
    fn scheme(&self) -> &'static str {
        "vmess"
    }

    fn parse(&self, body: &str) -> Result<Proxy, ParseError> {
        explode_vmess(body)
    }
}

/// The JSON object carried by a V2RayN share link. Numeric fields are
/// written as numbers by some clients and as strings by others.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VmessShare {
    #[serde(deserialize_with = "deserialize_string_or_number")]
    v: Option<String>,
    ps: Option<String>,
    add: Option<String>,
    #[serde(deserialize_with = "deserialize_string_or_number")]
    port: Option<String>,
    id: Option<String>,
    #[serde(deserialize_with = "deserialize_string_or_number")]
    aid: Option<String>,
    scy: Option<String>,
    net: Option<String>,
    #[serde(rename = "type")]
    header_type: Option<String>,
    host: Option<String>,
    path: Option<String>,
    tls: Option<String>,
    sni: Option<String>,
    alpn: Option<String>,
    fp: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parse a VMess link body into a Proxy object
pub fn explode_vmess(body: &str) -> Result<Proxy, ParseError> {
    let body = body.split('#').next().unwrap_or_default();
    let decoded = try_base64_decode(body)
        .ok_or_else(|| ParseError::Decode("vmess body is not Base64".to_string()))?;
    let share: VmessShare = serde_json::from_slice(&decoded)?;

    let server = present(share.add).ok_or(ParseError::MissingField("server"))?;
    let port_text = present(share.port).ok_or(ParseError::MissingField("port"))?;
    let port = port_text
        .parse::<u16>()
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| ParseError::invalid("port", &port_text))?;

    let id = present(share.id).ok_or(ParseError::MissingField("uuid"))?;
    uuid::Uuid::parse_str(&id).map_err(|_| ParseError::invalid("uuid", &id))?;

    let alter_id = match present(share.aid) {
        Some(aid) => aid
            .parse::<u32>()
            .map_err(|_| ParseError::invalid("alterId", &aid))?,
        None => 0,
    };

    let mut proxy = Proxy::new(ProxyType::VMess, server);
    proxy.name =
        present(share.ps).unwrap_or_else(|| fallback_name(&proxy.server, &port_text));
    proxy.port = Some(port);
    proxy.uuid = Some(id);
    proxy.alter_id = Some(alter_id);
    proxy.cipher = Some(present(share.scy).unwrap_or_else(|| "auto".to_string()));
    proxy.udp = Some(true);

    // v1 links pack host and path into `host` as "host;path"
    let mut host = present(share.host);
    let mut path = present(share.path);
    if share.v.as_deref() == Some("1") {
        let packed = host
            .as_deref()
            .and_then(|h| h.split_once(';'))
            .map(|(h, p)| (h.to_string(), p.to_string()));
        if let Some((h, p)) = packed {
            host = present(Some(h));
            path = present(Some(p));
        }
    }

    if present(share.tls).map_or(false, |tls| tls.eq_ignore_ascii_case("tls")) {
        proxy.tls = Some(true);
        proxy.servername = present(share.sni);
        proxy.client_fingerprint = present(share.fp);
        proxy.alpn = present(share.alpn)
            .map(|alpn| alpn.split(',').map(|a| a.trim().to_string()).collect());
    }

    apply_transport(
        &mut proxy,
        TransportParams {
            network: present(share.net),
            host,
            path: path.clone(),
            service_name: path,
            header_type: present(share.header_type),
        },
    );

    Ok(proxy)
}
