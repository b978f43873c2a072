use super::common::{fallback_name, non_empty, parse_share_url, port_or, SchemeParser};
use crate::models::deserialize::is_truthy;
use crate::models::{Proxy, ProxyType};
use crate::parser::ParseError;
use crate::utils::url::{fragment, hostname, query_map, url_decode};

const DEFAULT_PORT: u16 = 443;

/// `hysteria2://` and `hy2://` share links.
pub struct Hysteria2Parser;

impl SchemeParser for Hysteria2Parser {
    fn scheme(&self) -> &'static str {
        "hysteria2"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["hy2"]
    }

    fn parse(&self, body: &str) -> Result<Proxy, ParseError> {
        explode_hysteria2(body)
    }
}

/// Parse a Hysteria2 link body into a Proxy object
///
/// Format: `auth@host[:port]?sni=...&obfs=salamander&obfs-password=...&mport=...#name`
pub fn explode_hysteria2(body: &str) -> Result<Proxy, ParseError> {
    let url = parse_share_url("hysteria2", body)?;

    // Extract password (username in URL); `user:pass` auth is kept whole
    let mut password = url_decode(url.username());
    if let Some(rest) = url.password() {
        password = format!("{}:{}", password, url_decode(rest));
    }

    let server = hostname(&url).ok_or(ParseError::MissingField("server"))?;
    let port = port_or(&url, Some(DEFAULT_PORT))?;
    let params = query_map(&url);

    let mut proxy = Proxy::new(ProxyType::Hysteria2, server);
    proxy.name = fragment(&url).unwrap_or_else(|| fallback_name(&proxy.server, &port.to_string()));
    proxy.port = Some(port);
    if !password.is_empty() {
        proxy.password = Some(password);
    }
    proxy.ports = non_empty(params.get("mport")).or_else(|| non_empty(params.get("ports")));
    proxy.sni = non_empty(params.get("sni"));
    proxy.obfs = non_empty(params.get("obfs"));
    proxy.obfs_password = non_empty(params.get("obfs-password"));
    proxy.client_fingerprint = non_empty(params.get("fp"));
    proxy.alpn = non_empty(params.get("alpn"))
        .map(|alpn| alpn.split(',').map(|a| a.trim().to_string()).collect());
    if let Some(insecure) = non_empty(params.get("insecure")) {
        proxy.skip_cert_verify = Some(is_truthy(&insecure));
    }

    Ok(proxy)
}
