use super::common::{fallback_name, non_empty, parse_share_url, port_or, SchemeParser};
use super::transport::{apply_transport, TransportParams};
use crate::models::deserialize::is_truthy;
use crate::models::{Proxy, ProxyType, RealityOpts};
use crate::parser::ParseError;
use crate::utils::url::{fragment, hostname, query_map, url_decode};

const DEFAULT_PORT: u16 = 443;

/// `trojan://` share links.
pub struct TrojanParser;

impl SchemeParser for TrojanParser {
    fn scheme(&self) -> &'static str {
        "trojan"
    }

    fn parse(&self, body: &str) -> Result<Proxy, ParseError> {
        explode_trojan(body)
    }
}

/// Parse a Trojan link body into a Proxy object
///
/// Format: `password@host[:port]?sni=...&type=ws&path=...#name`
pub fn explode_trojan(body: &str) -> Result<Proxy, ParseError> {
    let url = parse_share_url("trojan", body)?;

    // Extract password, kept whole when it contains a colon
    let mut password = url_decode(url.username());
    if let Some(rest) = url.password() {
        password = format!("{}:{}", password, url_decode(rest));
    }
    if password.is_empty() {
        return Err(ParseError::MissingField("password"));
    }

    let server = hostname(&url).ok_or(ParseError::MissingField("server"))?;
    let port = port_or(&url, Some(DEFAULT_PORT))?;
    let params = query_map(&url);

    let mut proxy = Proxy::new(ProxyType::Trojan, server);
    proxy.name = fragment(&url).unwrap_or_else(|| fallback_name(&proxy.server, &port.to_string()));
    proxy.port = Some(port);
    proxy.password = Some(password);
    proxy.udp = Some(true);

    // Extract SNI, "peer" is the older spelling
    proxy.sni = non_empty(params.get("sni")).or_else(|| non_empty(params.get("peer")));
    proxy.client_fingerprint = non_empty(params.get("fp"));
    proxy.alpn = non_empty(params.get("alpn"))
        .map(|alpn| alpn.split(',').map(|a| a.trim().to_string()).collect());
    if let Some(insecure) = non_empty(params.get("allowInsecure")) {
        proxy.skip_cert_verify = Some(is_truthy(&insecure));
    }
    if let Some(public_key) = non_empty(params.get("pbk")) {
        proxy.reality_opts = Some(RealityOpts {
            public_key: Some(public_key),
            short_id: non_empty(params.get("sid")),
            ..Default::default()
        });
    }

    // Legacy `ws=1&wspath=...` form
    let legacy_ws = params.get("ws").map_or(false, |ws| is_truthy(ws));
    let (network, path) = if legacy_ws {
        (Some("ws".to_string()), non_empty(params.get("wspath")))
    } else {
        (non_empty(params.get("type")), non_empty(params.get("path")))
    };

    apply_transport(
        &mut proxy,
        TransportParams {
            network,
            host: non_empty(params.get("host")),
            path,
            service_name: non_empty(params.get("serviceName")),
            header_type: non_empty(params.get("headerType")),
        },
    );

    Ok(proxy)
}
