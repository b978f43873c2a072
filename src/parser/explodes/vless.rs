use super::common::{fallback_name, non_empty, parse_share_url, port_or, SchemeParser};
use super::transport::{apply_transport, TransportParams};
use crate::models::deserialize::is_truthy;
use crate::models::{Proxy, ProxyType, RealityOpts};
use crate::parser::ParseError;
use crate::utils::url::{fragment, hostname, query_map, url_decode};

/// `vless://` share links.
pub struct VlessParser;

impl SchemeParser for VlessParser {
    fn scheme(&self) -> &'static str {
        "vless"
    }

    fn parse(&self, body: &str) -> Result<Proxy, ParseError> {
        explode_vless(body)
    }
}

/// Parse a VLESS link body into a Proxy object
///
/// Format: `uuid@host:port?type=ws&security=tls&sni=...&path=...#name`
pub fn explode_vless(body: &str) -> Result<Proxy, ParseError> {
    let url = parse_share_url("vless", body)?;

    let id = url_decode(url.username());
    if id.is_empty() {
        return Err(ParseError::MissingField("uuid"));
    }
    uuid::Uuid::parse_str(&id).map_err(|_| ParseError::invalid("uuid", &id))?;

    let server = hostname(&url).ok_or(ParseError::MissingField("server"))?;
    let port = port_or(&url, None)?;
    let params = query_map(&url);

    let mut proxy = Proxy::new(ProxyType::Vless, server);
    proxy.name = fragment(&url).unwrap_or_else(|| fallback_name(&proxy.server, &port.to_string()));
    proxy.port = Some(port);
    proxy.uuid = Some(id);
    proxy.udp = Some(true);
    proxy.flow = non_empty(params.get("flow"));

    // Extract TLS settings
    let security = non_empty(params.get("security"))
        .map(|security| security.to_lowercase())
        .unwrap_or_default();
    if matches!(security.as_str(), "tls" | "reality" | "xtls") {
        proxy.tls = Some(true);
        proxy.servername = non_empty(params.get("sni")).or_else(|| non_empty(params.get("peer")));
        proxy.client_fingerprint = non_empty(params.get("fp"));
        proxy.alpn = non_empty(params.get("alpn"))
            .map(|alpn| alpn.split(',').map(|a| a.trim().to_string()).collect());
    }
    if let Some(insecure) = non_empty(params.get("allowInsecure"))
        .or_else(|| non_empty(params.get("insecure")))
    {
        proxy.skip_cert_verify = Some(is_truthy(&insecure));
    }

    if security == "reality" {
        proxy.reality_opts = Some(RealityOpts {
            public_key: non_empty(params.get("pbk")),
            short_id: non_empty(params.get("sid")),
            ..Default::default()
        });
    }

    apply_transport(
        &mut proxy,
        TransportParams {
            network: non_empty(params.get("type")),
            host: non_empty(params.get("host")),
            path: non_empty(params.get("path")),
            service_name: non_empty(params.get("serviceName")),
            header_type: non_empty(params.get("headerType")),
        },
    );

    Ok(proxy)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "b831381d-6324-4d53-ad4f-8cda48b30811";

    #[test]
    fn test_reality_grpc_link() {
        let body = format!(
            "{}@1.2.3.4:443?security=reality&sni=www.example.com&fp=chrome&pbk=KEY&sid=ab12&type=grpc&serviceName=svc&flow=xtls-rprx-vision#JP%2001",
            ID
        );
        let proxy = explode_vless(&body).unwrap();
        assert_eq!(proxy.name, "JP 01");
        assert_eq!(proxy.port, Some(443));
        assert_eq!(proxy.tls, Some(true));
        assert_eq!(proxy.servername.as_deref(), Some("www.example.com"));
        assert_eq!(proxy.client_fingerprint.as_deref(), Some("chrome"));
        assert_eq!(proxy.flow.as_deref(), Some("xtls-rprx-vision"));
        let reality = proxy.reality_opts.unwrap();
        assert_eq!(reality.public_key.as_deref(), Some("KEY"));
        assert_eq!(reality.short_id.as_deref(), Some("ab12"));
        assert_eq!(proxy.network.as_deref(), Some("grpc"));
        assert_eq!(
            proxy.grpc_opts.unwrap().grpc_service_name.as_deref(),
            Some("svc")
        );
    }

    #[test]
    fn test_plain_ws_link() {
        let body = format!("{}@[2001:db8::1]:8080?type=ws&path=%2Fws&host=cdn.example", ID);
        let proxy = explode_vless(&body).unwrap();
        assert_eq!(proxy.server, "2001:db8::1");
        assert_eq!(proxy.name, "2001:db8::1:8080");
        assert_eq!(proxy.tls, None);
        let ws = proxy.ws_opts.unwrap();
        assert_eq!(ws.path.as_deref(), Some("/ws"));
        assert_eq!(ws.host_header(), Some("cdn.example"));
    }

    #[test]
    fn test_rejects_bad_links() {
        assert!(matches!(
            explode_vless("h.example:443"),
            Err(ParseError::MissingField("uuid"))
        ));
        assert!(matches!(
            explode_vless("nope@h.example:443"),
            Err(ParseError::InvalidField { field: "uuid", .. })
        ));
        assert!(matches!(
            explode_vless(&format!("{}@h.example", ID)),
            Err(ParseError::MissingField("port"))
        ));
    }
}
