use log::debug;

use super::common::{fallback_name, non_empty, parse_share_url, SchemeParser};
use crate::models::{Proxy, ProxyType};
use crate::parser::ParseError;
use crate::utils::base64::decode_link_body;
use crate::utils::url::{fragment, hostname, query_map, url_decode};

const DEFAULT_TRANSPORT: &str = "TCP";
const DEFAULT_MULTIPLEXING: &str = "MULTIPLEXING_LOW";

/// `mieru://` share links, plain or Base64 wrapped, and the `mierus://`
/// simple form.
pub struct MieruParser;

impl SchemeParser for MieruParser {
    fn scheme(&self) -> &'static str {
        "mieru"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["mierus"]
    }

    fn parse(&self, body: &str) -> Result<Proxy, ParseError> {
        explode_mieru(body)
    }
}

/// Parse a Mieru link body into a Proxy object
///
/// Format: `user:password@host?port=N|port-range=A-B&protocol=TCP&multiplexing=...&profile=...#name`
pub fn explode_mieru(body: &str) -> Result<Proxy, ParseError> {
    let decoded = decode_link_body(body);
    let url = parse_share_url("mieru", &decoded)?;
    debug!(
        "Mieru URL: {}, fragment: {:?}, host: {:?}",
        url,
        url.fragment(),
        url.host_str()
    );

    let server = hostname(&url).ok_or(ParseError::MissingField("server"))?;
    let params = query_map(&url);
    let port_param = non_empty(params.get("port"));

    // fragment, then profile, then host:port
    let name = fragment(&url)
        .or_else(|| non_empty(params.get("profile")))
        .unwrap_or_else(|| fallback_name(&server, port_param.as_deref().unwrap_or("")));

    let mut proxy = Proxy::new(ProxyType::Mieru, server);
    proxy.name = name;

    // port and port-range are mutually exclusive
    if let Some(range) = non_empty(params.get("port-range")) {
        proxy.port_range = Some(range);
    } else if let Some(port) = port_param {
        if port.contains('-') {
            proxy.port_range = Some(port);
        } else {
            let port = port
                .parse::<u16>()
                .map_err(|_| ParseError::invalid("port", &port))?;
            proxy.port = Some(port);
        }
    }

    proxy.transport = Some(
        non_empty(params.get("protocol"))
            .map(|protocol| protocol.to_uppercase())
            .unwrap_or_else(|| DEFAULT_TRANSPORT.to_string()),
    );

    let username = url_decode(url.username());
    if !username.is_empty() {
        proxy.username = Some(username);
    }
    proxy.password = url.password().map(url_decode);

    proxy.multiplexing = Some(
        non_empty(params.get("multiplexing"))
            .map(|mux| mux.to_uppercase())
            .unwrap_or_else(|| DEFAULT_MULTIPLEXING.to_string()),
    );

    Ok(proxy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::base64::base64_encode;

    #[test]
    fn test_plain_link() {
        let proxy = explode_mieru(
            "alice:s3cret@1.2.3.4?port=8964&protocol=udp&multiplexing=multiplexing_high#My%20Node",
        )
        .unwrap();
        assert_eq!(proxy.proxy_type, ProxyType::Mieru);
        assert_eq!(proxy.name, "My Node");
        assert_eq!(proxy.server, "1.2.3.4");
        assert_eq!(proxy.port, Some(8964));
        assert_eq!(proxy.port_range, None);
        assert_eq!(proxy.transport.as_deref(), Some("UDP"));
        assert_eq!(proxy.multiplexing.as_deref(), Some("MULTIPLEXING_HIGH"));
        assert_eq!(proxy.username.as_deref(), Some("alice"));
        assert_eq!(proxy.password.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_base64_body_with_range_and_profile() {
        let body = base64_encode("bob:p%40ss@example.com?port-range=2000-2100&port=1&profile=prof");
        let proxy = explode_mieru(&body).unwrap();
        assert_eq!(proxy.name, "prof");
        assert_eq!(proxy.server, "example.com");
        assert_eq!(proxy.port_range.as_deref(), Some("2000-2100"));
        assert_eq!(proxy.port, None);
        assert_eq!(proxy.password.as_deref(), Some("p@ss"));
        assert_eq!(proxy.transport.as_deref(), Some("TCP"));
        assert_eq!(proxy.multiplexing.as_deref(), Some("MULTIPLEXING_LOW"));
    }

    #[test]
    fn test_fallback_name() {
        let proxy = explode_mieru("u:p@h.example?port=443").unwrap();
        assert_eq!(proxy.name, "h.example:443");
    }

    #[test]
    fn test_range_in_port_parameter() {
        let proxy = explode_mieru("u:p@h.example?port=9998-9999&port=6666").unwrap();
        assert_eq!(proxy.port_range.as_deref(), Some("9998-9999"));
        assert_eq!(proxy.port, None);
    }

    #[test]
    fn test_rejects_missing_host_and_bad_port() {
        assert!(explode_mieru("?port=1").is_err());
        assert!(matches!(
            explode_mieru("u:p@h.example?port=http"),
            Err(ParseError::InvalidField { field: "port", .. })
        ));
    }
}
