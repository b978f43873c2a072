use serde_yaml::Value;

use crate::models::Proxy;
use crate::parser::ParseError;

/// Whether a decoded subscription is a Clash/Mihomo document rather than a
/// list of share links.
pub fn is_clash_config(content: &str) -> bool {
    content
        .lines()
        .any(|line| line.starts_with("proxies:") || line.starts_with("Proxy:"))
}

/// Parse a Clash YAML configuration into one result per `proxies` entry
///
/// Fails as a whole only when the document itself is not YAML or has no
/// proxy list; a bad entry only fails its own slot.
pub fn explode_clash(content: &str) -> Result<Vec<Result<Proxy, ParseError>>, ParseError> {
    let yaml: Value = serde_yaml::from_str(content)?;

    // Extract proxies section
    let proxies = match yaml.get("proxies") {
        Some(Value::Sequence(seq)) => seq,
        _ => match yaml.get("Proxy") {
            Some(Value::Sequence(seq)) => seq,
            _ => return Err(ParseError::MissingField("proxies")),
        },
    };

    Ok(proxies.iter().map(parse_clash_proxy).collect())
}

fn parse_clash_proxy(entry: &Value) -> Result<Proxy, ParseError> {
    let proxy: Proxy = serde_yaml::from_value(entry.clone())?;
    match proxy.missing_required() {
        Some(field) => Err(ParseError::MissingField(field)),
        None => Ok(proxy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProxyType;

    const CONFIG: &str = r#"
port: 7890
proxies:
  - name: "ss1"
    type: ss
    server: 1.2.3.4
    port: 8388
    cipher: aes-128-gcm
    password: "123456"
    udp: "true"
  - name: "m1"
    type: mieru
    server: m.example
    port-range: 2090-2099
    transport: TCP
    username: u
    password: p
  - name: "broken"
    type: vmess
    port: 443
  - name: "tuic1"
    type: tuic
    server: t.example
    port: 443
    congestion-controller: bbr
"#;

    #[test]
    fn test_detects_clash_documents() {
        assert!(is_clash_config(CONFIG));
        assert!(is_clash_config("Proxy:\n  - {name: a}\n"));
        assert!(!is_clash_config("vmess://abc\ntrojan://def"));
    }

    #[test]
    fn test_explode_clash() {
        let results = explode_clash(CONFIG).unwrap();
        assert_eq!(results.len(), 4);

        let ss = results[0].as_ref().unwrap();
        assert_eq!(ss.proxy_type, ProxyType::Shadowsocks);
        assert_eq!(ss.port, Some(8388));
        assert_eq!(ss.udp, Some(true));

        let mieru = results[1].as_ref().unwrap();
        assert_eq!(mieru.port, None);
        assert_eq!(mieru.port_range.as_deref(), Some("2090-2099"));

        assert!(matches!(
            results[2],
            Err(ParseError::MissingField("server"))
        ));

        let tuic = results[3].as_ref().unwrap();
        assert_eq!(tuic.proxy_type.as_str(), "tuic");
        assert!(tuic.extra.contains_key("congestion-controller"));
    }

    #[test]
    fn test_missing_proxy_list() {
        assert!(explode_clash("rules: []\n").is_err());
        assert!(explode_clash("proxies: [unclosed").is_err());
    }

    #[test]
    fn test_numeric_scalars_are_text() {
        let doc = "proxies:\n  - {name: 2024, type: trojan, server: a.example, port: 443, password: 123456, sni: 42}\n  - {name: r, type: vless, server: b.example, port: 443, uuid: u, alpn: [h2, 3], reality-opts: {public-key: K, short-id: 12345678}}\n  - {name: 7, type: snell, server: c.example, port: 1, psk: 99, obfs-opts: {mode: http, host: 8}}\n";
        let results = explode_clash(doc).unwrap();
        assert_eq!(results.len(), 3);

        let trojan = results[0].as_ref().unwrap();
        assert_eq!(trojan.name, "2024");
        assert_eq!(trojan.password.as_deref(), Some("123456"));
        assert_eq!(trojan.sni.as_deref(), Some("42"));

        let vless = results[1].as_ref().unwrap();
        let reality = vless.reality_opts.as_ref().unwrap();
        assert_eq!(reality.short_id.as_deref(), Some("12345678"));
        assert_eq!(vless.alpn, Some(vec!["h2".to_string(), "3".to_string()]));

        let snell = results[2].as_ref().unwrap();
        assert_eq!(snell.name, "7");
        assert_eq!(snell.psk.as_deref(), Some("99"));
        assert_eq!(
            snell.obfs_opts.as_ref().and_then(|opts| opts.host.as_deref()),
            Some("8")
        );
    }
}
