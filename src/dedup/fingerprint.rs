//! Endpoint fingerprints
//!
//! Two descriptors get the same key exactly when they are judged to reach the
//! same endpoint. The key is a run of `|`-terminated segments in a fixed
//! order; it is meant to be compared and hashed, never parsed.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::models::Proxy;

/// Hostnames and IP literals, IPv6 included.
static DOMAIN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9.\-:]+$").unwrap());

const MAX_DOMAIN_LEN: usize = 128;

/// Opaque identity key of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FingerprintKey(String);

impl FingerprintKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FingerprintKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Appends segments in call order.
struct KeyBuilder {
    key: String,
}

impl KeyBuilder {
    fn new() -> Self {
        KeyBuilder {
            key: String::with_capacity(192),
        }
    }

    /// Value written as given.
    fn raw(&mut self, value: &str) {
        self.key.push_str(value);
        self.key.push('|');
    }

    /// `prefix` + trimmed, lower-cased value; blank values contribute nothing.
    fn segment(&mut self, prefix: &str, value: Option<&str>) -> bool {
        let value = match value.map(str::trim) {
            Some(value) if !value.is_empty() => value,
            _ => return false,
        };
        self.key.push_str(prefix);
        self.key.push_str(&value.to_lowercase());
        self.key.push('|');
        true
    }

    /// `prefix` + value as given, already cleaned by the caller.
    fn cleaned(&mut self, prefix: &str, value: &str) {
        self.key.push_str(prefix);
        self.key.push_str(value);
        self.key.push('|');
    }

    fn finish(self) -> FingerprintKey {
        FingerprintKey(self.key)
    }
}

/// Lower-cased hostname, or empty when the value is too long or is not a
/// hostname at all.
pub fn clean_domain(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() || value.len() > MAX_DOMAIN_LEN || !DOMAIN_REGEX.is_match(value) {
        return String::new();
    }
    value.to_lowercase()
}

/// Path without its query string.
pub fn clean_path(path: &str) -> &str {
    path.split('?').next().unwrap_or_default()
}

/// Raw SNI: `sni` when present, else `servername`.
fn raw_sni(proxy: &Proxy) -> Option<&str> {
    proxy.sni.as_deref().or(proxy.servername.as_deref())
}

/// Raw Host: `obfs-opts.host`, else top-level `host`, else the websocket
/// `Host` header.
fn raw_host(proxy: &Proxy) -> Option<&str> {
    let obfs_host = proxy.obfs_opts.as_ref().and_then(|opts| opts.host.as_deref());
    let ws_host = proxy.ws_opts.as_ref().and_then(|opts| opts.host_header());
    obfs_host.or(proxy.host.as_deref()).or(ws_host)
}

/// Path of the first transport block the descriptor carries.
fn transport_path(proxy: &Proxy) -> Option<&str> {
    if let Some(ws) = &proxy.ws_opts {
        ws.path.as_deref()
    } else if let Some(http) = &proxy.http_opts {
        http.first_path()
    } else if let Some(grpc) = &proxy.grpc_opts {
        grpc.grpc_service_name.as_deref()
    } else {
        None
    }
}

/// Computes the identity key of a descriptor.
///
/// # Examples
/// ```
/// use subcheck::{fingerprint, Proxy, ProxyType};
///
/// let mut proxy = Proxy::new(ProxyType::VMess, "1.2.3.4");
/// proxy.port = Some(443);
/// proxy.uuid = Some("ABC".to_string());
/// proxy.tls = Some(true);
/// proxy.sni = Some("Example.com".to_string());
/// assert_eq!(
///     fingerprint(&proxy).as_str(),
///     "vmess|1.2.3.4|443|id:abc|tls:1|sni:example.com|"
/// );
/// ```
pub fn fingerprint(proxy: &Proxy) -> FingerprintKey {
    let server = proxy.server.trim().to_lowercase();

    // SNI and Host are reconciled before anything is written
    let mut sni = clean_domain(raw_sni(proxy).unwrap_or_default());
    let mut host = clean_domain(raw_host(proxy).unwrap_or_default());
    if sni.is_empty() && !host.is_empty() {
        sni = host.clone();
    }
    if sni == server {
        sni.clear();
    }
    if host == server {
        host.clear();
    }

    let mut key = KeyBuilder::new();
    key.raw(&proxy.proxy_type.as_str().to_lowercase());
    key.raw(&server);
    key.raw(&proxy.port_label());

    // uuid, else password, else every secondary credential
    let has_primary = key.segment("id:", proxy.uuid.as_deref())
        || key.segment("pw:", proxy.password.as_deref());
    if !has_primary {
        key.segment("psk:", proxy.psk.as_deref());
        key.segment("tok:", proxy.token.as_deref());
        key.segment("usr:", proxy.username.as_deref());
    }
    key.segment("auth:", proxy.auth_str.as_deref());
    key.segment("pk:", proxy.private_key.as_deref());
    key.segment("flow:", proxy.flow.as_deref());

    let net = proxy
        .transport
        .as_deref()
        .filter(|transport| !transport.trim().is_empty())
        .or(proxy.network.as_deref());
    key.segment("net:", net);

    key.raw(if proxy.tls == Some(true) { "tls:1" } else { "tls:0" });

    if let Some(path) = transport_path(proxy).map(clean_path) {
        if !path.is_empty() && path != "/" {
            key.cleaned("path:", path);
        }
    }

    if !sni.is_empty() {
        key.cleaned("sni:", &sni);
    }
    if !host.is_empty() && host != sni {
        key.cleaned("host:", &host);
    }

    let public_key = proxy
        .reality_opts
        .as_ref()
        .and_then(|opts| opts.public_key.as_deref());
    key.segment("rea:", public_key);

    key.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ObfsOpts, ProxyType, RealityOpts, WsOpts};

    fn base(proxy_type: ProxyType) -> Proxy {
        let mut proxy = Proxy::new(proxy_type, "1.2.3.4");
        proxy.port = Some(443);
        proxy
    }

    #[test]
    fn test_clean_domain() {
        assert_eq!(clean_domain("  Example.COM "), "example.com");
        assert_eq!(clean_domain("2001:DB8::1"), "2001:db8::1");
        assert_eq!(clean_domain("bad host"), "");
        assert_eq!(clean_domain("a/b"), "");
        assert_eq!(clean_domain(&"a".repeat(129)), "");
        assert_eq!(clean_domain(&"a".repeat(128)).len(), 128);
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path("/ws?ed=2048"), "/ws");
        assert_eq!(clean_path("/plain"), "/plain");
        assert_eq!(clean_path("?only"), "");
    }

    #[test]
    fn test_head_and_tls_always_present() {
        let proxy = base(ProxyType::Trojan);
        assert_eq!(fingerprint(&proxy).as_str(), "trojan|1.2.3.4|443|tls:0|");
    }

    #[test]
    fn test_port_range_in_head() {
        let mut proxy = Proxy::new(ProxyType::Mieru, "M.example");
        proxy.port_range = Some("2000-2100".to_string());
        proxy.username = Some("U".to_string());
        proxy.password = Some("P".to_string());
        proxy.transport = Some("TCP".to_string());
        assert_eq!(
            fingerprint(&proxy).as_str(),
            "mieru|m.example|2000-2100|pw:p|net:tcp|tls:0|"
        );
    }

    #[test]
    fn test_secondary_credentials_stack() {
        let mut proxy = base(ProxyType::Other("snell".to_string()));
        proxy.psk = Some("k".to_string());
        proxy.token = Some("t".to_string());
        proxy.username = Some(" ".to_string());
        assert_eq!(
            fingerprint(&proxy).as_str(),
            "snell|1.2.3.4|443|psk:k|tok:t|tls:0|"
        );
    }

    #[test]
    fn test_transport_wins_over_network() {
        let mut proxy = base(ProxyType::Mieru);
        proxy.network = Some("tcp".to_string());
        proxy.transport = Some("UDP".to_string());
        assert!(fingerprint(&proxy).as_str().contains("|net:udp|"));
        assert!(!fingerprint(&proxy).as_str().contains("net:tcp"));
    }

    #[test]
    fn test_host_precedence_is_last_listed() {
        let mut proxy = base(ProxyType::VMess);
        proxy.ws_opts = Some(WsOpts::new(None, Some("ws.example".to_string())));
        proxy.host = Some("top.example".to_string());
        proxy.sni = Some("sni.example".to_string());
        assert!(fingerprint(&proxy).as_str().ends_with("sni:sni.example|host:top.example|"));

        proxy.obfs_opts = Some(ObfsOpts {
            host: Some("obfs.example".to_string()),
            ..Default::default()
        });
        assert!(fingerprint(&proxy).as_str().ends_with("host:obfs.example|"));
    }

    #[test]
    fn test_invalid_sni_is_ignored() {
        let mut with_garbage = base(ProxyType::Trojan);
        with_garbage.sni = Some("not a domain!".to_string());
        assert_eq!(fingerprint(&with_garbage), fingerprint(&base(ProxyType::Trojan)));
    }

    #[test]
    fn test_reality_key_segment() {
        let mut proxy = base(ProxyType::Vless);
        proxy.reality_opts = Some(RealityOpts {
            public_key: Some("PubKey".to_string()),
            ..Default::default()
        });
        assert!(fingerprint(&proxy).as_str().ends_with("rea:pubkey|"));
    }
}
