use serde_yaml::{Mapping, Value};

use super::common::{fallback_name, SchemeParser};
use crate::models::{Proxy, ProxyType};
use crate::parser::ParseError;
use crate::utils::base64::try_base64_decode;
use crate::utils::url::{split_host_port, url_decode};

/// `ss://` links, both SIP002 and the legacy fully encoded form.
pub struct ShadowsocksParser;

impl SchemeParser for ShadowsocksParser {
    fn scheme(&self) -> &'static str {
        "ss"
    }

    fn parse(&self, body: &str) -> Result<Proxy, ParseError> {
        explode_ss(body)
    }
}

fn decode_utf8(input: &str) -> Option<String> {
    try_base64_decode(input).and_then(|bytes| String::from_utf8(bytes).ok())
}

/// Parse a Shadowsocks link body into a Proxy object
///
/// Accepted forms:
/// * `base64(method:password)@host:port/?plugin=...#name`
/// * `method:password@host:port#name`
/// * `base64(method:password@host:port)#name`
pub fn explode_ss(body: &str) -> Result<Proxy, ParseError> {
    let (content, remark) = match body.split_once('#') {
        Some((content, remark)) => (content, Some(url_decode(remark))),
        None => (body, None),
    };
    let content = content.replace("/?", "?");
    let (content, query) = match content.split_once('?') {
        Some((content, query)) => (content.to_string(), Some(query.to_string())),
        None => (content.clone(), None),
    };

    // Extract method, password and address
    let (userinfo, address) = match content.rsplit_once('@') {
        Some((userinfo, address)) => {
            let userinfo = decode_utf8(userinfo)
                .filter(|decoded| decoded.contains(':'))
                .unwrap_or_else(|| url_decode(userinfo));
            (userinfo, address.to_string())
        }
        None => {
            let decoded = decode_utf8(&content)
                .ok_or_else(|| ParseError::Decode("ss body is not Base64".to_string()))?;
            let (userinfo, address) = decoded
                .rsplit_once('@')
                .ok_or(ParseError::MissingField("server"))?;
            (userinfo.to_string(), address.to_string())
        }
    };

    let (cipher, password) = userinfo
        .split_once(':')
        .ok_or(ParseError::MissingField("cipher"))?;
    if cipher.is_empty() {
        return Err(ParseError::MissingField("cipher"));
    }
    if password.is_empty() {
        return Err(ParseError::MissingField("password"));
    }

    let (server, port) =
        split_host_port(&address).ok_or_else(|| ParseError::invalid("server", &address))?;
    if port == 0 {
        return Err(ParseError::invalid("port", "0"));
    }

    let mut proxy = Proxy::new(ProxyType::Shadowsocks, server);
    proxy.name = remark
        .filter(|remark| !remark.is_empty())
        .unwrap_or_else(|| fallback_name(&proxy.server, &port.to_string()));
    proxy.port = Some(port);
    proxy.cipher = Some(cipher.to_string());
    proxy.password = Some(password.to_string());
    proxy.udp = Some(true);

    if let Some(query) = query {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if key == "plugin" && !value.is_empty() {
                apply_plugin(&mut proxy, &value);
            }
        }
    }

    Ok(proxy)
}

/// Maps a SIP003 plugin string such as `obfs-local;obfs=http;obfs-host=a`
/// onto `plugin` and `plugin-opts`.
fn apply_plugin(proxy: &mut Proxy, plugin: &str) {
    let mut parts = plugin.split(';').map(str::trim);
    let name = parts.next().unwrap_or_default();
    let mut options: Vec<(&str, Option<&str>)> = Vec::new();
    for part in parts.filter(|part| !part.is_empty()) {
        match part.split_once('=') {
            Some((key, value)) => options.push((key, Some(value))),
            None => options.push((part, None)),
        }
    }
    let option = |wanted: &str| {
        options
            .iter()
            .find(|(key, _)| *key == wanted)
            .and_then(|(_, value)| *value)
    };

    let mut opts = Mapping::new();
    match name {
        "obfs-local" | "simple-obfs" | "obfs" => {
            proxy.plugin = Some("obfs".to_string());
            if let Some(mode) = option("obfs") {
                opts.insert(Value::from("mode"), Value::from(mode));
            }
            if let Some(host) = option("obfs-host") {
                opts.insert(Value::from("host"), Value::from(host));
            }
        }
        "v2ray-plugin" => {
            proxy.plugin = Some("v2ray-plugin".to_string());
            opts.insert(
                Value::from("mode"),
                Value::from(option("mode").unwrap_or("websocket")),
            );
            if let Some(host) = option("host") {
                opts.insert(Value::from("host"), Value::from(host));
            }
            if let Some(path) = option("path") {
                opts.insert(Value::from("path"), Value::from(path));
            }
            if options.iter().any(|(key, _)| *key == "tls") {
                opts.insert(Value::from("tls"), Value::from(true));
            }
        }
        other => {
            proxy.plugin = Some(other.to_string());
            for (key, value) in &options {
                let value = value.map_or(Value::from(true), Value::from);
                opts.insert(Value::from(*key), value);
            }
        }
    }
    if !opts.is_empty() {
        proxy.plugin_opts = Some(opts);
    }
}
