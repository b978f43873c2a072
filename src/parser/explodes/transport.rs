//! Transport settings shared by the V2Ray-family share links.

use serde_yaml::{Mapping, Value};

use crate::models::{GrpcOpts, HttpOpts, Proxy, WsOpts};

/// Transport fields as they appear in a share link, before they are mapped
/// onto the nested option blocks of a descriptor.
#[derive(Debug, Default)]
pub(crate) struct TransportParams {
    pub network: Option<String>,
    pub host: Option<String>,
    pub path: Option<String>,
    pub service_name: Option<String>,
    pub header_type: Option<String>,
}

/// Fills `network` and the matching `*-opts` block. An absent network means
/// plain TCP.
pub(crate) fn apply_transport(proxy: &mut Proxy, params: TransportParams) {
    let network = params
        .network
        .map(|network| network.to_lowercase())
        .unwrap_or_else(|| "tcp".to_string());

    match network.as_str() {
        "ws" | "websocket" | "httpupgrade" => {
            proxy.network = Some("ws".to_string());
            proxy.ws_opts = Some(WsOpts::new(params.path, params.host));
        }
        "grpc" => {
            proxy.network = Some("grpc".to_string());
            proxy.grpc_opts = Some(GrpcOpts {
                grpc_service_name: params.service_name.or(params.path),
                extra: Mapping::new(),
            });
        }
        "h2" => {
            proxy.network = Some("h2".to_string());
            let mut opts = Mapping::new();
            if let Some(host) = params.host {
                opts.insert(
                    Value::from("host"),
                    Value::Sequence(vec![Value::from(host)]),
                );
            }
            opts.insert(
                Value::from("path"),
                Value::from(params.path.unwrap_or_else(|| "/".to_string())),
            );
            proxy
                .extra
                .insert(Value::from("h2-opts"), Value::Mapping(opts));
        }
        "http" => http_transport(proxy, params.path, params.host),
        "tcp" if params.header_type.as_deref() == Some("http") => {
            http_transport(proxy, params.path, params.host)
        }
        other => proxy.network = Some(other.to_string()),
    }
}

fn http_transport(proxy: &mut Proxy, path: Option<String>, host: Option<String>) {
    proxy.network = Some("http".to_string());
    let mut extra = Mapping::new();
    if let Some(host) = host {
        let mut headers = Mapping::new();
        headers.insert(
            Value::from("Host"),
            Value::Sequence(vec![Value::from(host)]),
        );
        extra.insert(Value::from("headers"), Value::Mapping(headers));
    }
    proxy.http_opts = Some(HttpOpts {
        path: Some(vec![path.unwrap_or_else(|| "/".to_string())]),
        method: None,
        extra,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProxyType;

    fn apply(params: TransportParams) -> Proxy {
        let mut proxy = Proxy::new(ProxyType::Vless, "h.example");
        apply_transport(&mut proxy, params);
        proxy
    }

    #[test]
    fn test_ws_sets_host_header() {
        let proxy = apply(TransportParams {
            network: Some("WS".to_string()),
            host: Some("cdn.example".to_string()),
            path: Some("/ray".to_string()),
            ..Default::default()
        });
        assert_eq!(proxy.network.as_deref(), Some("ws"));
        let ws = proxy.ws_opts.unwrap();
        assert_eq!(ws.path.as_deref(), Some("/ray"));
        assert_eq!(ws.host_header(), Some("cdn.example"));
    }

    #[test]
    fn test_grpc_prefers_service_name() {
        let proxy = apply(TransportParams {
            network: Some("grpc".to_string()),
            path: Some("/ignored".to_string()),
            service_name: Some("svc".to_string()),
            ..Default::default()
        });
        assert_eq!(
            proxy.grpc_opts.unwrap().grpc_service_name.as_deref(),
            Some("svc")
        );
    }

    #[test]
    fn test_tcp_http_header_becomes_http_network() {
        let proxy = apply(TransportParams {
            header_type: Some("http".to_string()),
            path: Some("/p".to_string()),
            ..Default::default()
        });
        assert_eq!(proxy.network.as_deref(), Some("http"));
        assert_eq!(proxy.http_opts.unwrap().first_path(), Some("/p"));
    }

    #[test]
    fn test_default_is_tcp() {
        let proxy = apply(TransportParams::default());
        assert_eq!(proxy.network.as_deref(), Some("tcp"));
        assert!(proxy.ws_opts.is_none());
    }
}
