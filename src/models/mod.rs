//! Core data models for the application
//!
//! This module contains the proxy descriptor shared by every parser, the
//! fingerprinting engine and the command-line front end.
//!
//! # Usage
//!
//! ```rust
//! use subcheck::models::{Proxy, ProxyType};
//!
//! let mut proxy = Proxy::new(ProxyType::VMess, "example.com");
//! proxy.port = Some(443);
//! proxy.uuid = Some("b831381d-6324-4d53-ad4f-8cda48b30811".to_string());
//! assert_eq!(proxy.missing_required(), None);
//! ```
//!
//! Descriptors read from a Clash/Mihomo mapping go through serde directly:
//!
//! ```rust
//! use subcheck::Proxy;
//!
//! let proxy: Proxy = serde_yaml::from_str("{type: ss, server: 1.2.3.4, port: '8388'}").unwrap();
//! assert_eq!(proxy.port, Some(8388));
//! ```

pub mod deserialize;
pub mod opts;
mod proxy;

pub use opts::{GrpcOpts, HttpOpts, ObfsOpts, RealityOpts, WsOpts};
pub use proxy::*;
