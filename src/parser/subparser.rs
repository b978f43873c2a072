use log::{debug, info, warn};
use rayon::prelude::*;

use crate::dedup::{fingerprint, DedupRegistry, FingerprintKey};
use crate::models::Proxy;
use crate::parser::explodes::common::{install, wants_pool};
use crate::parser::explodes::{
    explode_clash, explode_records, is_clash_config, records, BUILTIN_PARSERS,
};
use crate::parser::node_manip::NameRegistry;
use crate::parser::{ConvertError, ParseError, ParseSettings};
use crate::utils::base64::decode_subscription;

/// Turns a raw subscription payload into descriptors
///
/// The payload may be Base64 wrapped or plain text, and holds either one
/// `scheme://body` record per line or a Clash document with a `proxies`
/// list. Records that fail to parse are logged and skipped. Names are made
/// unique in record order.
///
/// # Errors
/// [`ConvertError::NoValidProxies`] when not a single record survives.
pub fn convert(payload: &[u8], settings: &ParseSettings) -> Result<Vec<Proxy>, ConvertError> {
    let decoded = decode_subscription(payload);
    let text = String::from_utf8_lossy(&decoded);

    let results = if is_clash_config(&text) {
        match explode_clash(&text) {
            Ok(results) => results
                .into_iter()
                .map(|result| result.and_then(|proxy| enabled_type(proxy, settings)))
                .collect(),
            Err(err) => {
                warn!("Failed to read proxies from config document: {}", err);
                Vec::new()
            }
        }
    } else {
        let lines = records(&text);
        explode_records(&lines, &BUILTIN_PARSERS, settings)
    };

    let total = results.len();
    let mut names = NameRegistry::new();
    let mut proxies = Vec::with_capacity(total);
    for result in results {
        match result {
            Ok(mut proxy) => {
                proxy.name = names.uniquify(&proxy.name);
                proxies.push(proxy);
            }
            Err(err) => log_skipped(&err),
        }
    }

    info!(
        "Parsed {} proxies from {} records, skipped {}",
        proxies.len(),
        total,
        total - proxies.len()
    );

    if proxies.is_empty() {
        return Err(ConvertError::NoValidProxies);
    }
    Ok(proxies)
}

/// Applies the scheme allow-list to a descriptor read from a config document.
fn enabled_type(proxy: Proxy, settings: &ParseSettings) -> Result<Proxy, ParseError> {
    if settings.scheme_enabled(proxy.proxy_type.as_str()) {
        Ok(proxy)
    } else {
        Err(ParseError::UnknownScheme(proxy.proxy_type.to_string()))
    }
}

fn log_skipped(err: &ParseError) {
    if err.is_malformed() {
        debug!("Skipping malformed record: {}", err);
    } else {
        debug!("Skipping record: {}", err);
    }
}

/// Drops descriptors that describe an endpoint already seen
///
/// The first descriptor for each fingerprint is kept and input order is
/// preserved. Large batches are fingerprinted on the same worker pool the
/// parsers use; insertion always happens in input order.
pub fn deduplicate(proxies: Vec<Proxy>, settings: &ParseSettings) -> Vec<Proxy> {
    let keys: Vec<FingerprintKey> = if wants_pool(settings, proxies.len()) {
        install(settings, || proxies.par_iter().map(fingerprint).collect())
    } else {
        proxies.iter().map(fingerprint).collect()
    };

    let mut registry = DedupRegistry::with_capacity(proxies.len());
    for (key, proxy) in keys.into_iter().zip(proxies) {
        registry.insert(key, proxy);
    }

    info!(
        "Kept {} unique proxies, dropped {} duplicates",
        registry.len(),
        registry.duplicates()
    );
    registry.into_proxies()
}

/// [`convert`] followed by [`deduplicate`] when `settings.enable_dedup` is set.
pub fn process(payload: &[u8], settings: &ParseSettings) -> Result<Vec<Proxy>, ConvertError> {
    let proxies = convert(payload, settings)?;
    if settings.enable_dedup {
        Ok(deduplicate(proxies, settings))
    } else {
        Ok(proxies)
    }
}
