//! URL encoding/decoding utilities

use std::collections::HashMap;
use url::Url;

/// Decodes a URL-encoded string
///
/// # Arguments
/// * `input` - The URL-encoded string to decode
///
/// # Returns
/// * String containing the decoded input
/// * Returns the original string if decoding fails
///
/// # Examples
/// ```
/// use subcheck::utils::url::url_decode;
///
/// let decoded = url_decode("Hello%20World%21");
/// assert_eq!(decoded, "Hello World!");
/// ```
pub fn url_decode(input: &str) -> String {
    urlencoding::decode(input)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| input.to_string())
}

/// Collects query parameters; the first occurrence of a key wins.
pub fn query_map(url: &Url) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for (key, value) in url.query_pairs() {
        params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    params
}

/// Host of a share URL without IPv6 brackets.
pub fn hostname(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// Percent-decoded fragment, `None` when absent or empty.
pub fn fragment(url: &Url) -> Option<String> {
    url.fragment()
        .map(url_decode)
        .filter(|remark| !remark.is_empty())
}

/// Splits `host:port`, accepting bracketed IPv6 hosts.
pub fn split_host_port(input: &str) -> Option<(String, u16)> {
    let input = input.trim().trim_end_matches('/');
    let (host, port) = input.rsplit_once(':')?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return None;
    }
    let port = port.parse::<u16>().ok()?;
    Some((host.to_string(), port))
}
