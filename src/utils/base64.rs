use base64::alphabet;
use base64::engine::general_purpose::{self, GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use log::debug;

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_encode_padding(false)
    .with_decode_allow_trailing_bits(true)
    .with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// Standard alphabet, padding optional.
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// URL-safe alphabet, padding optional.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Encodes a string to Base64 format.
pub fn base64_encode(input: &str) -> String {
    general_purpose::STANDARD.encode(input)
}

/// Encodes a string to URL-safe Base64 without padding.
pub fn url_safe_base64_encode(input: &str) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(input)
}

/// Decodes a Base64 string, accepting either alphabet and missing padding.
///
/// Line breaks and other ASCII whitespace inside the input are ignored, since
/// some providers wrap their payload at 76 columns.
///
/// # Returns
/// The decoded bytes, or `None` if the input is not Base64 in either alphabet.
pub fn try_base64_decode(input: &str) -> Option<Vec<u8>> {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    STANDARD_LENIENT
        .decode(&cleaned)
        .or_else(|_| URL_SAFE_LENIENT.decode(&cleaned))
        .ok()
}

/// Decodes a Base64 string to text.
///
/// # Returns
/// The decoded string, or an empty string if the input is invalid.
pub fn base64_decode(input: &str) -> String {
    match try_base64_decode(input) {
        Some(decoded) => String::from_utf8_lossy(&decoded).to_string(),
        None => String::new(),
    }
}

/// Best-effort decode of a subscription body.
///
/// Returns the decoded bytes when the whole payload is Base64, otherwise the
/// payload unchanged: plaintext subscriptions are common and are not an
/// error.
pub fn decode_subscription(raw: &[u8]) -> Vec<u8> {
    let text = match std::str::from_utf8(raw) {
        Ok(text) => text.trim(),
        Err(_) => {
            debug!("Subscription body is not UTF-8, passing it through");
            return raw.to_vec();
        }
    };

    match try_base64_decode(text) {
        Some(decoded) => decoded,
        None => {
            debug!("Subscription body is not Base64, treating it as plaintext");
            raw.to_vec()
        }
    }
}

/// Decodes a share-link body that may itself be Base64 wrapped.
///
/// Falls back to the body as-is when it does not decode to printable UTF-8.
pub fn decode_link_body(body: &str) -> String {
    try_base64_decode(body)
        .and_then(|decoded| String::from_utf8(decoded).ok())
        .filter(|text| !text.is_empty() && !text.chars().any(char::is_control))
        .unwrap_or_else(|| body.to_string())
}
