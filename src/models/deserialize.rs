//! Lenient field deserializers for descriptor mappings.
//!
//! Subscription configs are written by many different tools, so the same
//! field shows up as a number in one file and a quoted string in the next.
//! These helpers resolve that once, at the format boundary.

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::Deserialize;
use std::fmt;

/// Accepts a string, a number or a boolean and keeps its textual form.
pub fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrNumberVisitor;

    impl<'de> Visitor<'de> for StringOrNumberVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("string or number")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(StringOrNumberVisitor)
}

/// Required text field; scalars of any kind are accepted and a null reads
/// as empty.
pub fn deserialize_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_string_or_number(deserializer).map(Option::unwrap_or_default)
}

/// List element read with the same scalar rules as
/// [`deserialize_string_or_number`].
struct Scalar(Option<String>);

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_string_or_number(deserializer).map(Scalar)
    }
}

/// Port given either as an integer or as a numeric string.
pub fn deserialize_port<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    match deserialize_string_or_number(deserializer)? {
        None => Ok(None),
        Some(raw) => {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(None);
            }
            raw.parse::<u16>()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("invalid port '{}'", raw)))
        }
    }
}

/// Unsigned integer given either as a number or as a numeric string.
pub fn deserialize_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match deserialize_string_or_number(deserializer)? {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid integer '{}'", raw))),
    }
}

/// Flag truthiness: `true`, any non-zero integer, or the strings `"true"` /
/// `"1"` in any case. Everything else reads as false.
pub fn deserialize_truthy<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    struct TruthyVisitor;

    impl<'de> Visitor<'de> for TruthyVisitor {
        type Value = Option<bool>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("boolean, integer or string flag")
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value != 0))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value != 0))
        }

        fn visit_f64<E>(self, _value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(false))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(is_truthy(value)))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(TruthyVisitor)
}

/// `http-opts.path` and `alpn` are lists in Clash configs but a bare
/// string in some hand-written ones.
pub fn deserialize_string_or_seq<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrSeqVisitor;

    impl<'de> Visitor<'de> for StringOrSeqVisitor {
        type Value = Option<Vec<String>>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("string or list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(vec![value.to_string()]))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(vec![value.to_string()]))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(vec![value.to_string()]))
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut items = Vec::new();
            while let Some(Scalar(item)) = seq.next_element::<Scalar>()? {
                items.extend(item);
            }
            Ok(Some(items))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(StringOrSeqVisitor)
}

/// String form of the flag rule used by share-link query parameters.
pub fn is_truthy(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1"
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "deserialize_truthy")]
        tls: Option<bool>,
        #[serde(default, deserialize_with = "deserialize_port")]
        port: Option<u16>,
        #[serde(default, deserialize_with = "deserialize_string_or_seq")]
        path: Option<Vec<String>>,
    }

    #[derive(Deserialize)]
    struct Named {
        #[serde(default, deserialize_with = "deserialize_string")]
        name: String,
        #[serde(default, deserialize_with = "deserialize_string_or_number")]
        sid: Option<String>,
    }

    fn probe(yaml: &str) -> Probe {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_truthy_forms() {
        assert_eq!(probe("tls: true").tls, Some(true));
        assert_eq!(probe("tls: 1").tls, Some(true));
        assert_eq!(probe("tls: -3").tls, Some(true));
        assert_eq!(probe("tls: 'TRUE'").tls, Some(true));
        assert_eq!(probe("tls: '1'").tls, Some(true));
        assert_eq!(probe("tls: 'yes'").tls, Some(false));
        assert_eq!(probe("tls: 0").tls, Some(false));
        assert_eq!(probe("tls: 1.0").tls, Some(false));
        assert_eq!(probe("tls: ~").tls, None);
        assert_eq!(probe("{}").tls, None);
    }

    #[test]
    fn test_port_forms() {
        assert_eq!(probe("port: 443").port, Some(443));
        assert_eq!(probe("port: '8443'").port, Some(8443));
        assert_eq!(probe("port: ''").port, None);
        assert!(serde_yaml::from_str::<Probe>("port: 70000").is_err());
        assert!(serde_yaml::from_str::<Probe>("port: abc").is_err());
    }

    #[test]
    fn test_path_forms() {
        assert_eq!(probe("path: /a").path, Some(vec!["/a".to_string()]));
        assert_eq!(
            probe("path: [/a, /b]").path,
            Some(vec!["/a".to_string(), "/b".to_string()])
        );
    }

    #[test]
    fn test_scalars_from_parsed_values() {
        // values already parsed into a document tree keep their scalar type
        let value: Value = serde_yaml::from_str("{name: 2024, sid: 12345678}").unwrap();
        let named: Named = serde_yaml::from_value(value).unwrap();
        assert_eq!(named.name, "2024");
        assert_eq!(named.sid.as_deref(), Some("12345678"));

        let value: Value = serde_yaml::from_str("{name: true, sid: ~}").unwrap();
        let named: Named = serde_yaml::from_value(value).unwrap();
        assert_eq!(named.name, "true");
        assert_eq!(named.sid, None);

        let value: Value = serde_yaml::from_str("path: [/a, 8080]").unwrap();
        let probe: Probe = serde_yaml::from_value(value).unwrap();
        assert_eq!(
            probe.path,
            Some(vec!["/a".to_string(), "8080".to_string()])
        );
    }
}
