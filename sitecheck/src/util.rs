use crate::error::Error;
use hyper::{
    header::{HeaderName, HeaderValue},
    HeaderMap,
};
use std::collections::HashMap;

pub fn extract_headers(header_map: &HeaderMap) -> HashMap<String, String> {
    // header values with opaque characters are skipped
    header_map
        .iter()
        .map(|(k, v)| (String::from(k.as_str()), v.to_str()))
        .filter_map(|(key, value)| value.ok().map(|v| (key, String::from(v))))
        .collect::<HashMap<_, _>>()
}

pub fn put_headers<'a, I: IntoIterator<Item = (&'a String, &'a String)>>(
    header_map: &mut HeaderMap<HeaderValue>,
    headers: I,
) -> Result<(), Error> {
    for (key, value) in headers {
        let header_name = HeaderName::from_lowercase(key.to_lowercase().as_bytes())?;
        let header_value = HeaderValue::from_str(value)?;
        header_map.insert(header_name, header_value);
    }

    Ok(())
}

/// Merge `overrides` over `defaults`. Names are compared case-insensitively and come out
/// lower-cased; on a clash the override always wins.
pub fn merge_headers(
    defaults: &HashMap<String, String>,
    overrides: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut merged = defaults
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.clone()))
        .collect::<HashMap<_, _>>();

    for (key, value) in overrides {
        merged.insert(key.to_lowercase(), value.clone());
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_override_wins_for_every_shared_key() {
        let defaults = headers(&[
            ("Content-Type", "application/json"),
            ("x-api-key", "default-key"),
        ]);
        let overrides = headers(&[("content-type", "text/plain"), ("X-Api-Key", "")]);

        let merged = merge_headers(&defaults, &overrides);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged["content-type"], "text/plain");
        assert_eq!(merged["x-api-key"], "");
    }

    #[test]
    fn test_defaults_survive_when_not_overridden() {
        let defaults = headers(&[("Content-Type", "application/json")]);
        let overrides = headers(&[("Accept", "*/*")]);

        let merged = merge_headers(&defaults, &overrides);

        assert_eq!(merged["content-type"], "application/json");
        assert_eq!(merged["accept"], "*/*");
    }

    #[test]
    fn test_put_headers_rejects_invalid_names() {
        let mut map = HeaderMap::new();
        let bad = headers(&[("bad header", "value")]);

        assert!(matches!(
            put_headers(&mut map, &bad),
            Err(Error::InvalidHeaderName)
        ));
    }
}
