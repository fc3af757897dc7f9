use reqwest::Method;
use serde_json::Value;
use std::{collections::HashMap, time::Duration};

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    /// Sent byte for byte, e.g. to probe how a service reacts to malformed JSON.
    Raw(String),
}

/// One HTTP call as a scenario describes it, before the executor merges in its defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub body: Option<RequestBody>,
    pub headers: HashMap<String, String>,
    pub timeout: Option<Duration>,
    pub fail_on_status_code: bool,
    pub use_default_headers: bool,
}

impl RequestDescriptor {
    pub fn new<S: Into<String>>(method: Method, url: S) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            headers: HashMap::new(),
            timeout: None,
            fail_on_status_code: false,
            use_default_headers: true,
        }
    }

    pub fn get<S: Into<String>>(url: S) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post<S: Into<String>>(url: S) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn with_raw_body<S: Into<String>>(mut self, body: S) -> Self {
        self.body = Some(RequestBody::Raw(body.into()));
        self
    }

    /// Names are stored lower-cased, so setting the same header twice in any casing keeps
    /// the last value.
    pub fn with_header<S1: Into<String>, S2: Into<String>>(mut self, name: S1, value: S2) -> Self {
        self.headers.insert(name.into().to_lowercase(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Turn non-2xx responses into `Error::UnexpectedStatus` instead of returning them.
    pub fn failing_on_status_code(mut self) -> Self {
        self.fail_on_status_code = true;
        self
    }

    /// Send only the headers set on this descriptor.
    pub fn without_default_headers(mut self) -> Self {
        self.use_default_headers = false;
        self
    }
}

/// A fully resolved request as handed to an `HttpClient`.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<RequestBody>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: Value,
    pub duration: Duration,
}

impl ResponseEnvelope {
    /// Interpret a raw response body: empty is `Null`, anything that isn't JSON is kept as a
    /// string.
    pub fn parse_body(text: &str) -> Value {
        if text.trim().is_empty() {
            return Value::Null;
        }

        serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.into()))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers.get(&name.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_parsing_keeps_non_json_text() {
        assert_eq!(ResponseEnvelope::parse_body(""), Value::Null);
        assert_eq!(ResponseEnvelope::parse_body("{}"), json!({}));
        assert_eq!(
            ResponseEnvelope::parse_body("Bad Request"),
            Value::String("Bad Request".into())
        );
    }

    #[test]
    fn test_descriptor_defaults_do_not_raise_on_status() {
        let descriptor = RequestDescriptor::get("http://localhost/users");

        assert!(!descriptor.fail_on_status_code);
        assert!(descriptor.use_default_headers);
        assert!(descriptor.body.is_none());
        assert!(descriptor.failing_on_status_code().fail_on_status_code);
    }

    #[test]
    fn test_last_header_write_wins_across_casings() {
        let descriptor = RequestDescriptor::get("http://localhost/users")
            .with_header("X-Api-Key", "first")
            .with_header("x-api-key", "second");

        assert_eq!(descriptor.headers.len(), 1);
        assert_eq!(descriptor.headers["x-api-key"], "second");
    }
}
