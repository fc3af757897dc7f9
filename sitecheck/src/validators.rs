//! Declarative assertions over HTTP responses.
//!
//! Every validator is a pure function of its inputs: scenarios may apply any subset of them
//! in any order.

use crate::{data::ResponseEnvelope, error::Error};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::time::Duration;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref URL_REGEX: Regex = Regex::new(r"^https?://.+").unwrap();
}

pub fn is_email_shaped(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

pub fn is_url_shaped(value: &str) -> bool {
    URL_REGEX.is_match(value)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ValidationKind {
    NumericPositive,
    NonEmptyString,
    EmailShape,
    UrlShape,
    /// Present and not null.
    Existence,
}

impl ValidationKind {
    pub fn check(self, field: &str, value: &Value) -> Result<(), Error> {
        match self {
            ValidationKind::NumericPositive => match value.as_f64() {
                Some(number) if number > 0.0 => Ok(()),
                _ => Err(Error::assertion(field, "a number greater than 0", describe(value))),
            },
            ValidationKind::NonEmptyString => match value.as_str() {
                Some(text) if !text.is_empty() => Ok(()),
                _ => Err(Error::assertion(field, "a non-empty string", describe(value))),
            },
            ValidationKind::EmailShape => match value.as_str() {
                Some(text) if is_email_shaped(text) => Ok(()),
                _ => Err(Error::assertion(field, "an email address", describe(value))),
            },
            ValidationKind::UrlShape => match value.as_str() {
                Some(text) if is_url_shaped(text) => Ok(()),
                _ => Err(Error::assertion(field, "an http(s) URL", describe(value))),
            },
            ValidationKind::Existence => {
                if value.is_null() {
                    Err(Error::assertion(field, "a non-null value", "null"))
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Which fields of a record to check, and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValidationSpec {
    fields: Vec<(String, ValidationKind)>,
}

impl FieldValidationSpec {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// The shape of a user record: `id`, `email`, `first_name`, `last_name`, `avatar`.
    pub fn user_record() -> Self {
        Self::new()
            .with_field("id", ValidationKind::NumericPositive)
            .with_field("email", ValidationKind::EmailShape)
            .with_field("first_name", ValidationKind::NonEmptyString)
            .with_field("last_name", ValidationKind::NonEmptyString)
            .with_field("avatar", ValidationKind::UrlShape)
    }

    /// Add a field, or replace the kind of one already listed.
    pub fn with_field<S: Into<String>>(mut self, field: S, kind: ValidationKind) -> Self {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = kind,
            None => self.fields.push((field, kind)),
        }
        self
    }

    pub fn without_field(mut self, field: &str) -> Self {
        self.fields.retain(|(name, _)| name != field);
        self
    }

    pub fn fields(&self) -> &[(String, ValidationKind)] {
        &self.fields
    }
}

impl Default for FieldValidationSpec {
    fn default() -> Self {
        Self::user_record()
    }
}

pub fn assert_status(envelope: &ResponseEnvelope, expected: u16) -> Result<(), Error> {
    if envelope.status_code == expected {
        Ok(())
    } else {
        Err(Error::assertion(
            "status code",
            expected.to_string(),
            envelope.status_code.to_string(),
        ))
    }
}

/// For services whose answer is known to vary between a few codes.
pub fn assert_status_one_of(envelope: &ResponseEnvelope, expected: &[u16]) -> Result<(), Error> {
    if expected.contains(&envelope.status_code) {
        Ok(())
    } else {
        Err(Error::assertion(
            "status code",
            format!("one of {:?}", expected),
            envelope.status_code.to_string(),
        ))
    }
}

pub fn assert_within_duration(envelope: &ResponseEnvelope, max: Duration) -> Result<(), Error> {
    if envelope.duration < max {
        Ok(())
    } else {
        Err(Error::assertion(
            "response time",
            format!("less than {}ms", max.as_millis()),
            format!("{}ms", envelope.duration.as_millis()),
        ))
    }
}

pub fn assert_shape(record: &Value, spec: &FieldValidationSpec) -> Result<(), Error> {
    for (field, kind) in spec.fields() {
        let value = record
            .get(field)
            .ok_or_else(|| Error::assertion(field.as_str(), "field to be present", "missing"))?;
        kind.check(field, value)?;
    }

    Ok(())
}

pub fn assert_pagination_envelope(
    envelope: &ResponseEnvelope,
    expected_page: u64,
) -> Result<(), Error> {
    let body = &envelope.body;

    let page = require(body, "page")?;
    match page.as_f64() {
        Some(p) if p.fract() == 0.0 && p == expected_page as f64 => {}
        _ => {
            return Err(Error::assertion(
                "page",
                expected_page.to_string(),
                describe(page),
            ))
        }
    }

    for field in &["per_page", "total", "total_pages"] {
        let value = require(body, field)?;
        if !value.is_number() {
            return Err(Error::assertion(*field, "a number", describe(value)));
        }
    }

    let data = require(body, "data")?;
    if !data.is_array() {
        return Err(Error::assertion("data", "an array", describe(data)));
    }

    Ok(())
}

pub fn assert_support_block(envelope: &ResponseEnvelope) -> Result<(), Error> {
    let support = require(&envelope.body, "support")?;

    for field in &["url", "text"] {
        let value = support
            .get(*field)
            .ok_or_else(|| Error::assertion(format!("support.{}", field), "a string", "missing"))?;
        if !value.is_string() {
            return Err(Error::assertion(
                format!("support.{}", field),
                "a string",
                describe(value),
            ));
        }
    }

    Ok(())
}

/// Empty body: no content at all, or an empty JSON object.
pub fn assert_empty_body(envelope: &ResponseEnvelope) -> Result<(), Error> {
    let empty = match &envelope.body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::String(text) => text.is_empty(),
        _ => false,
    };

    if empty {
        Ok(())
    } else {
        Err(Error::assertion(
            "body",
            "an empty body",
            describe(&envelope.body),
        ))
    }
}

pub fn assert_field_eq(record: &Value, field: &str, expected: &Value) -> Result<(), Error> {
    let actual = require(record, field)?;
    if actual == expected {
        Ok(())
    } else {
        Err(Error::assertion(field, describe(expected), describe(actual)))
    }
}

fn require<'a>(record: &'a Value, field: &str) -> Result<&'a Value, Error> {
    record
        .get(field)
        .ok_or_else(|| Error::assertion(field, "field to be present", "missing"))
}

fn describe(value: &Value) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn envelope(status_code: u16, body: Value) -> ResponseEnvelope {
        ResponseEnvelope {
            status_code,
            headers: HashMap::new(),
            body,
            duration: Duration::from_millis(120),
        }
    }

    fn user() -> Value {
        json!({
            "id": 2,
            "email": "janet.weaver@reqres.in",
            "first_name": "Janet",
            "last_name": "Weaver",
            "avatar": "https://reqres.in/img/faces/2-image.jpg"
        })
    }

    fn failed_subject(result: Result<(), Error>) -> String {
        match result {
            Err(Error::AssertionFailed(failure)) => failure.subject,
            other => panic!("Expected an assertion failure, got {:?}", other),
        }
    }

    #[test]
    fn test_user_record_passes_default_spec() {
        assert_shape(&user(), &FieldValidationSpec::default()).unwrap();
    }

    #[test]
    fn test_missing_avatar_is_cited() {
        let mut record = user();
        record.as_object_mut().unwrap().remove("avatar");

        assert_eq!(
            failed_subject(assert_shape(&record, &FieldValidationSpec::default())),
            "avatar"
        );
    }

    #[test]
    fn test_each_kind_rejects_wrong_values() {
        let cases = vec![
            (ValidationKind::NumericPositive, json!(0)),
            (ValidationKind::NumericPositive, json!("2")),
            (ValidationKind::NonEmptyString, json!("")),
            (ValidationKind::EmailShape, json!("janet weaver@reqres.in")),
            (ValidationKind::UrlShape, json!("ftp://reqres.in/avatar.jpg")),
            (ValidationKind::Existence, Value::Null),
        ];

        for (kind, value) in cases {
            assert!(kind.check("field", &value).is_err(), "{:?} {}", kind, value);
        }
    }

    #[test]
    fn test_spec_overrides_replace_kind() {
        let spec = FieldValidationSpec::user_record()
            .with_field("avatar", ValidationKind::Existence)
            .without_field("email")
            .with_field("job", ValidationKind::NonEmptyString);

        let kinds = spec
            .fields()
            .iter()
            .map(|(name, kind)| (name.as_str(), *kind))
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                ("id", ValidationKind::NumericPositive),
                ("first_name", ValidationKind::NonEmptyString),
                ("last_name", ValidationKind::NonEmptyString),
                ("avatar", ValidationKind::Existence),
                ("job", ValidationKind::NonEmptyString),
            ]
        );
    }

    #[test]
    fn test_pagination_envelope() {
        let body = json!({
            "page": 2,
            "per_page": 6,
            "total": 12,
            "total_pages": 2,
            "data": []
        });

        assert_pagination_envelope(&envelope(200, body.clone()), 2).unwrap();
        assert_eq!(
            failed_subject(assert_pagination_envelope(&envelope(200, body.clone()), 1)),
            "page"
        );

        let mut wrong_type = body.clone();
        wrong_type["total"] = json!("12");
        assert_eq!(
            failed_subject(assert_pagination_envelope(&envelope(200, wrong_type), 2)),
            "total"
        );

        let mut not_a_list = body;
        not_a_list["data"] = json!({});
        assert_eq!(
            failed_subject(assert_pagination_envelope(&envelope(200, not_a_list), 2)),
            "data"
        );
    }

    #[test]
    fn test_pagination_envelope_requires_every_field() {
        let body = json!({
            "page": 2,
            "per_page": 6,
            "total": 12,
            "total_pages": 2,
            "data": []
        });

        for field in &["page", "per_page", "total", "total_pages", "data"] {
            let mut incomplete = body.clone();
            incomplete.as_object_mut().unwrap().remove(*field);

            let result = assert_pagination_envelope(&envelope(200, incomplete), 2);
            match result {
                Err(Error::AssertionFailed(failure)) => {
                    assert_eq!(failure.subject, *field);
                    assert_eq!(failure.actual, "missing");
                }
                other => panic!("Expected {} to be required, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_pagination_page_must_be_integral() {
        let mut body = json!({
            "page": 2.0,
            "per_page": 6,
            "total": 12,
            "total_pages": 2,
            "data": []
        });
        assert_pagination_envelope(&envelope(200, body.clone()), 2).unwrap();

        body["page"] = json!(2.5);
        assert_eq!(
            failed_subject(assert_pagination_envelope(&envelope(200, body.clone()), 2)),
            "page"
        );

        body["page"] = json!("2");
        assert_eq!(
            failed_subject(assert_pagination_envelope(&envelope(200, body), 2)),
            "page"
        );
    }

    #[test]
    fn test_support_block() {
        let ok = json!({"support": {"url": "https://reqres.in/#support-heading", "text": "Thanks"}});
        assert_support_block(&envelope(200, ok)).unwrap();

        let missing_text = json!({"support": {"url": "https://reqres.in"}});
        assert_eq!(
            failed_subject(assert_support_block(&envelope(200, missing_text))),
            "support.text"
        );
    }

    #[test]
    fn test_status_and_duration() {
        let response = envelope(404, json!({}));

        assert_status(&response, 404).unwrap();
        assert_eq!(failed_subject(assert_status(&response, 200)), "status code");
        assert_status_one_of(&response, &[400, 404]).unwrap();
        assert!(assert_status_one_of(&response, &[200, 201]).is_err());

        assert_within_duration(&response, Duration::from_millis(500)).unwrap();
        assert_eq!(
            failed_subject(assert_within_duration(&response, Duration::from_millis(100))),
            "response time"
        );
    }

    #[test]
    fn test_failure_carries_expected_and_actual() {
        match assert_status(&envelope(500, Value::Null), 200) {
            Err(Error::AssertionFailed(failure)) => {
                assert_eq!(failure.expected, "200");
                assert_eq!(failure.actual, "500");
            }
            other => panic!("Expected an assertion failure, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_body() {
        assert_empty_body(&envelope(404, json!({}))).unwrap();
        assert_empty_body(&envelope(404, Value::Null)).unwrap();
        assert!(assert_empty_body(&envelope(200, json!({"data": []}))).is_err());
    }
}
