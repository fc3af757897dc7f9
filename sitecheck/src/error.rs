use crate::driver::Locator;
use std::{fmt::Display, io, path::PathBuf, time::Duration};

/// Expected vs. actual values of a failed assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionFailure {
    pub subject: String,
    pub expected: String,
    pub actual: String,
}

impl AssertionFailure {
    pub fn new<S1, S2, S3>(subject: S1, expected: S2, actual: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self {
            subject: subject.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

#[derive(Debug)]
pub enum Error {
    ElementNotFound(Locator),
    ElementNotInteractable(Locator),
    OptionNotFound { target: Locator, option: String },
    FixtureNotFound(PathBuf),
    DateCellNotFound(String),
    SubmissionNotConfirmed(String),
    Timeout { waited_for: String, budget: Duration },
    AssertionFailed(AssertionFailure),
    UnexpectedFormState { operation: &'static str, state: &'static str },
    UnexpectedStatus { url: String, status_code: u16 },
    InvalidFormData(String),
    InvalidConfiguration { key: String, value: String },
    InvalidHeaderName,
    InvalidHeaderValue,
    DriverError(String),
    JsonError(serde_json::Error),
    ReqwestError(reqwest::Error),
    HyperError(hyper::Error),
    HttpError(hyper::http::Error),
    IoError(io::Error),
}

impl Error {
    pub(crate) fn assertion<S1, S2, S3>(subject: S1, expected: S2, actual: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Error::AssertionFailed(AssertionFailure::new(subject, expected, actual))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ElementNotFound(locator) => write!(f, "No element matches {}", locator),
            Error::ElementNotInteractable(locator) => {
                write!(f, "Element {} is not visible or not enabled", locator)
            }
            Error::OptionNotFound { target, option } => {
                write!(f, "Option \"{}\" did not render for {}", option, target)
            }
            Error::FixtureNotFound(path) => {
                write!(f, "Fixture file {} does not exist", path.display())
            }
            Error::DateCellNotFound(token) => {
                write!(f, "The calendar has no day cell \"{}\"", token)
            }
            Error::SubmissionNotConfirmed(reason) => {
                write!(f, "The submission was not confirmed: {}", reason)
            }
            Error::Timeout { waited_for, budget } => write!(
                f,
                "Timed out after {}ms waiting for {}",
                budget.as_millis(),
                waited_for
            ),
            Error::AssertionFailed(AssertionFailure {
                subject,
                expected,
                actual,
            }) => write!(
                f,
                "Assertion failed for {}: expected {}, got {}",
                subject, expected, actual
            ),
            Error::UnexpectedFormState { operation, state } => write!(
                f,
                "{} can't be performed while the form is {}",
                operation, state
            ),
            Error::UnexpectedStatus { url, status_code } => {
                write!(f, "{} responded with status {}", url, status_code)
            }
            Error::InvalidFormData(reason) => write!(f, "Invalid form data: {}", reason),
            Error::InvalidConfiguration { key, value } => {
                write!(f, "Invalid value \"{}\" for {}", value, key)
            }
            Error::InvalidHeaderName => write!(f, "Invalid header name"),
            Error::InvalidHeaderValue => write!(f, "Invalid header value"),
            Error::DriverError(e) => write!(f, "Browser driver error: {}", e),
            Error::JsonError(e) => write!(f, "JSON error: {}", e),
            Error::ReqwestError(e) => write!(f, "reqwest error: {}", e),
            Error::HyperError(e) => write!(f, "Hyper error: {}", e),
            Error::HttpError(e) => write!(f, "Http Error: {}", e),
            Error::IoError(e) => write!(f, "IoError: {}", e),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::IoError(e)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::ReqwestError(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::JsonError(e)
    }
}

impl From<hyper::header::InvalidHeaderName> for Error {
    fn from(_: hyper::header::InvalidHeaderName) -> Self {
        Error::InvalidHeaderName
    }
}

impl From<hyper::header::InvalidHeaderValue> for Error {
    fn from(_: hyper::header::InvalidHeaderValue) -> Self {
        Error::InvalidHeaderValue
    }
}

impl From<hyper::Error> for Error {
    fn from(e: hyper::Error) -> Self {
        Error::HyperError(e)
    }
}

impl From<hyper::http::Error> for Error {
    fn from(e: hyper::http::Error) -> Self {
        Error::HttpError(e)
    }
}
