use std::fmt::Display;

#[derive(Debug)]
pub enum Error {
    Harness(sitecheck::Error),
    /// The service answered, but its answers contradict each other.
    InconsistentData(String),
    InvalidTimestamp(String),
}

impl std::error::Error for Error {}

impl From<sitecheck::Error> for Error {
    fn from(e: sitecheck::Error) -> Self {
        Error::Harness(e)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Harness(e) => write!(f, "{}", e),
            Error::InconsistentData(description) => {
                write!(f, "Inconsistent data: {}", description)
            }
            Error::InvalidTimestamp(timestamp) => {
                write!(f, "\"{}\" is not a valid RFC 3339 timestamp", timestamp)
            }
        }
    }
}
