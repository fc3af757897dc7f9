use crate::error::Error;
use std::{env, path::PathBuf, str::FromStr, time::Duration};

const DEFAULT_API_BASE_URL: &str = "https://reqres.in/api";
const DEFAULT_API_KEY: &str = "reqres-free-v1";
const DEFAULT_FORM_BASE_URL: &str = "https://demoqa.com/";
const DEFAULT_FIXTURES_DIR: &str = "fixtures";
const DEFAULT_VIEWPORT: (u32, u32) = (1280, 720);
const DEFAULT_TIMEOUT_MS: u64 = 10000;

pub const BASE_API_URL_KEY: &str = "BASE_API_URL";
pub const API_KEY_KEY: &str = "REQRES_API_KEY";
pub const FORM_BASE_URL_KEY: &str = "FORM_BASE_URL";
pub const VIEWPORT_WIDTH_KEY: &str = "VIEWPORT_WIDTH";
pub const VIEWPORT_HEIGHT_KEY: &str = "VIEWPORT_HEIGHT";
pub const DEFAULT_COMMAND_TIMEOUT_KEY: &str = "DEFAULT_COMMAND_TIMEOUT_MS";
pub const REQUEST_TIMEOUT_KEY: &str = "REQUEST_TIMEOUT_MS";
pub const RESPONSE_TIMEOUT_KEY: &str = "RESPONSE_TIMEOUT_MS";
pub const FIXTURES_DIR_KEY: &str = "FIXTURES_DIR";

/// Process-wide settings shared by the request executor and the form pages.
///
/// Built once at the start of a scenario and passed around by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfiguration {
    api_base_url: String,
    api_key: String,
    form_base_url: String,
    viewport: (u32, u32),
    default_command_timeout: Duration,
    request_timeout: Duration,
    response_timeout: Duration,
    fixtures_dir: PathBuf,
}

impl HarnessConfiguration {
    /// Read the configuration from the process environment, falling back to the defaults for
    /// every unset key.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    /// `Error::InvalidConfiguration` when a numeric key holds something that isn't a number.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, Error> {
        let mut configuration = Self::default();

        if let Some(value) = lookup(BASE_API_URL_KEY) {
            configuration.set_api_base_url(value);
        }
        if let Some(value) = lookup(API_KEY_KEY) {
            configuration.set_api_key(value);
        }
        if let Some(value) = lookup(FORM_BASE_URL_KEY) {
            configuration.set_form_base_url(value);
        }
        if let Some(value) = lookup(FIXTURES_DIR_KEY) {
            configuration.set_fixtures_dir(value);
        }

        let width = parse_or(&lookup, VIEWPORT_WIDTH_KEY, DEFAULT_VIEWPORT.0)?;
        let height = parse_or(&lookup, VIEWPORT_HEIGHT_KEY, DEFAULT_VIEWPORT.1)?;
        configuration.set_viewport(width, height);

        configuration.set_default_command_timeout(Duration::from_millis(parse_or(
            &lookup,
            DEFAULT_COMMAND_TIMEOUT_KEY,
            DEFAULT_TIMEOUT_MS,
        )?));
        configuration.set_request_timeout(Duration::from_millis(parse_or(
            &lookup,
            REQUEST_TIMEOUT_KEY,
            DEFAULT_TIMEOUT_MS,
        )?));
        configuration.set_response_timeout(Duration::from_millis(parse_or(
            &lookup,
            RESPONSE_TIMEOUT_KEY,
            DEFAULT_TIMEOUT_MS,
        )?));

        Ok(configuration)
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn set_api_base_url<S: Into<String>>(&mut self, url: S) {
        self.api_base_url = url.into().trim_end_matches('/').into();
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn set_api_key<S: Into<String>>(&mut self, key: S) {
        self.api_key = key.into();
    }

    pub fn form_base_url(&self) -> &str {
        &self.form_base_url
    }

    /// The form base URL always keeps a trailing slash so that page paths can be appended.
    pub fn set_form_base_url<S: Into<String>>(&mut self, url: S) {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.form_base_url = url;
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    pub fn default_command_timeout(&self) -> Duration {
        self.default_command_timeout
    }

    pub fn set_default_command_timeout(&mut self, timeout: Duration) {
        self.default_command_timeout = timeout;
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn set_request_timeout(&mut self, timeout: Duration) {
        self.request_timeout = timeout;
    }

    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    pub fn set_response_timeout(&mut self, timeout: Duration) {
        self.response_timeout = timeout;
    }

    pub fn fixtures_dir(&self) -> &PathBuf {
        &self.fixtures_dir
    }

    pub fn set_fixtures_dir<P: Into<PathBuf>>(&mut self, dir: P) {
        self.fixtures_dir = dir.into();
    }
}

impl Default for HarnessConfiguration {
    fn default() -> Self {
        Self {
            api_base_url: String::from(DEFAULT_API_BASE_URL),
            api_key: String::from(DEFAULT_API_KEY),
            form_base_url: String::from(DEFAULT_FORM_BASE_URL),
            viewport: DEFAULT_VIEWPORT,
            default_command_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            response_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            fixtures_dir: PathBuf::from(DEFAULT_FIXTURES_DIR),
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, Error>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| Error::InvalidConfiguration {
            key: key.into(),
            value,
        }),
        None => Ok(default),
    }
}
