use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::config::ConfigError;
use crate::error::{AppError, ErrorKind};

pub const MAX_URL_LENGTH: usize = 2048;
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// An absolute `http`/`https` URL with a host and no embedded credentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ValidatedUrl {
    url: String,
    host: String,
}

impl ValidatedUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let trimmed = url.trim();

        if trimmed.is_empty() {
            return Err(Self::invalid(&url, "URL cannot be empty"));
        }
        if trimmed.len() > MAX_URL_LENGTH {
            return Err(Self::invalid(
                &url,
                &format!("URL exceeds maximum length of {MAX_URL_LENGTH} bytes"),
            ));
        }

        let parsed = Url::parse(trimmed).map_err(|e| Self::invalid(&url, &e.to_string()))?;

        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(Self::invalid(
                &url,
                &format!("invalid scheme '{scheme}', only 'http' and 'https' are allowed"),
            ));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| Self::invalid(&url, "URL must have a host"))?
            .to_lowercase();

        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(Self::invalid(&url, "credentials in URL are not allowed"));
        }

        Ok(Self {
            url: parsed.to_string(),
            host,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn invalid(url: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidUrl {
            url: Self::truncate_url(url),
            reason: reason.to_string(),
        }
    }

    fn truncate_url(url: &str) -> String {
        if url.len() <= 100 {
            return url.to_string();
        }
        let mut end = 100;
        while !url.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &url[..end])
    }
}

impl TryFrom<String> for ValidatedUrl {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ValidatedUrl> for String {
    fn from(value: ValidatedUrl) -> Self {
        value.url
    }
}

impl fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Outcome of an API call reduced to what the core acts on.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Failed(AppError),
}

/// Classifies a status code; `body` is only consulted on success.
pub fn classify<T>(status: u16, body: impl FnOnce() -> T) -> Outcome<T> {
    if (200..300).contains(&status) {
        Outcome::Success(body())
    } else {
        Outcome::Failed(AppError::from_http_status(status))
    }
}

/// Splits a crux_http result into the core's success/failure view.
///
/// crux_http already turns 4xx/5xx replies into `Error::Http`, so the status
/// mapping happens on both arms.
pub fn outcome<B>(result: crux_http::Result<crux_http::Response<B>>) -> Outcome<Option<B>> {
    match result {
        Ok(mut response) => {
            let status: u16 = response.status().into();
            classify(status, move || response.take_body())
        }
        Err(e) => Outcome::Failed(request_error(e)),
    }
}

fn request_error(error: crux_http::Error) -> AppError {
    match error {
        crux_http::Error::Http(e) => {
            AppError::from_http_status(e.code.into()).with_internal(e.message)
        }
        crux_http::Error::Timeout => AppError::new(ErrorKind::Timeout, "request timed out"),
        crux_http::Error::Json(reason) => {
            AppError::new(ErrorKind::Deserialization, "unexpected response body")
                .with_internal(reason)
        }
        crux_http::Error::Url(reason) | crux_http::Error::Io(reason) => {
            AppError::new(ErrorKind::Network, "request failed").with_internal(reason)
        }
    }
}
