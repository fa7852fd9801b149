use std::fmt;
use std::time::Duration;

use miette::Diagnostic;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::utils::nullable::null_scalar;

/// One field-level rejection from a `422 Unprocessable Entity` response.
///
/// ```xml
/// <error field="adjustment.currency" symbol="blank">can't be blank</error>
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[allow(clippy::module_name_repetitions)]
pub struct FieldError {
    #[serde(rename = "@field", default)]
    pub field: Option<String>,
    #[serde(rename = "@symbol", default)]
    pub symbol: Option<String>,
    #[serde(rename = "$text", default)]
    pub message: String,
}

/// The `<errors>` document returned alongside a `422`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename = "errors")]
pub struct ValidationErrors {
    #[serde(rename = "error", default)]
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Messages for a single field, e.g. `adjustment.currency`.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.errors
            .iter()
            .filter(move |error| error.field.as_deref() == Some(field))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            match &error.field {
                Some(field) => write!(f, "{field} {}", error.message)?,
                None => write!(f, "{}", error.message)?,
            }
        }
        Ok(())
    }
}

/// The generic `<error>` document returned with other non-success statuses.
///
/// ```xml
/// <error>
///   <symbol>not_found</symbol>
///   <description lang="en-US">Couldn't find Account with account_code = abc</description>
/// </error>
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename = "error")]
pub struct ApiError {
    #[serde(default, deserialize_with = "null_scalar")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub details: Option<String>,
}

/// Errors that can occur when interacting with the Recurly API.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("error making request: {0:?}")]
    #[diagnostic(
        code(recurly::request_error),
        help("Check your network connection and Recurly API availability")
    )]
    Request(#[source] reqwest::Error),

    #[error("endpoint could not be parsed as a URL")]
    #[diagnostic(
        code(recurly::invalid_endpoint),
        help("Check the configured subdomain or base URL")
    )]
    InvalidEndpoint,

    #[error("missing configuration value: {name}")]
    #[diagnostic(
        code(recurly::missing_config),
        help("Set the {name} environment variable")
    )]
    MissingConfig { name: &'static str },

    #[error("error encoding request body: {0}")]
    #[diagnostic(code(recurly::serialization_error))]
    Serialization(#[source] quick_xml::SeError),

    #[error("error decoding response: {0}")]
    #[diagnostic(
        code(recurly::parse_error),
        help("The API returned data in an unexpected format")
    )]
    Parse(#[source] quick_xml::DeError, Option<String>),

    #[error("malformed XML: {0}")]
    #[diagnostic(code(recurly::xml_error))]
    Xml(#[source] quick_xml::Error),

    #[error("object not found: {entity} (url: {url})")]
    #[diagnostic(
        code(recurly::not_found),
        help("Verify that the {entity} exists on this site")
    )]
    NotFound {
        entity: String,
        url: String,
        status_code: StatusCode,
        response_body: Option<String>,
    },

    /// The provider rejected one or more fields of a create request.
    #[error("validation failed: {errors}")]
    #[diagnostic(
        code(recurly::validation),
        help("Review the field errors returned by the Recurly API")
    )]
    Validation { url: String, errors: ValidationErrors },

    /// Rate limit exceeded (HTTP 429 Too Many Requests)
    #[error("rate limit exceeded: retry after {retry_after:?}")]
    #[diagnostic(
        code(recurly::rate_limit_exceeded),
        help("The Recurly API rate limit has been exceeded. Wait and retry, or throttle requests.")
    )]
    RateLimitExceeded {
        retry_after: Option<Duration>,
        status_code: StatusCode,
        url: String,
        response_body: Option<String>,
    },

    /// Any other non-success status.
    #[error("unexpected response {status_code} from {url}")]
    #[diagnostic(code(recurly::api_error))]
    Api {
        status_code: StatusCode,
        url: String,
        response_body: Option<String>,
        error: Option<ApiError>,
    },

    #[error("unrecognized webhook notification: <{name}>")]
    #[diagnostic(
        code(recurly::unrecognized_webhook),
        help("The payload's root element does not name a known notification")
    )]
    UnrecognizedWebhook { name: String },
}

impl Error {
    /// The request URL, for errors raised from an HTTP response.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::NotFound { url, .. }
            | Self::Validation { url, .. }
            | Self::RateLimitExceeded { url, .. }
            | Self::Api { url, .. } => Some(url),
            Self::Request(e) => e.url().map(url::Url::as_str),
            _ => None,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::NotFound { status_code, .. }
            | Self::RateLimitExceeded { status_code, .. }
            | Self::Api { status_code, .. } => Some(*status_code),
            Self::Validation { .. } => Some(StatusCode::UNPROCESSABLE_ENTITY),
            Self::Request(e) => e.status(),
            _ => None,
        }
    }

    #[must_use]
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::NotFound { response_body, .. }
            | Self::RateLimitExceeded { response_body, .. }
            | Self::Api { response_body, .. } => response_body.as_deref(),
            Self::Parse(_, body) => body.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e)
    }
}

impl From<quick_xml::DeError> for Error {
    fn from(e: quick_xml::DeError) -> Self {
        Self::Parse(e, None)
    }
}

impl From<quick_xml::SeError> for Error {
    fn from(e: quick_xml::SeError) -> Self {
        Self::Serialization(e)
    }
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(e)
    }
}

/// Type alias for results from this crate.
///
/// This is already a Miette diagnostic result due to the implementation of
/// the Diagnostic trait for the Error type.
pub type Result<O> = std::result::Result<O, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_validation_errors() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <errors>
              <error field="adjustment.currency" symbol="blank">can't be blank</error>
              <error field="adjustment.unit_amount_in_cents" symbol="not_a_number">is not a number</error>
            </errors>"#;
        let errors: ValidationErrors = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(errors.errors.len(), 2);
        assert_eq!(errors.errors[0].symbol.as_deref(), Some("blank"));
        assert_eq!(
            errors.for_field("adjustment.unit_amount_in_cents").next().map(|e| e.message.as_str()),
            Some("is not a number")
        );
        assert_eq!(
            errors.to_string(),
            "adjustment.currency can't be blank; adjustment.unit_amount_in_cents is not a number"
        );
    }

    #[test]
    fn parses_api_error() {
        let xml = r#"<error>
              <symbol>not_found</symbol>
              <description lang="en-US">Couldn't find Account with account_code = abc</description>
            </error>"#;
        let error: ApiError = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(error.symbol.as_deref(), Some("not_found"));
        assert_eq!(
            error.description.as_deref(),
            Some("Couldn't find Account with account_code = abc")
        );
        assert_eq!(error.details, None);
    }

    #[test]
    fn accessors_expose_response_context() {
        let error = Error::NotFound {
            entity: "Adjustment".to_string(),
            url: "https://example.recurly.com/v2/adjustments/abc".to_string(),
            status_code: StatusCode::NOT_FOUND,
            response_body: Some("<error/>".to_string()),
        };
        assert_eq!(error.status_code(), Some(StatusCode::NOT_FOUND));
        assert_eq!(error.url(), Some("https://example.recurly.com/v2/adjustments/abc"));
        assert_eq!(error.response_body(), Some("<error/>"));
        assert!(error.to_string().contains("Adjustment"));
    }
}
