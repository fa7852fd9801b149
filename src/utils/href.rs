//! Linked sub-resources.
//!
//! On read, Recurly expresses foreign keys as links rather than values:
//!
//! ```xml
//! <account href="https://subdomain.recurly.com/v2/accounts/abc123"/>
//! <invoice href="https://subdomain.recurly.com/v2/invoices/1005"/>
//! ```
//!
//! The last path segment of the link is the code or number we want.

use std::{fmt::Display, str::FromStr};

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Deserializer, de};
use url::Url;

use super::ParseError;

#[derive(Debug, Deserialize)]
struct HrefElement {
    #[serde(rename = "@href", default)]
    href: Option<String>,
}

/// Returns the trailing path segment of `href`, parsed as `T`.
///
/// Accepts absolute URLs as well as bare paths. A trailing slash is ignored and
/// the segment is percent-decoded, so `accounts/a%20b%2Fc` yields `a b/c`.
pub fn trailing_segment<T>(href: &str) -> Result<T, ParseError>
where
    T: FromStr,
    T::Err: Display,
{
    let path = match Url::parse(href) {
        Ok(url) => url.path().to_string(),
        Err(_) => href.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    let segment = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| ParseError::InvalidHref(href.to_string()))?;
    let segment = percent_decode_str(segment)
        .decode_utf8()
        .map_err(|_| ParseError::InvalidHref(href.to_string()))?;

    segment.parse::<T>().map_err(|e| ParseError::InvalidValue {
        value: segment.to_string(),
        reason: e.to_string(),
    })
}

/// Deserialize an optional linked element into its trailing code. The element
/// being absent is `None`; being present without an `href` is an error.
pub fn linked_code<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let element = HrefElement::deserialize(deserializer)?;
    let href = element
        .href
        .ok_or_else(|| de::Error::custom(ParseError::MissingHref))?;
    trailing_segment(&href).map(Some).map_err(de::Error::custom)
}
