use miette::Diagnostic;
use thiserror::Error;

pub mod date_format;
pub mod href;
pub mod nullable;

/// A single element that could not be decoded into its field type.
///
/// These surface inside [`crate::Error::Parse`] when a whole document is
/// decoded, and are returned directly by [`href::trailing_segment`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ParseError {
    #[error("invalid boolean value: {0:?}")]
    #[diagnostic(code(recurly::parse::invalid_bool))]
    InvalidBool(String),

    #[error("invalid timestamp value: {0:?}")]
    #[diagnostic(
        code(recurly::parse::invalid_time),
        help("Timestamps are expected in RFC 3339 form, e.g. 2014-01-01T20:21:44Z")
    )]
    InvalidTime(String),

    #[error("invalid value {value:?}: {reason}")]
    #[diagnostic(code(recurly::parse::invalid_value))]
    InvalidValue { value: String, reason: String },

    #[error("linked element has no href attribute")]
    #[diagnostic(code(recurly::parse::missing_href))]
    MissingHref,

    #[error("href has no usable trailing path segment: {0:?}")]
    #[diagnostic(code(recurly::parse::invalid_href))]
    InvalidHref(String),
}
