//! Optional scalars in Recurly's XML dialect.
//!
//! The API distinguishes three shapes for an optional field:
//!
//! ```xml
//! <!-- absent: no element at all -->
//! <taxable nil="true"></taxable>          <!-- explicit null -->
//! <taxable type="boolean">false</taxable> <!-- a value -->
//! ```
//!
//! Absent and explicit null both decode to `None`. A value decodes to
//! `Some(v)`. Encoding `None` is expected to be paired with
//! `skip_serializing_if = "Option::is_none"` so the element is omitted.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, de};

use super::ParseError;

/// One optional-scalar element: its `nil` attribute and its text.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct NilElement {
    #[serde(rename = "@nil", default)]
    nil: Option<String>,
    #[serde(rename = "$text", default)]
    text: Option<String>,
}

impl NilElement {
    pub(crate) fn is_nil(&self) -> bool {
        self.nil.as_deref().is_some_and(|nil| nil.trim() == "true")
    }

    /// Text content with surrounding whitespace removed. Nil wins over text.
    pub(crate) fn value(&self) -> Option<&str> {
        if self.is_nil() {
            return None;
        }
        self.text.as_deref().map(str::trim)
    }
}

/// Decode a boolean element. An element that is neither nil nor `true`/`false`
/// is an error, including an empty one.
pub fn decode_bool(nil: Option<&str>, text: Option<&str>) -> Result<Option<bool>, ParseError> {
    let element = NilElement {
        nil: nil.map(str::to_string),
        text: text.map(str::to_string),
    };
    bool_from_element(&element)
}

fn bool_from_element(element: &NilElement) -> Result<Option<bool>, ParseError> {
    if element.is_nil() {
        return Ok(None);
    }
    let text = element.value().unwrap_or_default();
    text.parse::<bool>()
        .map(Some)
        .map_err(|_| ParseError::InvalidBool(text.to_string()))
}

/// `Option<bool>` fields.
pub mod null_bool {
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::{NilElement, bool_from_element};

    pub fn serialize<S>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_bool(*value),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let element = NilElement::deserialize(deserializer)?;
        bool_from_element(&element).map_err(de::Error::custom)
    }
}

/// `Option<OffsetDateTime>` fields, written as RFC 3339.
pub mod null_time {
    use serde::{Deserialize, Deserializer, Serializer, de, ser};
    use time::OffsetDateTime;

    use super::NilElement;
    use crate::utils::{
        ParseError,
        date_format::{format_datetime, parse_datetime},
    };

    pub fn serialize<S>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(datetime) => {
                let formatted = format_datetime(datetime).map_err(ser::Error::custom)?;
                serializer.serialize_str(&formatted)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let element = NilElement::deserialize(deserializer)?;
        if element.is_nil() {
            return Ok(None);
        }
        match element.value() {
            Some(text) if !text.is_empty() => {
                parse_datetime(text).map(Some).map_err(de::Error::custom)
            }
            other => Err(de::Error::custom(ParseError::InvalidTime(
                other.unwrap_or_default().to_string(),
            ))),
        }
    }
}

/// Timestamps in notification payloads, which write some unset values as an
/// empty element without `nil`. Non-empty text must still parse.
pub fn blank_time<'de, D>(deserializer: D) -> Result<Option<time::OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let element = NilElement::deserialize(deserializer)?;
    match element.value() {
        None | Some("") => Ok(None),
        Some(text) => super::date_format::parse_datetime(text)
            .map(Some)
            .map_err(de::Error::custom),
    }
}

/// Any other optional scalar (`String`, integers, ids, decimals). Unlike
/// booleans and timestamps, an empty element is read as `None`: the API
/// writes `<po_number></po_number>` for unset strings.
pub fn null_scalar<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let element = NilElement::deserialize(deserializer)?;
    match element.value() {
        None | Some("") => Ok(None),
        Some(text) => text.parse::<T>().map(Some).map_err(|e| {
            de::Error::custom(ParseError::InvalidValue {
                value: text.to_string(),
                reason: e.to_string(),
            })
        }),
    }
}
