use time::{
    OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339,
    macros::format_description,
};

use super::ParseError;

// Recurly writes timestamps as RFC 3339 (`2014-01-01T20:21:44Z`). Some older
// payloads drop the offset, in which case the value is UTC.
pub fn parse_datetime(datetime_str: &str) -> Result<OffsetDateTime, ParseError> {
    let datetime_str = datetime_str.trim();

    if let Ok(dt) = OffsetDateTime::parse(datetime_str, &Rfc3339) {
        return Ok(dt);
    }

    if datetime_str.contains('T') && !datetime_str.contains('Z') && !datetime_str.contains('+') {
        let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
        if let Ok(dt) = PrimitiveDateTime::parse(datetime_str, &format) {
            return Ok(dt.assume_utc());
        }
    }

    Err(ParseError::InvalidTime(datetime_str.to_string()))
}

pub fn format_datetime(datetime: &OffsetDateTime) -> Result<String, time::error::Format> {
    datetime.format(&Rfc3339)
}
