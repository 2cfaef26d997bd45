//! Helpers for reading HTML form and query values.

use crate::errors::{Error, Result};
use serde::{Deserialize, Deserializer, de};
use std::{fmt, str::FromStr};

/// Deserializes an optional value where an empty string means "absent".
///
/// Browsers submit empty fields and `?passenger_id=` as `""`.
pub fn empty_string_as_none<'de, D, T>(de: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => FromStr::from_str(s).map_err(de::Error::custom).map(Some),
    }
}

/// Parses a numeric form field, reporting `message` when it is not a number.
pub fn parse_number<T: FromStr>(value: &str, message: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::validation(message))
}

/// Reads an HTML checkbox value.
#[must_use]
pub fn is_checked(value: Option<&str>) -> bool {
    matches!(
        value.map(str::trim),
        Some("true" | "on" | "1" | "yes")
    )
}
