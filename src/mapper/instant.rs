//! Instant normalization applied to fields declared as `instant`.

// crates.io
use time::{
	Date, PrimitiveDateTime, format_description::well_known::Rfc3339, macros::format_description,
};
// self
use crate::{_prelude::*, mapper::MapError};

/// Parses the instant spellings the gateway is known to emit.
///
/// Accepted forms, tried in order: RFC 3339, the API's own `YYYY-MM-DDTHH:MM:SS.fffZ`, a naive
/// ISO date-time (with or without fractional seconds, `T` or space separated) taken as UTC, and
/// a bare date taken as midnight UTC.
pub fn parse(raw: &str) -> Result<OffsetDateTime, time::error::Parse> {
	if let Ok(instant) = OffsetDateTime::parse(raw, &Rfc3339) {
		return Ok(instant);
	}
	if let Ok(instant) = PrimitiveDateTime::parse(
		raw,
		format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]Z"),
	) {
		return Ok(instant.assume_utc());
	}
	if let Ok(instant) = PrimitiveDateTime::parse(
		raw,
		format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
	) {
		return Ok(instant.assume_utc());
	}
	if let Ok(instant) =
		PrimitiveDateTime::parse(raw, format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"))
	{
		return Ok(instant.assume_utc());
	}
	if let Ok(instant) = PrimitiveDateTime::parse(
		raw,
		format_description!("[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"),
	) {
		return Ok(instant.assume_utc());
	}

	Date::parse(raw, format_description!("[year]-[month]-[day]"))
		.map(|date| date.midnight().assume_utc())
}

/// Renders `instant` as RFC 3339.
pub fn format(instant: OffsetDateTime) -> Result<String, time::error::Format> {
	instant.format(&Rfc3339)
}

/// Normalizes a string instant to RFC 3339; any other JSON value passes through.
pub(crate) fn normalize(value: &Value, path: &str) -> Result<Value, MapError> {
	let Value::String(raw) = value else { return Ok(value.clone()) };
	let instant = parse(raw).map_err(|source| MapError::Instant {
		path: path.into(),
		value: raw.clone(),
		source,
	})?;

	format(instant)
		.map(Value::String)
		.map_err(|source| MapError::InstantFormat { path: path.into(), source })
}
