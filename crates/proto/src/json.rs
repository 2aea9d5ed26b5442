//! The companion's JSON object form of a dictionary.
//!
//! Companion scripts address tuples by name (`{"kind": "status", "id": 2,
//! "free": "10"}`) or by raw numeric key (`{"0": 2}`). Conversion goes through
//! [`Dictionary`] so the same envelope limits apply to both forms.

use serde_json::{Map, Value};

use crate::dict::{Dictionary, TupleValue};
use crate::error::{CodecError, Result};
use crate::keys::{MessageKey, MessageKind};

/// Parses one JSON object into a dictionary.
pub fn from_json_str(line: &str) -> Result<Dictionary> {
	let value: Value = serde_json::from_str(line).map_err(|err| CodecError::Json(err.to_string()))?;
	from_json(&value)
}

/// Converts a JSON object into a dictionary.
pub fn from_json(value: &Value) -> Result<Dictionary> {
	let Value::Object(map) = value else {
		return Err(CodecError::Json("expected a json object".into()));
	};

	let mut dict = Dictionary::new();
	for (name, value) in map {
		let key = match MessageKey::from_name(name) {
			Some(key) => key.raw(),
			None => name
				.parse::<u32>()
				.map_err(|_| CodecError::Json(format!("unknown key {name:?}")))?,
		};
		let value = if key == MessageKey::Kind.raw()
			&& let Value::String(kind) = value
		{
			let kind = MessageKind::from_name(kind).ok_or_else(|| CodecError::Json(format!("unknown kind {kind:?}")))?;
			TupleValue::from(kind.raw())
		} else {
			tuple_from_json(name, value)?
		};
		dict.insert_raw(key, value)?;
	}
	Ok(dict)
}

/// Renders a dictionary as a JSON object, naming known keys and kinds.
#[must_use]
pub fn to_json(dict: &Dictionary) -> Value {
	let mut map = Map::new();
	for (raw, value) in dict.iter() {
		let key = MessageKey::from_raw(raw);
		let name = key.map_or_else(|| raw.to_string(), |key| key.name().to_owned());
		let kind = (key == Some(MessageKey::Kind))
			.then(|| value.as_integer())
			.flatten()
			.and_then(|raw| u32::try_from(raw).ok())
			.and_then(MessageKind::from_raw);
		let value = match (kind, value) {
			(Some(kind), _) => Value::from(kind.name()),
			(None, TupleValue::CString(text)) => Value::from(text.as_str()),
			(None, TupleValue::UInt(v)) => Value::from(*v),
			(None, TupleValue::Int(v)) => Value::from(*v),
			(None, TupleValue::Bytes(bytes)) => Value::from(bytes.clone()),
		};
		map.insert(name, value);
	}
	Value::Object(map)
}

fn tuple_from_json(name: &str, value: &Value) -> Result<TupleValue> {
	match value {
		Value::String(text) => Ok(TupleValue::CString(text.clone())),
		Value::Number(number) => {
			if let Some(v) = number.as_u64() {
				u32::try_from(v)
					.map(TupleValue::UInt)
					.map_err(|_| CodecError::Json(format!("{name}: {v} exceeds 32 bits")))
			} else if let Some(v) = number.as_i64() {
				i32::try_from(v)
					.map(TupleValue::Int)
					.map_err(|_| CodecError::Json(format!("{name}: {v} exceeds 32 bits")))
			} else {
				Err(CodecError::Json(format!("{name}: fractional numbers are not supported")))
			}
		}
		Value::Array(items) => items
			.iter()
			.map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
			.collect::<Option<Vec<u8>>>()
			.map(TupleValue::Bytes)
			.ok_or_else(|| CodecError::Json(format!("{name}: byte arrays must hold values 0..=255"))),
		_ => Err(CodecError::Json(format!("{name}: unsupported value {value}"))),
	}
}
