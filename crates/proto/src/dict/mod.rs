//! Binary key/value envelope.
//!
//! Layout (little-endian):
//!
//! ```text
//! u8 tuple_count
//! repeat tuple_count:
//!   u32 key
//!   u8  type      0 = bytes, 1 = cstring, 2 = uint, 3 = int
//!   u16 length
//!   [length] value
//! ```
//!
//! Every declared length is checked against the bytes actually present before
//! anything is copied out of the frame.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::error::EnvelopeError;
use crate::keys::MessageKey;

const HEADER_LEN: usize = 1;
const TUPLE_HEADER_LEN: usize = 4 + 1 + 2;

const TYPE_BYTES: u8 = 0;
const TYPE_CSTRING: u8 = 1;
const TYPE_UINT: u8 = 2;
const TYPE_INT: u8 = 3;

/// A single typed value inside a [`Dictionary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TupleValue {
	/// Opaque bytes.
	Bytes(Vec<u8>),
	/// UTF-8 text, NUL terminated on the wire.
	CString(String),
	/// Unsigned integer, sent in the narrowest of 1, 2, or 4 bytes.
	UInt(u32),
	/// Signed integer, sent in the narrowest of 1, 2, or 4 bytes.
	Int(i32),
}

impl TupleValue {
	/// Short description used in error messages.
	#[must_use]
	pub const fn type_name(&self) -> &'static str {
		match self {
			Self::Bytes(_) => "bytes",
			Self::CString(_) => "cstring",
			Self::UInt(_) => "uint",
			Self::Int(_) => "int",
		}
	}

	/// Returns the value as a signed integer if it is numeric.
	#[must_use]
	pub fn as_integer(&self) -> Option<i64> {
		match *self {
			Self::UInt(v) => Some(i64::from(v)),
			Self::Int(v) => Some(i64::from(v)),
			_ => None,
		}
	}

	fn type_tag(&self) -> u8 {
		match self {
			Self::Bytes(_) => TYPE_BYTES,
			Self::CString(_) => TYPE_CSTRING,
			Self::UInt(_) => TYPE_UINT,
			Self::Int(_) => TYPE_INT,
		}
	}

	fn payload(&self) -> Vec<u8> {
		match self {
			Self::Bytes(bytes) => bytes.clone(),
			Self::CString(text) => {
				let mut out = Vec::with_capacity(text.len() + 1);
				out.extend_from_slice(text.as_bytes());
				out.push(0);
				out
			}
			Self::UInt(v) => match *v {
				v if v <= u32::from(u8::MAX) => vec![v as u8],
				v if v <= u32::from(u16::MAX) => (v as u16).to_le_bytes().to_vec(),
				v => v.to_le_bytes().to_vec(),
			},
			Self::Int(v) => match *v {
				v if i8::try_from(v).is_ok() => (v as i8).to_le_bytes().to_vec(),
				v if i16::try_from(v).is_ok() => (v as i16).to_le_bytes().to_vec(),
				v => v.to_le_bytes().to_vec(),
			},
		}
	}
}

impl From<&str> for TupleValue {
	fn from(value: &str) -> Self {
		Self::CString(value.to_owned())
	}
}

impl From<String> for TupleValue {
	fn from(value: String) -> Self {
		Self::CString(value)
	}
}

impl From<u8> for TupleValue {
	fn from(value: u8) -> Self {
		Self::UInt(u32::from(value))
	}
}

impl From<u32> for TupleValue {
	fn from(value: u32) -> Self {
		Self::UInt(value)
	}
}

impl From<i32> for TupleValue {
	fn from(value: i32) -> Self {
		Self::Int(value)
	}
}

/// One message worth of keyed tuples.
///
/// Keys are unique; unknown keys are carried through untouched so a newer
/// companion can add fields without breaking older clients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
	tuples: BTreeMap<u32, TupleValue>,
}

impl Dictionary {
	/// Creates an empty dictionary.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style insert of a well-known key.
	#[must_use]
	pub fn with(mut self, key: MessageKey, value: impl Into<TupleValue>) -> Self {
		self.insert(key, value);
		self
	}

	/// Inserts or replaces the value under a well-known key.
	pub fn insert(&mut self, key: MessageKey, value: impl Into<TupleValue>) {
		self.tuples.insert(key.raw(), value.into());
	}

	/// Inserts under a raw key, rejecting duplicates.
	pub fn insert_raw(&mut self, key: u32, value: TupleValue) -> Result<(), EnvelopeError> {
		match self.tuples.entry(key) {
			Entry::Occupied(_) => Err(EnvelopeError::DuplicateKey(key)),
			Entry::Vacant(slot) => {
				slot.insert(value);
				Ok(())
			}
		}
	}

	/// Returns the value under a well-known key.
	#[must_use]
	pub fn get(&self, key: MessageKey) -> Option<&TupleValue> {
		self.tuples.get(&key.raw())
	}

	/// Returns the value under a raw key.
	#[must_use]
	pub fn get_raw(&self, key: u32) -> Option<&TupleValue> {
		self.tuples.get(&key)
	}

	/// Number of tuples.
	#[must_use]
	pub fn len(&self) -> usize {
		self.tuples.len()
	}

	/// Whether the dictionary carries no tuples.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.tuples.is_empty()
	}

	/// Iterates over `(raw key, value)` pairs in key order.
	pub fn iter(&self) -> impl Iterator<Item = (u32, &TupleValue)> {
		self.tuples.iter().map(|(k, v)| (*k, v))
	}

	/// Size of the encoded frame in bytes.
	#[must_use]
	pub fn encoded_len(&self) -> usize {
		HEADER_LEN
			+ self
				.tuples
				.values()
				.map(|v| TUPLE_HEADER_LEN + v.payload().len())
				.sum::<usize>()
	}

	/// Serializes the dictionary, failing if the frame would exceed `limit`.
	pub fn to_bytes(&self, limit: usize) -> Result<Vec<u8>, EnvelopeError> {
		let count = u8::try_from(self.tuples.len()).map_err(|_| EnvelopeError::TooManyTuples(self.tuples.len()))?;
		let mut out = Vec::with_capacity(self.encoded_len());
		out.push(count);
		for (key, value) in &self.tuples {
			let payload = value.payload();
			let len = u16::try_from(payload.len()).map_err(|_| EnvelopeError::ValueTooLong(payload.len()))?;
			out.extend_from_slice(&key.to_le_bytes());
			out.push(value.type_tag());
			out.extend_from_slice(&len.to_le_bytes());
			out.extend_from_slice(&payload);
		}
		if out.len() > limit {
			return Err(EnvelopeError::TooLarge { len: out.len(), limit });
		}
		Ok(out)
	}

	/// Parses a frame, rejecting anything larger than `limit`.
	pub fn from_bytes(bytes: &[u8], limit: usize) -> Result<Self, EnvelopeError> {
		if bytes.len() > limit {
			return Err(EnvelopeError::TooLarge {
				len: bytes.len(),
				limit,
			});
		}

		let mut reader = Reader { bytes, offset: 0 };
		let count = reader.u8()?;
		let mut dict = Self::new();
		for _ in 0..count {
			let key = u32::from_le_bytes(reader.array()?);
			let tag = reader.u8()?;
			let len = u16::from_le_bytes(reader.array()?);
			let raw = reader.take(usize::from(len))?;
			let value = decode_value(key, tag, raw)?;
			dict.insert_raw(key, value)?;
		}

		let remaining = bytes.len() - reader.offset;
		if remaining != 0 {
			return Err(EnvelopeError::TrailingBytes { remaining });
		}
		Ok(dict)
	}
}

fn decode_value(key: u32, tag: u8, raw: &[u8]) -> Result<TupleValue, EnvelopeError> {
	match tag {
		TYPE_BYTES => Ok(TupleValue::Bytes(raw.to_vec())),
		TYPE_CSTRING => {
			let Some((&0, text)) = raw.split_last() else {
				return Err(EnvelopeError::BadCString { key });
			};
			if text.contains(&0) {
				return Err(EnvelopeError::BadCString { key });
			}
			let text = std::str::from_utf8(text).map_err(|_| EnvelopeError::BadCString { key })?;
			Ok(TupleValue::CString(text.to_owned()))
		}
		TYPE_UINT => match *raw {
			[a] => Ok(TupleValue::UInt(u32::from(a))),
			[a, b] => Ok(TupleValue::UInt(u32::from(u16::from_le_bytes([a, b])))),
			[a, b, c, d] => Ok(TupleValue::UInt(u32::from_le_bytes([a, b, c, d]))),
			_ => Err(EnvelopeError::IntegerWidth(raw.len() as u16)),
		},
		TYPE_INT => match *raw {
			[a] => Ok(TupleValue::Int(i32::from(a as i8))),
			[a, b] => Ok(TupleValue::Int(i32::from(i16::from_le_bytes([a, b])))),
			[a, b, c, d] => Ok(TupleValue::Int(i32::from_le_bytes([a, b, c, d]))),
			_ => Err(EnvelopeError::IntegerWidth(raw.len() as u16)),
		},
		other => Err(EnvelopeError::UnknownType(other)),
	}
}

struct Reader<'a> {
	bytes: &'a [u8],
	offset: usize,
}

impl<'a> Reader<'a> {
	fn take(&mut self, len: usize) -> Result<&'a [u8], EnvelopeError> {
		let end = self
			.offset
			.checked_add(len)
			.filter(|end| *end <= self.bytes.len())
			.ok_or(EnvelopeError::Truncated { offset: self.offset })?;
		let out = &self.bytes[self.offset..end];
		self.offset = end;
		Ok(out)
	}

	fn u8(&mut self) -> Result<u8, EnvelopeError> {
		Ok(self.take(1)?[0])
	}

	fn array<const N: usize>(&mut self) -> Result<[u8; N], EnvelopeError> {
		let slice = self.take(N)?;
		let mut out = [0u8; N];
		out.copy_from_slice(slice);
		Ok(out)
	}
}
