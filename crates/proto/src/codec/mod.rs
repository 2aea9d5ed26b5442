//! Typed messages on top of the key/value envelope.
//!
//! Decoding validates everything up front: the kind tag, presence of every key
//! the kind requires, value types, and that identifiers fit the registry index.
//! A message that fails any check is rejected whole.

use crate::dict::{Dictionary, TupleValue};
use crate::error::{CodecError, Result};
use crate::keys::{MessageKey, MessageKind};
use crate::text::{COUNT_CAPACITY, Count, LotName};
use crate::LotId;

/// A decoded directory message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LotMessage {
	/// Establishes how many lots exist.
	Allocate {
		/// Number of lots in the directory.
		total_count: u8,
	},
	/// Static metadata for a lot.
	Init {
		/// Lot identifier.
		id: LotId,
		/// Display name.
		name: LotName,
		/// Total spaces.
		capacity: Count,
	},
	/// Occupancy update for a lot.
	Status {
		/// Lot identifier.
		id: LotId,
		/// Free spaces.
		free: Count,
	},
	/// Client request for a lot's metadata.
	RequestInit {
		/// Lot identifier.
		id: LotId,
	},
}

impl LotMessage {
	/// The kind tag this message travels under.
	#[must_use]
	pub const fn kind(&self) -> MessageKind {
		match self {
			Self::Allocate { .. } => MessageKind::Allocate,
			Self::Init { .. } => MessageKind::Init,
			Self::Status { .. } => MessageKind::Status,
			Self::RequestInit { .. } => MessageKind::InitRequest,
		}
	}

	/// The lot this message addresses, if any.
	#[must_use]
	pub const fn id(&self) -> Option<LotId> {
		match self {
			Self::Allocate { .. } => None,
			Self::Init { id, .. } | Self::Status { id, .. } | Self::RequestInit { id } => Some(*id),
		}
	}

	/// Validates and converts a dictionary.
	pub fn decode(dict: &Dictionary) -> Result<Self> {
		let kind = match dict.get(MessageKey::Kind) {
			None => return Err(CodecError::MissingKind),
			Some(TupleValue::UInt(raw)) => {
				MessageKind::from_raw(*raw).ok_or(CodecError::UnknownKind(i64::from(*raw)))?
			}
			Some(TupleValue::Int(raw)) => u32::try_from(*raw)
				.ok()
				.and_then(MessageKind::from_raw)
				.ok_or(CodecError::UnknownKind(i64::from(*raw)))?,
			Some(other) => {
				return Err(CodecError::WrongType {
					key: MessageKey::Kind,
					expected: "uint",
					found: other.type_name(),
				});
			}
		};

		let fields = Fields { dict, kind };
		Ok(match kind {
			MessageKind::Allocate => Self::Allocate {
				total_count: fields.small_uint(MessageKey::Count)?,
			},
			MessageKind::Init => Self::Init {
				id: fields.small_uint(MessageKey::Id)?,
				name: LotName::truncating(fields.text(MessageKey::Name)?),
				capacity: fields.count(MessageKey::Total)?,
			},
			MessageKind::Status => Self::Status {
				id: fields.small_uint(MessageKey::Id)?,
				free: fields.count(MessageKey::Free)?,
			},
			MessageKind::InitRequest => Self::RequestInit {
				id: fields.small_uint(MessageKey::Id)?,
			},
		})
	}

	/// Builds the dictionary form of this message.
	#[must_use]
	pub fn encode(&self) -> Dictionary {
		let dict = Dictionary::new().with(MessageKey::Kind, self.kind().raw());
		match self {
			Self::Allocate { total_count } => dict.with(MessageKey::Count, *total_count),
			Self::Init { id, name, capacity } => dict
				.with(MessageKey::Id, *id)
				.with(MessageKey::Name, name.as_str())
				.with(MessageKey::Total, capacity.as_str()),
			Self::Status { id, free } => dict.with(MessageKey::Id, *id).with(MessageKey::Free, free.as_str()),
			Self::RequestInit { id } => dict.with(MessageKey::Id, *id),
		}
	}

	/// Parses an envelope and decodes the message inside it.
	pub fn decode_frame(bytes: &[u8], limit: usize) -> Result<Self> {
		let dict = Dictionary::from_bytes(bytes, limit)?;
		Self::decode(&dict)
	}

	/// Encodes the message into an envelope no larger than `limit`.
	pub fn encode_frame(&self, limit: usize) -> Result<Vec<u8>> {
		Ok(self.encode().to_bytes(limit)?)
	}
}

struct Fields<'a> {
	dict: &'a Dictionary,
	kind: MessageKind,
}

impl<'a> Fields<'a> {
	fn require(&self, key: MessageKey) -> Result<&'a TupleValue> {
		self.dict.get(key).ok_or(CodecError::MissingKey { kind: self.kind, key })
	}

	fn small_uint(&self, key: MessageKey) -> Result<u8> {
		let value = self.require(key)?;
		let Some(raw) = value.as_integer() else {
			return Err(CodecError::WrongType {
				key,
				expected: "integer",
				found: value.type_name(),
			});
		};
		u8::try_from(raw).map_err(|_| CodecError::NotRepresentable { key, value: raw })
	}

	fn text(&self, key: MessageKey) -> Result<&'a str> {
		match self.require(key)? {
			TupleValue::CString(text) => Ok(text),
			other => Err(CodecError::WrongType {
				key,
				expected: "cstring",
				found: other.type_name(),
			}),
		}
	}

	fn count(&self, key: MessageKey) -> Result<Count> {
		match self.require(key)? {
			TupleValue::CString(text) => Count::exact(text).ok_or(CodecError::CountTooLong {
				key,
				len: text.len(),
				capacity: COUNT_CAPACITY,
			}),
			TupleValue::UInt(v) => Ok(Count::from_integer(i64::from(*v))),
			TupleValue::Int(v) => Ok(Count::from_integer(i64::from(*v))),
			other @ TupleValue::Bytes(_) => Err(CodecError::WrongType {
				key,
				expected: "cstring or integer",
				found: other.type_name(),
			}),
		}
	}
}

#[cfg(test)]
mod tests;
