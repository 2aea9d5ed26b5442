//! Error types for envelope and message decoding.

use thiserror::Error;

use crate::keys::{MessageKey, MessageKind};

/// Failures while reading or writing the binary envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
	/// The frame ended before a complete header or value was read.
	#[error("envelope truncated at byte {offset}")]
	Truncated {
		/// Offset at which more bytes were expected.
		offset: usize,
	},

	/// Bytes remained after the declared number of tuples.
	#[error("{remaining} trailing bytes after last tuple")]
	TrailingBytes {
		/// Number of unread bytes.
		remaining: usize,
	},

	/// The frame is larger than the channel allows.
	#[error("envelope of {len} bytes exceeds limit of {limit}")]
	TooLarge {
		/// Actual or resulting frame size.
		len: usize,
		/// Configured limit.
		limit: usize,
	},

	/// A tuple declared a type byte this codec does not know.
	#[error("unknown tuple type {0}")]
	UnknownType(u8),

	/// An integer tuple with a width other than 1, 2, or 4 bytes.
	#[error("integer tuple with invalid width {0}")]
	IntegerWidth(u16),

	/// A string tuple that is not NUL terminated or not UTF-8.
	#[error("malformed cstring under key {key}")]
	BadCString {
		/// Raw key of the offending tuple.
		key: u32,
	},

	/// The same key appeared twice in one frame.
	#[error("duplicate key {0}")]
	DuplicateKey(u32),

	/// A value is too long to describe with a 16-bit length.
	#[error("value of {0} bytes does not fit a tuple")]
	ValueTooLong(usize),

	/// More tuples than the one-byte count allows.
	#[error("too many tuples: {0}")]
	TooManyTuples(usize),
}

/// Failures while turning a dictionary into a [`LotMessage`](crate::LotMessage).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
	/// The envelope itself could not be read or written.
	#[error(transparent)]
	Envelope(#[from] EnvelopeError),

	/// The dictionary carries no kind tag.
	#[error("message has no kind tag")]
	MissingKind,

	/// The kind tag is not one of the known kinds.
	#[error("unrecognized message kind {0}")]
	UnknownKind(i64),

	/// A key required by the declared kind is absent.
	#[error("{kind} message is missing key {key}")]
	MissingKey {
		/// Declared kind of the message.
		kind: MessageKind,
		/// The absent key.
		key: MessageKey,
	},

	/// A key is present but holds a value of an unusable type.
	#[error("key {key} holds {found}, expected {expected}")]
	WrongType {
		/// The offending key.
		key: MessageKey,
		/// Description of the expected value type.
		expected: &'static str,
		/// Description of the value found.
		found: &'static str,
	},

	/// An integer does not fit the field it addresses.
	#[error("key {key} value {value} does not fit in u8")]
	NotRepresentable {
		/// The offending key.
		key: MessageKey,
		/// Value as received.
		value: i64,
	},

	/// A count's text is longer than the field holds.
	#[error("key {key} count of {len} bytes exceeds {capacity}")]
	CountTooLong {
		/// The offending key.
		key: MessageKey,
		/// Length of the received text.
		len: usize,
		/// Field capacity.
		capacity: usize,
	},

	/// The companion's JSON form could not be interpreted.
	#[error("invalid companion json: {0}")]
	Json(String),
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
