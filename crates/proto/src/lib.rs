//! Wire types for the parking directory channel.
//!
//! The companion process talks to the client over a narrow key/value channel.
//! Every message is a small [`Dictionary`] of numbered tuples, serialized into a
//! fixed-size envelope. This crate owns three layers:
//!
//! * [`dict`]: the binary envelope (tuple count, key, type, length, value).
//! * [`codec`]: typed [`LotMessage`] decoding and encoding on top of a dictionary.
//! * [`json`]: the companion's JSON object form, used by drivers and tests.

#![warn(missing_docs)]

pub mod codec;
pub mod dict;
pub mod error;
pub mod json;
pub mod keys;
pub mod text;

pub use codec::LotMessage;
pub use dict::{Dictionary, TupleValue};
pub use error::{CodecError, EnvelopeError, Result};
pub use keys::{MessageKey, MessageKind};
pub use text::{BoundedStr, Count, LotName};

/// Default maximum size of an inbound envelope in bytes.
pub const DEFAULT_INBOUND_LIMIT: usize = 80;

/// Default maximum size of an outbound envelope in bytes.
pub const DEFAULT_OUTBOUND_LIMIT: usize = 64;

/// Identifier of a lot; doubles as the registry slot index.
pub type LotId = u8;
