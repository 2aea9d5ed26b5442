//! Error types for the directory.

use std::path::PathBuf;

use parkwatch_proto::{CodecError, LotId};
use thiserror::Error;

/// Reasons a message could not be applied.
///
/// Every variant is local to one message: the message is dropped and the
/// directory is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
	/// The message failed envelope or field validation.
	#[error("malformed message: {0}")]
	MalformedMessage(#[from] CodecError),

	/// A lot was referenced before the directory was sized.
	#[error("lot {id} referenced before the directory was sized")]
	NotReady {
		/// Referenced lot.
		id: LotId,
	},

	/// A lot id at or beyond the directory size.
	#[error("lot {id} out of range for directory of {len}")]
	OutOfRange {
		/// Referenced lot.
		id: LotId,
		/// Directory size.
		len: usize,
	},

	/// A second allocation arrived.
	#[error("directory already sized to {len}, ignoring allocation of {requested}")]
	AlreadyAllocated {
		/// Size fixed by the first allocation.
		len: usize,
		/// Size the rejected allocation asked for.
		requested: u8,
	},

	/// Metadata for a lot that already has it.
	#[error("lot {id} already populated")]
	AlreadyPopulated {
		/// Referenced lot.
		id: LotId,
	},

	/// An occupancy update reached the registry for an empty slot.
	#[error("lot {id} is not populated")]
	NotPopulated {
		/// Referenced lot.
		id: LotId,
	},

	/// The peer sent the client's own request kind.
	#[error("peer sent an init request for lot {id}")]
	UnexpectedRequest {
		/// Referenced lot.
		id: LotId,
	},
}

impl SyncError {
	/// Ordering or redelivery noise that should not be reported as a fault.
	///
	/// Updates that arrive before the directory is sized are expected while
	/// the companion starts up.
	#[must_use]
	pub fn is_benign(&self) -> bool {
		matches!(self, Self::NotReady { .. } | Self::AlreadyPopulated { .. })
	}
}

/// Errors loading a [`SyncConfig`](crate::SyncConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or schema.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// A value parsed but is unusable.
	#[error("invalid {field}: {reason}")]
	Invalid {
		/// Offending field.
		field: &'static str,
		/// What is wrong with it.
		reason: String,
	},
}

/// Errors talking to a [`DirectoryService`](crate::DirectoryService).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ServiceError {
	/// The service task has stopped.
	#[error("directory service is closed")]
	Closed,
}
