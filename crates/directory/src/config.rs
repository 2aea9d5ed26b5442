//! Sync policy configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty file is valid:
//!
//! ```toml
//! pending-status = "buffer-latest"
//!
//! [refetch]
//! after-stale-status = 4
//! max-requests = 3
//!
//! [envelope]
//! inbound-limit = 80
//! outbound-limit = 64
//! ```

use std::path::Path;

use parkwatch_proto::{DEFAULT_INBOUND_LIMIT, DEFAULT_OUTBOUND_LIMIT};
use serde::Deserialize;

use crate::error::ConfigError;

/// Smallest envelope that can carry a metadata request (kind and id tuples).
const MIN_ENVELOPE: usize = 17;

/// What to do with an occupancy update for a lot whose metadata is still
/// being fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PendingStatusPolicy {
	/// Discard the value. The lot appears with zero free spaces until the
	/// next update.
	#[default]
	Drop,
	/// Keep the most recent value and apply it when metadata arrives.
	BufferLatest,
}

/// Bounds on repeated metadata requests for a single lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct RefetchPolicy {
	/// Stale updates tolerated before asking again; zero never asks again.
	pub after_stale_status: u32,
	/// Total requests per lot per run, the first one included.
	pub max_requests: u32,
}

impl Default for RefetchPolicy {
	fn default() -> Self {
		Self {
			after_stale_status: 0,
			max_requests: 3,
		}
	}
}

/// Envelope size limits in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct EnvelopeLimits {
	/// Largest frame accepted from the companion.
	pub inbound_limit: usize,
	/// Largest frame sent to the companion.
	pub outbound_limit: usize,
}

impl Default for EnvelopeLimits {
	fn default() -> Self {
		Self {
			inbound_limit: DEFAULT_INBOUND_LIMIT,
			outbound_limit: DEFAULT_OUTBOUND_LIMIT,
		}
	}
}

/// Configuration for [`SyncState`](crate::SyncState).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct SyncConfig {
	/// Handling of updates for lots awaiting metadata.
	pub pending_status: PendingStatusPolicy,
	/// Re-request bounds.
	pub refetch: RefetchPolicy,
	/// Envelope limits.
	pub envelope: EnvelopeLimits,
}

impl SyncConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads and parses a TOML file.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&text)
	}

	/// Rejects limits too small to carry any message.
	pub fn validate(&self) -> Result<(), ConfigError> {
		for (field, value) in [
			("envelope.inbound-limit", self.envelope.inbound_limit),
			("envelope.outbound-limit", self.envelope.outbound_limit),
		] {
			if value < MIN_ENVELOPE {
				return Err(ConfigError::Invalid {
					field,
					reason: format!("{value} bytes is below the minimum of {MIN_ENVELOPE}"),
				});
			}
		}
		Ok(())
	}

	/// Request cap with the first request always allowed.
	#[must_use]
	pub fn max_requests(&self) -> u32 {
		self.refetch.max_requests.max(1)
	}
}
