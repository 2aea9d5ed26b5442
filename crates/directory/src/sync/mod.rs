//! Directory synchronization state machine.
//!
//! ```text
//! Unsized --Allocate(n)--> Sized
//!
//! per lot, once Sized:
//!   Absent --Status--> FetchRequested   (one RequestInit emitted)
//!   Absent --Init----> Populated
//!   FetchRequested --Init--> Populated
//!   FetchRequested --Status--> FetchRequested  (pending-status and refetch policy)
//!   Populated --Status--> Populated     (free updated, view invalidated)
//!   Populated --Init----> Populated     (ignored, metadata is immutable)
//! ```
//!
//! Messages are applied one at a time to completion. Errors leave the state
//! untouched.

use std::collections::HashMap;

use parkwatch_proto::{Count, LotId, LotMessage, LotName};

use crate::config::{PendingStatusPolicy, SyncConfig};
use crate::error::SyncError;
use crate::projection::{Dirty, Projection, ViewState};
use crate::registry::Registry;

/// Per-lot protocol phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LotPhase {
	/// Nothing known and nothing requested.
	Absent,
	/// Metadata requested, not yet received.
	FetchRequested,
	/// Record exists.
	Populated,
}

/// What applying a message did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
	/// The directory was sized.
	Sized {
		/// Number of slots.
		len: usize,
	},
	/// A record was created.
	Populated {
		/// Lot id.
		id: LotId,
		/// Whether a buffered update was applied along with the metadata.
		with_buffered_status: bool,
	},
	/// A record's free count was replaced.
	Updated {
		/// Lot id.
		id: LotId,
	},
	/// First sighting of an unknown lot; metadata requested.
	FetchRequested {
		/// Lot id.
		id: LotId,
	},
	/// Metadata requested again under the refetch policy.
	Refetched {
		/// Lot id.
		id: LotId,
		/// Requests sent for this lot so far.
		attempt: u32,
	},
	/// Update for a lot still awaiting metadata; no request sent.
	AwaitingInit {
		/// Lot id.
		id: LotId,
	},
	/// Redelivered metadata for a populated lot; nothing changed.
	Duplicate {
		/// Lot id.
		id: LotId,
	},
}

#[derive(Debug, Default)]
struct PendingFetch {
	requests: u32,
	stale: u32,
	buffered: Option<Count>,
}

/// The whole client-side protocol state: registry, outstanding fetches, and
/// view invalidation.
#[derive(Debug)]
pub struct SyncState {
	config: SyncConfig,
	registry: Registry,
	pending: HashMap<LotId, PendingFetch>,
	view: ViewState,
	outgoing: Vec<LotMessage>,
}

impl Default for SyncState {
	fn default() -> Self {
		Self::new(SyncConfig::default())
	}
}

impl SyncState {
	/// Creates unsized state with the given policies.
	#[must_use]
	pub fn new(config: SyncConfig) -> Self {
		Self {
			config,
			registry: Registry::new(),
			pending: HashMap::new(),
			view: ViewState::default(),
			outgoing: Vec::new(),
		}
	}

	/// Active configuration.
	#[must_use]
	pub fn config(&self) -> &SyncConfig {
		&self.config
	}

	/// The record store.
	#[must_use]
	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	/// Read access for a rendering surface.
	#[must_use]
	pub fn projection(&self) -> Projection<'_> {
		Projection::new(&self.registry, &self.view)
	}

	/// Chooses the lot shown in the detail card.
	pub fn select(&mut self, id: Option<LotId>) {
		self.view.select(id);
	}

	/// Returns and resets pending invalidation.
	pub fn clear_dirty(&mut self) -> Dirty {
		self.view.take()
	}

	/// Removes queued outgoing requests.
	pub fn take_outgoing(&mut self) -> Vec<LotMessage> {
		std::mem::take(&mut self.outgoing)
	}

	/// Takes back a request the transport never accepted.
	///
	/// A first request returns the lot to Absent so the next `Status` asks
	/// again; a refetch only gives back its attempt. Populated lots are left
	/// alone.
	pub fn request_failed(&mut self, id: LotId) {
		let Some(fetch) = self.pending.get_mut(&id) else {
			return;
		};
		if fetch.requests <= 1 {
			self.pending.remove(&id);
			tracing::debug!(id, "metadata request returned");
		} else {
			fetch.requests -= 1;
			tracing::debug!(id, requests = fetch.requests, "metadata refetch returned");
		}
	}

	/// Phase of one lot, or `None` if the id has no slot.
	#[must_use]
	pub fn phase(&self, id: LotId) -> Option<LotPhase> {
		self.registry.check(id).ok()?;
		Some(if self.registry.get(id).is_some() {
			LotPhase::Populated
		} else if self.pending.contains_key(&id) {
			LotPhase::FetchRequested
		} else {
			LotPhase::Absent
		})
	}

	/// Lots awaiting metadata, ascending.
	#[must_use]
	pub fn pending_ids(&self) -> Vec<LotId> {
		let mut ids: Vec<_> = self.pending.keys().copied().collect();
		ids.sort_unstable();
		ids
	}

	/// Decodes one envelope and applies it.
	pub fn apply_frame(&mut self, bytes: &[u8]) -> Result<Applied, SyncError> {
		let msg = LotMessage::decode_frame(bytes, self.config.envelope.inbound_limit)?;
		self.apply(msg)
	}

	/// Applies one decoded message.
	pub fn apply(&mut self, msg: LotMessage) -> Result<Applied, SyncError> {
		match msg {
			LotMessage::Allocate { total_count } => self.on_allocate(total_count),
			LotMessage::Init { id, name, capacity } => self.on_init(id, name, capacity),
			LotMessage::Status { id, free } => self.on_status(id, free),
			LotMessage::RequestInit { id } => Err(SyncError::UnexpectedRequest { id }),
		}
	}

	fn on_allocate(&mut self, total_count: u8) -> Result<Applied, SyncError> {
		self.registry.allocate(total_count)?;
		self.view.mark_resized();
		tracing::debug!(len = total_count, "directory sized");
		Ok(Applied::Sized {
			len: usize::from(total_count),
		})
	}

	fn on_init(&mut self, id: LotId, name: LotName, capacity: Count) -> Result<Applied, SyncError> {
		match self.registry.insert(id, name, capacity) {
			Ok(record) => tracing::debug!(id, name = %record.name(), "lot populated"),
			Err(SyncError::AlreadyPopulated { id }) => {
				tracing::trace!(id, "duplicate init ignored");
				return Ok(Applied::Duplicate { id });
			}
			Err(err) => return Err(err),
		}

		let buffered = self
			.pending
			.remove(&id)
			.and_then(|fetch| fetch.buffered)
			.filter(|_| self.config.pending_status == PendingStatusPolicy::BufferLatest);
		let with_buffered_status = buffered.is_some();
		if let Some(free) = buffered {
			self.registry.update_free(id, free)?;
		}

		self.view.mark_row(id);
		Ok(Applied::Populated {
			id,
			with_buffered_status,
		})
	}

	fn on_status(&mut self, id: LotId, free: Count) -> Result<Applied, SyncError> {
		self.registry.check(id)?;

		if self.registry.get(id).is_some() {
			let record = self.registry.update_free(id, free)?;
			if record.is_suspect() {
				tracing::debug!(id, free = %record.free(), capacity = %record.capacity(), "free count outside capacity");
			}
			self.view.mark_row(id);
			return Ok(Applied::Updated { id });
		}

		let buffer = self.config.pending_status == PendingStatusPolicy::BufferLatest;
		let max_requests = self.config.max_requests();
		let after_stale = self.config.refetch.after_stale_status;

		let Some(fetch) = self.pending.get_mut(&id) else {
			let fetch = PendingFetch {
				requests: 1,
				stale: 0,
				buffered: buffer.then_some(free),
			};
			self.pending.insert(id, fetch);
			self.outgoing.push(LotMessage::RequestInit { id });
			tracing::debug!(id, "requesting lot metadata");
			return Ok(Applied::FetchRequested { id });
		};

		if buffer {
			fetch.buffered = Some(free);
		}
		fetch.stale += 1;

		if after_stale > 0 && fetch.stale >= after_stale && fetch.requests < max_requests {
			fetch.stale = 0;
			fetch.requests += 1;
			let attempt = fetch.requests;
			self.outgoing.push(LotMessage::RequestInit { id });
			tracing::debug!(id, attempt, "re-requesting lot metadata");
			return Ok(Applied::Refetched { id, attempt });
		}

		tracing::trace!(id, stale = fetch.stale, "status for lot awaiting metadata");
		Ok(Applied::AwaitingInit { id })
	}
}

#[cfg(test)]
mod tests;
