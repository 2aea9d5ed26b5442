//! One parking lot.

use parkwatch_proto::{Count, LotId, LotName};

/// A populated lot.
///
/// Name and capacity are fixed at construction. Only the free count moves,
/// and only through the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
	id: LotId,
	name: LotName,
	capacity: Count,
	free: Count,
}

impl Record {
	/// Creates a record with zero free spaces.
	#[must_use]
	pub fn new(id: LotId, name: LotName, capacity: Count) -> Self {
		Self {
			id,
			name,
			capacity,
			free: Count::zero(),
		}
	}

	/// Lot identifier.
	#[must_use]
	pub fn id(&self) -> LotId {
		self.id
	}

	/// Display name.
	#[must_use]
	pub fn name(&self) -> &LotName {
		&self.name
	}

	/// Total spaces, verbatim.
	#[must_use]
	pub fn capacity(&self) -> &Count {
		&self.capacity
	}

	/// Free spaces, verbatim.
	#[must_use]
	pub fn free(&self) -> &Count {
		&self.free
	}

	/// Whether the free count parses outside `0..=capacity`.
	///
	/// Such values are still stored and shown; this is only for diagnostics.
	#[must_use]
	pub fn is_suspect(&self) -> bool {
		match (self.free.value(), self.capacity.value()) {
			(Some(free), Some(capacity)) => free < 0 || free > capacity,
			(Some(free), None) => free < 0,
			(None, _) => true,
		}
	}

	pub(crate) fn set_free(&mut self, free: Count) {
		self.free = free;
	}
}
