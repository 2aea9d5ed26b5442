//! Sized collection of lots.

use parkwatch_proto::{Count, LotId, LotName};

use crate::error::SyncError;
use crate::record::Record;

/// Owns every [`Record`], indexed by lot id.
///
/// The size is fixed by the first [`allocate`](Self::allocate) call and never
/// changes afterwards. Each slot is either empty or holds a complete record.
#[derive(Debug, Default)]
pub struct Registry {
	slots: Option<Vec<Option<Record>>>,
}

impl Registry {
	/// Creates an unsized registry.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Sizes the registry to `len` empty slots.
	pub fn allocate(&mut self, len: u8) -> Result<(), SyncError> {
		if let Some(slots) = &self.slots {
			return Err(SyncError::AlreadyAllocated {
				len: slots.len(),
				requested: len,
			});
		}
		self.slots = Some(vec![None; usize::from(len)]);
		Ok(())
	}

	/// Whether an allocation has happened.
	#[must_use]
	pub fn is_allocated(&self) -> bool {
		self.slots.is_some()
	}

	/// Logical size; zero before allocation.
	#[must_use]
	pub fn len(&self) -> usize {
		self.slots.as_ref().map_or(0, Vec::len)
	}

	/// Whether the registry has no slots.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Number of populated slots.
	#[must_use]
	pub fn populated(&self) -> usize {
		self.iter().flatten().count()
	}

	/// Looks up a populated record.
	#[must_use]
	pub fn get(&self, id: LotId) -> Option<&Record> {
		self.slots.as_ref()?.get(usize::from(id))?.as_ref()
	}

	/// Iterates over all slots in id order.
	pub fn iter(&self) -> impl Iterator<Item = Option<&Record>> {
		self.slots.iter().flatten().map(Option::as_ref)
	}

	/// Checks that `id` addresses a slot.
	pub fn check(&self, id: LotId) -> Result<(), SyncError> {
		let Some(slots) = &self.slots else {
			return Err(SyncError::NotReady { id });
		};
		if usize::from(id) >= slots.len() {
			return Err(SyncError::OutOfRange { id, len: slots.len() });
		}
		Ok(())
	}

	/// Populates an empty slot.
	pub fn insert(&mut self, id: LotId, name: LotName, capacity: Count) -> Result<&Record, SyncError> {
		let slot = self.slot_mut(id)?;
		if slot.is_some() {
			return Err(SyncError::AlreadyPopulated { id });
		}
		Ok(slot.insert(Record::new(id, name, capacity)))
	}

	/// Replaces the free count of a populated slot.
	pub fn update_free(&mut self, id: LotId, free: Count) -> Result<&Record, SyncError> {
		let Some(record) = self.slot_mut(id)?.as_mut() else {
			return Err(SyncError::NotPopulated { id });
		};
		record.set_free(free);
		Ok(record)
	}

	fn slot_mut(&mut self, id: LotId) -> Result<&mut Option<Record>, SyncError> {
		self.check(id)?;
		let slots = self.slots.as_mut().ok_or(SyncError::NotReady { id })?;
		Ok(&mut slots[usize::from(id)])
	}
}
