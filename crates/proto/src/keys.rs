//! Tuple keys and message kind tags.

use std::fmt;

/// Numbered tuple keys understood by both ends of the channel.
///
/// The first four keep the numbering used by the original watch application so
/// that an older companion keeps addressing the same fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum MessageKey {
	/// Lot identifier.
	Id = 0,
	/// Currently free spaces.
	Free = 1,
	/// Total capacity of the lot.
	Total = 2,
	/// Human readable lot name.
	Name = 3,
	/// Message kind tag, see [`MessageKind`].
	Kind = 4,
	/// Number of lots announced by an allocation.
	Count = 5,
}

impl MessageKey {
	/// All keys, in wire order.
	pub const ALL: [Self; 6] = [
		Self::Id,
		Self::Free,
		Self::Total,
		Self::Name,
		Self::Kind,
		Self::Count,
	];

	/// Returns the numeric key used on the wire.
	#[must_use]
	pub const fn raw(self) -> u32 {
		self as u32
	}

	/// Looks up a key by its wire number.
	#[must_use]
	pub fn from_raw(raw: u32) -> Option<Self> {
		Self::ALL.into_iter().find(|key| key.raw() == raw)
	}

	/// Name used by the companion's JSON form.
	#[must_use]
	pub const fn name(self) -> &'static str {
		match self {
			Self::Id => "id",
			Self::Free => "free",
			Self::Total => "total",
			Self::Name => "name",
			Self::Kind => "kind",
			Self::Count => "count",
		}
	}

	/// Looks up a key by its JSON name.
	#[must_use]
	pub fn from_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|key| key.name() == name)
	}
}

impl fmt::Display for MessageKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Value carried under [`MessageKey::Kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
	/// One-time announcement of the directory size.
	Allocate = 0,
	/// Static metadata for one lot.
	Init = 1,
	/// Occupancy update for one lot.
	Status = 2,
	/// Client asking the companion for a lot's metadata.
	///
	/// Deliberately distinct from [`MessageKind::Init`] so that an echoed
	/// request can never be mistaken for a metadata response.
	InitRequest = 3,
}

impl MessageKind {
	/// All kinds, in tag order.
	pub const ALL: [Self; 4] = [Self::Allocate, Self::Init, Self::Status, Self::InitRequest];

	/// Returns the numeric tag used on the wire.
	#[must_use]
	pub const fn raw(self) -> u8 {
		self as u8
	}

	/// Looks up a kind by its wire tag.
	#[must_use]
	pub fn from_raw(raw: u32) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| u32::from(kind.raw()) == raw)
	}

	/// Name used by the companion's JSON form.
	#[must_use]
	pub const fn name(self) -> &'static str {
		match self {
			Self::Allocate => "allocate",
			Self::Init => "init",
			Self::Status => "status",
			Self::InitRequest => "init_request",
		}
	}

	/// Looks up a kind by its JSON name.
	#[must_use]
	pub fn from_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.name() == name)
	}
}

impl fmt::Display for MessageKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}
