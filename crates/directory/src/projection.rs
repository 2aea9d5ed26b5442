//! Read-only view model for a rendering surface.
//!
//! The surface pulls rows on demand and uses the invalidation flags to decide
//! when to redraw. Nothing here mutates the registry.

use std::collections::BTreeSet;

use bitflags::bitflags;
use parkwatch_proto::LotId;

use crate::record::Record;
use crate::registry::Registry;

/// Row text shown for a slot whose metadata has not arrived.
pub const PLACEHOLDER: &str = "…loading…";

/// Detail label shown instead of a zero free count.
pub const FULL_LABEL: &str = "Full";

bitflags! {
	/// What changed since the surface last cleared the dirty state.
	#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
	pub struct Invalidation: u8 {
		/// One or more rows changed content.
		const ROWS = 1 << 0;
		/// The row count changed.
		const ROW_COUNT = 1 << 1;
		/// The detail card needs a redraw.
		const DETAIL = 1 << 2;
	}
}

/// Pending invalidation handed to the surface by
/// [`SyncState::clear_dirty`](crate::SyncState::clear_dirty).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dirty {
	/// Kinds of change.
	pub flags: Invalidation,
	/// Rows whose content changed, ascending.
	pub rows: Vec<LotId>,
}

impl Dirty {
	/// Whether anything changed.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.flags.is_empty()
	}
}

/// Title and subtitle of one list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSummary {
	/// Lot name, or [`PLACEHOLDER`].
	pub name: String,
	/// `"free/capacity"`, empty for a placeholder.
	pub free_over_capacity: String,
}

impl RowSummary {
	/// Row shown for an unpopulated slot.
	#[must_use]
	pub fn placeholder() -> Self {
		Self {
			name: PLACEHOLDER.to_owned(),
			free_over_capacity: String::new(),
		}
	}

	fn of(record: &Record) -> Self {
		Self {
			name: record.name().to_string(),
			free_over_capacity: format!("{}/{}", record.free(), record.capacity()),
		}
	}

	/// Whether this is the placeholder row.
	#[must_use]
	pub fn is_placeholder(&self) -> bool {
		self.name == PLACEHOLDER && self.free_over_capacity.is_empty()
	}
}

/// Fields of the detail card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
	/// Lot identifier.
	pub id: LotId,
	/// Lot name.
	pub name: String,
	/// Free count, or [`FULL_LABEL`] when zero.
	pub free_display: String,
	/// Total capacity.
	pub capacity: String,
}

impl Detail {
	fn of(record: &Record) -> Self {
		let free_display = if record.free().is_zero() {
			FULL_LABEL.to_owned()
		} else {
			record.free().to_string()
		};
		Self {
			id: record.id(),
			name: record.name().to_string(),
			free_display,
			capacity: record.capacity().to_string(),
		}
	}
}

/// Selection and invalidation state owned next to the registry.
#[derive(Debug, Default)]
pub(crate) struct ViewState {
	selected: Option<LotId>,
	flags: Invalidation,
	rows: BTreeSet<LotId>,
}

impl ViewState {
	pub(crate) fn mark_row(&mut self, id: LotId) {
		self.flags |= Invalidation::ROWS;
		self.rows.insert(id);
		if self.selected == Some(id) {
			self.flags |= Invalidation::DETAIL;
		}
	}

	pub(crate) fn mark_resized(&mut self) {
		self.flags |= Invalidation::ROW_COUNT;
	}

	pub(crate) fn select(&mut self, id: Option<LotId>) {
		if self.selected != id {
			self.selected = id;
			self.flags |= Invalidation::DETAIL;
		}
	}

	pub(crate) fn take(&mut self) -> Dirty {
		Dirty {
			flags: std::mem::take(&mut self.flags),
			rows: std::mem::take(&mut self.rows).into_iter().collect(),
		}
	}
}

/// Borrowed read access for a rendering surface.
#[derive(Debug, Clone, Copy)]
pub struct Projection<'a> {
	registry: &'a Registry,
	view: &'a ViewState,
}

impl<'a> Projection<'a> {
	pub(crate) fn new(registry: &'a Registry, view: &'a ViewState) -> Self {
		Self { registry, view }
	}

	/// Number of rows; zero until the directory is sized.
	#[must_use]
	pub fn row_count(&self) -> usize {
		self.registry.len()
	}

	/// Summary of row `index`, a placeholder while the lot is unpopulated.
	///
	/// Returns `None` only for indices at or beyond [`row_count`](Self::row_count).
	#[must_use]
	pub fn row_summary(&self, index: usize) -> Option<RowSummary> {
		if index >= self.row_count() {
			return None;
		}
		let record = u8::try_from(index).ok().and_then(|id| self.registry.get(id));
		Some(record.map_or_else(RowSummary::placeholder, RowSummary::of))
	}

	/// Iterates over all row summaries in id order.
	pub fn rows(&self) -> impl Iterator<Item = RowSummary> + 'a {
		self.registry
			.iter()
			.map(|slot| slot.map_or_else(RowSummary::placeholder, RowSummary::of))
	}

	/// Detail fields of a populated lot.
	#[must_use]
	pub fn detail(&self, id: LotId) -> Option<Detail> {
		self.registry.get(id).map(Detail::of)
	}

	/// Currently selected lot, if any.
	#[must_use]
	pub fn selected(&self) -> Option<LotId> {
		self.view.selected
	}

	/// Detail fields of the selected lot once it is populated.
	#[must_use]
	pub fn selected_detail(&self) -> Option<Detail> {
		self.selected().and_then(|id| self.detail(id))
	}

	/// Whether the surface should redraw.
	#[must_use]
	pub fn is_dirty(&self) -> bool {
		!self.view.flags.is_empty()
	}

	/// Kinds of pending change.
	#[must_use]
	pub fn invalidation(&self) -> Invalidation {
		self.view.flags
	}

	/// Owned copy of everything a surface draws.
	#[must_use]
	pub fn frame(&self) -> ViewFrame {
		ViewFrame {
			rows: self.rows().collect(),
			selected: self.selected(),
			detail: self.selected_detail(),
		}
	}
}

/// Owned snapshot of the projection, for readers outside the owning task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFrame {
	/// Every row in id order.
	pub rows: Vec<RowSummary>,
	/// Selected lot.
	pub selected: Option<LotId>,
	/// Detail card of the selected lot, once populated.
	pub detail: Option<Detail>,
}

#[cfg(test)]
mod tests {
	use parkwatch_proto::{Count, LotName};
	use pretty_assertions::assert_eq;

	use super::*;

	fn registry_with_lot(free: &str) -> Registry {
		let mut registry = Registry::new();
		registry.allocate(2).unwrap();
		registry
			.insert(0, LotName::truncating("Lot A"), Count::from_text("1500"))
			.unwrap();
		registry.update_free(0, Count::from_text(free)).unwrap();
		registry
	}

	#[test]
	fn test_unsized_projection_is_an_empty_list() {
		let registry = Registry::new();
		let view = ViewState::default();
		let projection = Projection::new(&registry, &view);
		assert_eq!(projection.row_count(), 0);
		assert_eq!(projection.row_summary(0), None);
		assert_eq!(projection.rows().count(), 0);
	}

	#[test]
	fn test_row_summary_formats_free_over_capacity() {
		let registry = registry_with_lot("37");
		let view = ViewState::default();
		let projection = Projection::new(&registry, &view);
		assert_eq!(
			projection.row_summary(0),
			Some(RowSummary {
				name: "Lot A".into(),
				free_over_capacity: "37/1500".into(),
			})
		);
		assert_eq!(projection.row_summary(1), Some(RowSummary::placeholder()));
		assert_eq!(projection.row_summary(2), None);
	}

	#[test]
	fn test_detail_shows_full_for_zero() {
		let registry = registry_with_lot("0");
		let view = ViewState::default();
		let detail = Projection::new(&registry, &view).detail(0).unwrap();
		assert_eq!(detail.free_display, FULL_LABEL);
		assert_eq!(detail.capacity, "1500");

		let registry = registry_with_lot("37");
		let detail = Projection::new(&registry, &view).detail(0).unwrap();
		assert_eq!(detail.free_display, "37");
	}

	#[test]
	fn test_suspect_values_displayed_verbatim() {
		let registry = registry_with_lot("-12");
		let view = ViewState::default();
		let projection = Projection::new(&registry, &view);
		assert_eq!(projection.detail(0).unwrap().free_display, "-12");
		assert_eq!(projection.row_summary(0).unwrap().free_over_capacity, "-12/1500");
		assert!(registry.get(0).unwrap().is_suspect());
	}

	#[test]
	fn test_selected_row_change_dirties_detail() {
		let mut view = ViewState::default();
		view.select(Some(3));
		assert_eq!(view.take().flags, Invalidation::DETAIL);

		view.mark_row(1);
		assert_eq!(
			view.take(),
			Dirty {
				flags: Invalidation::ROWS,
				rows: vec![1],
			}
		);

		view.mark_row(3);
		view.mark_row(1);
		assert_eq!(
			view.take(),
			Dirty {
				flags: Invalidation::ROWS | Invalidation::DETAIL,
				rows: vec![1, 3],
			}
		);
		assert!(view.take().is_empty());
	}

	#[test]
	fn test_reselecting_same_lot_is_not_a_change() {
		let mut view = ViewState::default();
		view.select(Some(1));
		view.take();
		view.select(Some(1));
		assert!(view.take().is_empty());
	}
}
