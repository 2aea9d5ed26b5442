//! Plain-text rendering surface.
//!
//! Stands in for the watch's menu list and detail card: it only reads the
//! view frames the directory hands out.

use std::io::{self, Write};

use parkwatch_directory::{Dirty, Invalidation, ViewFrame};

const MENU_HEADER: &str = "Parking lots";
const NAME_WIDTH: usize = 32;

/// Writes list and detail views to any [`Write`] sink.
pub struct TextSurface<W> {
	out: W,
}

impl<W: Write> TextSurface<W> {
	/// Creates a surface over `out`.
	pub fn new(out: W) -> Self {
		Self { out }
	}

	/// Redraws whatever `dirty` says changed.
	pub fn draw(&mut self, frame: &ViewFrame, dirty: &Dirty) -> io::Result<()> {
		if dirty.flags.intersects(Invalidation::ROWS | Invalidation::ROW_COUNT) {
			self.draw_list(frame, dirty)?;
		}
		if dirty.flags.contains(Invalidation::DETAIL) || frame.selected.is_some_and(|id| dirty.rows.contains(&id)) {
			self.draw_card(frame)?;
		}
		self.out.flush()
	}

	fn draw_list(&mut self, frame: &ViewFrame, dirty: &Dirty) -> io::Result<()> {
		writeln!(self.out, "== {MENU_HEADER} ({}) ==", frame.rows.len())?;
		for (index, row) in frame.rows.iter().enumerate() {
			let changed = u8::try_from(index).is_ok_and(|id| dirty.rows.contains(&id));
			let marker = if changed { '*' } else { ' ' };
			writeln!(
				self.out,
				"{marker}{index:>3}  {:<NAME_WIDTH$} {}",
				row.name, row.free_over_capacity
			)?;
		}
		Ok(())
	}

	fn draw_card(&mut self, frame: &ViewFrame) -> io::Result<()> {
		let Some(id) = frame.selected else {
			return Ok(());
		};
		writeln!(self.out, "-- lot {id} --")?;
		match &frame.detail {
			Some(detail) => {
				writeln!(self.out, "{}", detail.free_display)?;
				writeln!(self.out, "of {}", detail.capacity)?;
				writeln!(self.out, "{}", detail.name)?;
			}
			None => writeln!(self.out, "{}", parkwatch_directory::projection::PLACEHOLDER)?,
		}
		Ok(())
	}

	/// Consumes the surface, returning the sink.
	pub fn into_inner(self) -> W {
		self.out
	}
}
