//! Fixed-capacity text fields.
//!
//! Strings from the companion are copied into bounded storage. Over-long names
//! are cut at the last char boundary that fits. Counts are never cut, since a
//! shortened number reads as a different value; the codec rejects them instead.

use std::fmt;
use std::ops::Deref;

/// Byte capacity of a lot name.
pub const NAME_CAPACITY: usize = 40;

/// Byte capacity of a count field (capacity or free spaces).
///
/// Wide enough for any `i64` in decimal, so integers are never cut.
pub const COUNT_CAPACITY: usize = 20;

/// UTF-8 text holding at most `N` bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BoundedStr<const N: usize>(String);

impl<const N: usize> BoundedStr<N> {
	/// Copies `text`, truncating it to fit the capacity.
	#[must_use]
	pub fn truncating(text: &str) -> Self {
		let mut end = text.len().min(N);
		while !text.is_char_boundary(end) {
			end -= 1;
		}
		Self(text[..end].to_owned())
	}

	/// Copies `text` only if it already fits.
	#[must_use]
	pub fn exact(text: &str) -> Option<Self> {
		(text.len() <= N).then(|| Self(text.to_owned()))
	}

	/// Maximum length in bytes.
	#[must_use]
	pub const fn capacity() -> usize {
		N
	}

	/// Borrows the stored text.
	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl<const N: usize> Deref for BoundedStr<N> {
	type Target = str;

	fn deref(&self) -> &str {
		&self.0
	}
}

impl<const N: usize> AsRef<str> for BoundedStr<N> {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl<const N: usize> fmt::Display for BoundedStr<N> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Lot name as stored by the client.
pub type LotName = BoundedStr<NAME_CAPACITY>;

/// Space count carried as text.
///
/// The channel allows either a decimal string or an integer, and values are
/// displayed verbatim, so the text form is authoritative. Nothing here checks
/// that the number is plausible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Count(BoundedStr<COUNT_CAPACITY>);

impl Count {
	/// Wraps received text, truncating to the field capacity.
	#[must_use]
	pub fn from_text(text: &str) -> Self {
		Self(BoundedStr::truncating(text))
	}

	/// Wraps received text only if it fits whole.
	#[must_use]
	pub fn exact(text: &str) -> Option<Self> {
		BoundedStr::exact(text).map(Self)
	}

	/// Renders an integer value.
	#[must_use]
	pub fn from_integer(value: i64) -> Self {
		Self::from_text(&value.to_string())
	}

	/// The zero count a freshly populated record starts from.
	#[must_use]
	pub fn zero() -> Self {
		Self::from_text("0")
	}

	/// Whether the count reads as zero, so the lot is full.
	#[must_use]
	pub fn is_zero(&self) -> bool {
		self.value() == Some(0)
	}

	/// Parses the count if it is a plain decimal integer.
	#[must_use]
	pub fn value(&self) -> Option<i64> {
		self.0.trim().parse().ok()
	}

	/// Borrows the verbatim text.
	#[must_use]
	pub fn as_str(&self) -> &str {
		self.0.as_str()
	}
}

impl fmt::Display for Count {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
