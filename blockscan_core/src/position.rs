use std::fmt::Display;

use serde::Deserialize;
use serde::Serialize;

/// A single location in a source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
	/// 1-indexed line number.
	pub line: usize,
	/// 1-indexed column, counted in characters.
	pub column: usize,
	/// Byte offset from the start of the source.
	pub offset: usize,
}

impl Point {
	pub fn new(line: usize, column: usize, offset: usize) -> Self {
		Self {
			line,
			column,
			offset,
		}
	}

	/// The number of characters that precede this point on its line.
	pub fn character(&self) -> usize {
		self.column.saturating_sub(1)
	}
}

/// Rendered as `line:character`, the format used by every extractor error.
impl Display for Point {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}", self.line, self.character())
	}
}

/// The start and end of a span of source text. The end point is exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
	pub start: Point,
	pub end: Point,
}

impl Position {
	pub fn new(
		start_line: usize,
		start_column: usize,
		start_offset: usize,
		end_line: usize,
		end_column: usize,
		end_offset: usize,
	) -> Self {
		Self {
			start: Point::new(start_line, start_column, start_offset),
			end: Point::new(end_line, end_column, end_offset),
		}
	}
}

/// Line-start index for converting byte offsets into [`Point`]s.
///
/// Only `\n` starts a new line, so `\r\n` advances the line exactly once and
/// the `\r` is counted as the last character of the previous line.
#[derive(Debug, Clone)]
pub struct SourceIndex<'a> {
	source: &'a str,
	/// Byte offset of the first character on each line.
	line_starts: Vec<usize>,
}

impl<'a> SourceIndex<'a> {
	pub fn new(source: &'a str) -> Self {
		let line_starts = std::iter::once(0)
			.chain(source.match_indices('\n').map(|(index, _)| index + 1))
			.collect();

		Self {
			source,
			line_starts,
		}
	}

	/// Convert a byte offset into a [`Point`]. Offsets past the end of the
	/// source are clamped to the end.
	pub fn point(&self, offset: usize) -> Point {
		let offset = offset.min(self.source.len());
		let line = self
			.line_starts
			.partition_point(|&start| start <= offset)
			.saturating_sub(1);
		let line_start = self.line_starts[line];
		let characters = self
			.source
			.get(line_start..offset)
			.map_or(0, |text| text.chars().count());

		Point::new(line + 1, characters + 1, offset)
	}

	/// Convert a byte range into a [`Position`].
	pub fn position(&self, start: usize, end: usize) -> Position {
		Position {
			start: self.point(start),
			end: self.point(end),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn single_line() {
		let index = SourceIndex::new("hello");
		assert_eq!(index.point(0), Point::new(1, 1, 0));
		assert_eq!(index.point(4), Point::new(1, 5, 4));
		assert_eq!(index.point(5), Point::new(1, 6, 5));
	}

	#[test]
	fn crlf_counts_one_line() {
		let index = SourceIndex::new("ab\r\ncd\r\n");
		assert_eq!(index.point(4), Point::new(2, 1, 4));
		assert_eq!(index.point(2), Point::new(1, 3, 2));
		assert_eq!(index.point(8), Point::new(3, 1, 8));
	}

	#[test]
	fn multibyte_columns_count_characters() {
		let index = SourceIndex::new("é{% x %}");
		assert_eq!(index.point(2), Point::new(1, 2, 2));
	}

	#[test]
	fn display_uses_zero_based_character() {
		let point = Point::new(3, 5, 22);
		assert_eq!(point.to_string(), "3:4");
	}
}
