use std::ops::Range;

/// A complete `{% ... %}` statement tag found by the lexer.
///
/// `raw` tags are special: their span runs from the `{% raw %}` opener
/// through the matching `{% endraw %}`, so the body never reaches the
/// parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
	/// The first identifier after `{%`, e.g. `macro` or `endmacro`.
	pub name: String,
	/// The identifier following the name, e.g. the `foo` in `{% macro foo()
	/// %}`.
	pub label: Option<String>,
	/// Byte offset of the tag start. For `{%-` this includes the whitespace
	/// that the opener trims.
	pub start: usize,
	/// Byte offset just past the tag. For `-%}` this includes the whitespace
	/// that the closer trims.
	pub end: usize,
	/// Whether anything other than whitespace follows the name.
	pub has_arguments: bool,
	/// Whether a bare `=` appears outside of any brackets.
	pub has_assignment: bool,
}

impl Tag {
	pub fn span(&self) -> Range<usize> {
		self.start..self.end
	}

	/// The tag this one closes, e.g. `macro` for `endmacro`.
	pub fn end_target(&self) -> Option<&str> {
		self.name
			.strip_prefix("end")
			.filter(|target| !target.is_empty())
	}

	/// `{% set x %}` and `{% do %}` open a region that runs until
	/// `{% endset %}` / `{% enddo %}`.
	pub fn is_block_form(&self) -> bool {
		match self.name.as_str() {
			"set" => !self.has_assignment,
			"do" => !self.has_arguments,
			_ => false,
		}
	}

	/// `{% set x = 1 %}` and `{% do f() %}` are complete on their own.
	pub fn is_statement_form(&self) -> bool {
		matches!(self.name.as_str(), "set" | "do") && !self.is_block_form()
	}
}
