use std::ops::Range;

use logos::Lexer;
use logos::Logos;

use crate::BlockscanError;
use crate::BlockscanResult;
use crate::tokens::Tag;

/// Tokens recognized in plain template text, outside of any delimiter.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum TextToken {
	#[token("{{")]
	ExpressionOpen,
	#[token("{%")]
	TagOpen,
	#[token("{%-")]
	TagOpenTrim,
	#[token("{#")]
	CommentOpen,
	#[token("{")]
	Brace,
	#[regex(r"[^{]+")]
	Text,
}

/// Tokens inside `{# ... #}`. Comments know nothing about quotes.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum CommentToken {
	#[token("#}")]
	Close,
	#[token("#")]
	Hash,
	#[regex(r"[^#]+")]
	Text,
}

/// Tokens inside `{{ ... }}`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum ExpressionToken {
	#[token("}}")]
	Close,
	#[token("'")]
	SingleQuote,
	#[token("\"")]
	DoubleQuote,
	#[token("}")]
	Brace,
	#[regex(r#"[^}'"]+"#)]
	Text,
}

/// Tokens inside a quoted string literal.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum StringToken {
	#[token("'")]
	SingleQuote,
	#[token("\"")]
	DoubleQuote,
	#[token("\\")]
	Backslash,
	#[regex(r#"[^'"\\]+"#)]
	Text,
}

/// Tokens inside `{% ... %}`. Anything unrecognized lexes as an error and is
/// treated as an opaque argument.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum TagToken {
	#[token("%}")]
	Close,
	/// `-%}` owns the whitespace that follows it.
	#[regex(r"-%\}\s*")]
	CloseTrim,
	#[token("'")]
	SingleQuote,
	#[token("\"")]
	DoubleQuote,
	#[token("=")]
	Assign,
	#[token("==")]
	#[token("!=")]
	#[token("<=")]
	#[token(">=")]
	Comparison,
	#[token("(")]
	#[token("[")]
	#[token("{")]
	GroupOpen,
	#[token(")")]
	#[token("]")]
	#[token("}")]
	GroupClose,
	#[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
	Ident,
	#[regex(r"\s+")]
	Whitespace,
}

/// Walks template source and yields every statement tag in source order.
///
/// Comments and expressions are skipped entirely. The walker switches
/// between token sets with [`Lexer::morph`] as it enters and leaves
/// delimiters, so the same characters can mean different things depending
/// on where they appear (a `"` only starts a string inside `{{ }}` or
/// `{% %}`).
pub(crate) struct TagWalker<'s> {
	source: &'s str,
	lexer: Lexer<'s, TextToken>,
	/// Byte offset where the current run of plain text begins. Whitespace
	/// trimmed by a `{%-` opener never reaches back past this point.
	floor: usize,
	finished: bool,
}

impl<'s> TagWalker<'s> {
	pub(crate) fn new(source: &'s str) -> Self {
		Self {
			source,
			lexer: TextToken::lexer(source),
			floor: 0,
			finished: false,
		}
	}

	fn unexpected_eof(&self, expected: &str, from: usize) -> BlockscanError {
		BlockscanError::UnexpectedEof {
			expected: expected.to_string(),
			rest: self.source.get(from..).unwrap_or_default().to_string(),
		}
	}

	fn next_tag(&mut self) -> BlockscanResult<Option<Tag>> {
		while let Some(token) = self.lexer.next() {
			let span = self.lexer.span();

			match token {
				Ok(TextToken::CommentOpen) => self.skip_comment(span.end)?,
				Ok(TextToken::ExpressionOpen) => self.skip_expression(span.end)?,
				Ok(TextToken::TagOpen) => {
					if let Some(tag) = self.read_tag(span, false)? {
						return Ok(Some(tag));
					}
				}
				Ok(TextToken::TagOpenTrim) => {
					if let Some(tag) = self.read_tag(span, true)? {
						return Ok(Some(tag));
					}
				}
				Ok(TextToken::Brace | TextToken::Text) | Err(()) => {}
			}
		}

		Ok(None)
	}

	/// Skip to the first `#}`. Comments never nest.
	fn skip_comment(&mut self, from: usize) -> BlockscanResult<()> {
		let mut lexer = self.lexer.clone().morph::<CommentToken>();

		loop {
			match lexer.next() {
				Some(Ok(CommentToken::Close)) => break,
				Some(_) => {}
				None => return Err(self.unexpected_eof("#}", from)),
			}
		}

		self.floor = lexer.span().end;
		self.lexer = lexer.morph();
		Ok(())
	}

	/// Skip to the `}}` that closes an expression, stepping over string
	/// literals such as `{{ "}}" }}`.
	fn skip_expression(&mut self, from: usize) -> BlockscanResult<()> {
		let mut lexer = self.lexer.clone().morph::<ExpressionToken>();

		loop {
			match lexer.next() {
				Some(Ok(ExpressionToken::Close)) => break,
				Some(Ok(ExpressionToken::SingleQuote)) => {
					lexer = self.skip_string(lexer, StringToken::SingleQuote)?;
				}
				Some(Ok(ExpressionToken::DoubleQuote)) => {
					lexer = self.skip_string(lexer, StringToken::DoubleQuote)?;
				}
				Some(_) => {}
				None => return Err(self.unexpected_eof("}}", from)),
			}
		}

		self.floor = lexer.span().end;
		self.lexer = lexer.morph();
		Ok(())
	}

	/// Skip a string literal whose opening quote was the last token consumed
	/// by `lexer`. A backslash escapes whatever character follows it.
	fn skip_string<T>(&self, lexer: Lexer<'s, T>, closing: StringToken) -> BlockscanResult<Lexer<'s, T>>
	where
		T: Logos<'s, Source = str, Extras = ()>,
	{
		let from = lexer.span().start;
		let mut lexer = lexer.morph::<StringToken>();

		loop {
			match lexer.next() {
				Some(Ok(token)) if token == closing => break,
				Some(Ok(StringToken::Backslash)) => {
					if let Some(escaped) = lexer.remainder().chars().next() {
						lexer.bump(escaped.len_utf8());
					}
				}
				Some(_) => {}
				None => return Err(self.unexpected_eof("string", from)),
			}
		}

		Ok(lexer.morph())
	}

	/// Read the statement tag opened at `open`. Returns `None` when the
	/// opener isn't followed by an identifier, in which case the `{%` is
	/// treated as plain text.
	fn read_tag(&mut self, open: Range<usize>, trims_before: bool) -> BlockscanResult<Option<Tag>> {
		let mut lexer = self.lexer.clone().morph::<TagToken>();
		let mut token = lexer.next();
		if token == Some(Ok(TagToken::Whitespace)) {
			token = lexer.next();
		}

		let Some(Ok(TagToken::Ident)) = token else {
			return Ok(None);
		};

		let name = lexer.slice().to_string();
		let name_end = lexer.span().end;

		let mut lookahead = lexer.clone();
		let label = match (lookahead.next(), lookahead.next()) {
			(Some(Ok(TagToken::Whitespace)), Some(Ok(TagToken::Ident))) => {
				let label = lookahead.slice().to_string();
				lexer = lookahead;
				Some(label)
			}
			_ => None,
		};

		let mut has_arguments = label.is_some();
		let mut has_assignment = false;
		let mut depth = 0usize;

		let end = loop {
			match lexer.next() {
				Some(Ok(TagToken::Close | TagToken::CloseTrim)) => break lexer.span().end,
				Some(Ok(TagToken::Whitespace)) => {}
				Some(Ok(TagToken::SingleQuote)) => {
					has_arguments = true;
					lexer = self.skip_string(lexer, StringToken::SingleQuote)?;
				}
				Some(Ok(TagToken::DoubleQuote)) => {
					has_arguments = true;
					lexer = self.skip_string(lexer, StringToken::DoubleQuote)?;
				}
				Some(Ok(TagToken::GroupOpen)) => {
					has_arguments = true;
					depth += 1;
				}
				Some(Ok(TagToken::GroupClose)) => {
					has_arguments = true;
					depth = depth.saturating_sub(1);
				}
				Some(Ok(TagToken::Assign)) => {
					has_arguments = true;
					has_assignment |= depth == 0;
				}
				Some(_) => has_arguments = true,
				None => return Err(self.unexpected_eof("tag close (\"%}\")", name_end)),
			}
		};

		let start = if trims_before {
			self.trimmed_start(open.start)
		} else {
			open.start
		};

		let mut tag = Tag {
			name,
			label,
			start,
			end,
			has_arguments,
			has_assignment,
		};

		self.lexer = lexer.morph();

		if tag.name == "raw" {
			tag.end = self.skip_raw(end)?;
		}

		self.floor = tag.end;
		tracing::trace!(name = %tag.name, start = tag.start, end = tag.end, "read tag");

		Ok(Some(tag))
	}

	/// The start of a `{%-` tag, extended back over the whitespace it trims.
	fn trimmed_start(&self, offset: usize) -> usize {
		self.source
			.get(self.floor..offset)
			.map_or(offset, |prefix| self.floor + prefix.trim_end().len())
	}

	/// Consume everything up to and including `{% endraw %}`. Nothing inside
	/// a raw region is interpreted.
	fn skip_raw(&mut self, from: usize) -> BlockscanResult<usize> {
		while let Some(token) = self.lexer.next() {
			if matches!(token, Ok(TextToken::TagOpen | TextToken::TagOpenTrim)) {
				if let Some(end) = self.match_endraw() {
					return Ok(end);
				}
			}
		}

		Err(self.unexpected_eof("{% raw %}...{% endraw %}", from))
	}

	/// Consume the tag just opened if it is exactly `{% endraw %}`.
	fn match_endraw(&mut self) -> Option<usize> {
		let mut lexer = self.lexer.clone().morph::<TagToken>();
		let mut token = lexer.next();
		if token == Some(Ok(TagToken::Whitespace)) {
			token = lexer.next();
		}

		if token != Some(Ok(TagToken::Ident)) || lexer.slice() != "endraw" {
			return None;
		}

		token = lexer.next();
		if token == Some(Ok(TagToken::Whitespace)) {
			token = lexer.next();
		}

		if !matches!(token, Some(Ok(TagToken::Close | TagToken::CloseTrim))) {
			return None;
		}

		let end = lexer.span().end;
		self.lexer = lexer.morph();
		Some(end)
	}
}

impl Iterator for TagWalker<'_> {
	type Item = BlockscanResult<Tag>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.finished {
			return None;
		}

		match self.next_tag() {
			Ok(Some(tag)) => Some(Ok(tag)),
			Ok(None) => {
				self.finished = true;
				None
			}
			Err(error) => {
				self.finished = true;
				Some(Err(error))
			}
		}
	}
}

/// Lazily tokenize `source` into statement tags. Errors are yielded in
/// source order, after every tag that precedes them.
pub(crate) fn tokenize(source: &str) -> TagWalker<'_> {
	TagWalker::new(source)
}
