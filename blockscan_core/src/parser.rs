use std::collections::BTreeSet;

use derive_more::Deref;
use derive_more::DerefMut;
use serde::Deserialize;
use serde::Serialize;

use crate::BlockscanError;
use crate::BlockscanResult;
use crate::Position;
use crate::SourceIndex;
use crate::lexer::tokenize;
use crate::tokens::Tag;

/// The tag name given to raw text collected between blocks.
pub const DATA_TAG_NAME: &str = "__blockscan__data";

/// The block tags recognized when no explicit set is provided.
pub const DEFAULT_BLOCK_NAMES: [&str; 4] = ["snapshot", "macro", "materialization", "docs"];

/// The set of tag names that open a top-level block.
///
/// ```rust
/// use blockscan_core::BlockNames;
///
/// let names = BlockNames::new(["macro", "test"]);
/// assert!(names.contains("test"));
/// assert!(!names.contains("snapshot"));
/// assert!(BlockNames::default().contains("snapshot"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deref, DerefMut, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockNames(BTreeSet<String>);

impl BlockNames {
	pub fn new<I, S>(names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self(names.into_iter().map(Into::into).collect())
	}

	/// A set that recognizes no blocks. Extraction still validates comments,
	/// strings, and control flow.
	pub fn empty() -> Self {
		Self(BTreeSet::new())
	}
}

impl Default for BlockNames {
	fn default() -> Self {
		Self::new(DEFAULT_BLOCK_NAMES)
	}
}

impl<S: Into<String>> FromIterator<S> for BlockNames {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self::new(iter)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
	/// A region bounded by `{% name %}` and `{% endname %}`.
	Tag,
	/// Raw text between blocks. Only produced when raw data is collected.
	Data,
}

/// A top-level region of template source.
///
/// For [`BlockType::Tag`] blocks `full_span` runs from the opening tag
/// through the closing tag and `contents` is everything in between. For
/// [`BlockType::Data`] blocks both hold the same raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
	pub r#type: BlockType,
	/// The tag that opened the block, or [`DATA_TAG_NAME`].
	pub tag_name: String,
	/// The identifier after the tag name, e.g. the macro name.
	pub label: Option<String>,
	pub contents: String,
	pub full_span: String,
	/// Where `full_span` sits in the source.
	pub position: Position,
}

impl Block {
	pub fn is_data(&self) -> bool {
		self.r#type == BlockType::Data
	}

	/// `tag_name label`, or just the tag name for unlabeled blocks.
	pub fn display_name(&self) -> String {
		match &self.label {
			Some(label) => format!("{} {label}", self.tag_name),
			None => self.tag_name.clone(),
		}
	}
}

/// Extract the top-level blocks of `source` whose tag names appear in
/// `allowed_blocks`.
///
/// When `collect_raw_data` is set, the text before, between, and after
/// blocks is returned as [`BlockType::Data`] blocks so that concatenating
/// every `full_span` reproduces the source.
///
/// ```rust
/// use blockscan_core::BlockNames;
/// use blockscan_core::extract_toplevel_blocks;
///
/// let source = "{% macro greet() %}hi{% endmacro %}";
/// let blocks = extract_toplevel_blocks(source, &BlockNames::default(), false)?;
/// assert_eq!(blocks[0].label.as_deref(), Some("greet"));
/// assert_eq!(blocks[0].contents, "hi");
/// # Ok::<(), blockscan_core::BlockscanError>(())
/// ```
pub fn extract_toplevel_blocks(
	source: &str,
	allowed_blocks: &BlockNames,
	collect_raw_data: bool,
) -> BlockscanResult<Vec<Block>> {
	let mut extractor = BlockExtractor::new(source, allowed_blocks, collect_raw_data);

	for tag in tokenize(source) {
		extractor.observe(tag?)?;
	}

	let blocks = extractor.finish()?;
	tracing::debug!(count = blocks.len(), "extracted blocks");

	Ok(blocks)
}

/// Extract blocks with the [default names](DEFAULT_BLOCK_NAMES), collecting
/// raw data.
pub fn extract_blocks(source: &str) -> BlockscanResult<Vec<Block>> {
	extract_toplevel_blocks(source, &BlockNames::default(), true)
}

enum Frame {
	/// An allowed block waiting for its end tag.
	Block(Tag),
	/// A `set`/`do` region whose contents are skipped.
	Opaque(Tag),
}

struct BlockExtractor<'a> {
	source: &'a str,
	index: SourceIndex<'a>,
	allowed: &'a BlockNames,
	collect_raw_data: bool,
	frames: Vec<Frame>,
	control_flow: Vec<Tag>,
	/// Byte offset of the first source byte not yet assigned to a block.
	last_position: usize,
	blocks: Vec<Block>,
}

impl<'a> BlockExtractor<'a> {
	fn new(source: &'a str, allowed: &'a BlockNames, collect_raw_data: bool) -> Self {
		Self {
			source,
			index: SourceIndex::new(source),
			allowed,
			collect_raw_data,
			frames: vec![],
			control_flow: vec![],
			last_position: 0,
			blocks: vec![],
		}
	}

	fn observe(&mut self, tag: Tag) -> BlockscanResult<()> {
		if let Some(Frame::Opaque(top)) = self.frames.last() {
			let closes_top = tag.end_target() == Some(top.name.as_str());

			if closes_top {
				self.frames.pop();
			} else if tag.is_block_form() {
				self.frames.push(Frame::Opaque(tag));
			}

			return Ok(());
		}

		match tag.name.as_str() {
			"if" | "for" => {
				self.control_flow.push(tag);
				return Ok(());
			}
			"endif" | "endfor" => return self.close_control_flow(&tag),
			"raw" => return Ok(()),
			_ => {}
		}

		if tag.is_block_form() && !self.allowed.contains(&tag.name) {
			self.frames.push(Frame::Opaque(tag));
			return Ok(());
		}

		if tag.is_statement_form() {
			return Ok(());
		}

		if self.allowed.contains(&tag.name) {
			return self.open_block(tag);
		}

		if let Some(target) = tag.end_target() {
			if self.allowed.contains(target) {
				return self.close_block(tag);
			}
		}

		Ok(())
	}

	fn close_control_flow(&mut self, tag: &Tag) -> BlockscanResult<()> {
		let expected = tag.end_target().unwrap_or_default().to_string();
		let position = self.index.point(tag.start);

		let Some(top) = self.control_flow.last() else {
			return Err(BlockscanError::UnmatchedControlFlowEnd {
				got: tag.name.clone(),
				expected,
				position,
			});
		};

		if top.name != expected {
			return Err(BlockscanError::MismatchedControlFlowEnd {
				got: tag.name.clone(),
				expected: format!("end{}", top.name),
				position,
			});
		}

		self.control_flow.pop();
		Ok(())
	}

	fn open_block(&mut self, tag: Tag) -> BlockscanResult<()> {
		if !self.control_flow.is_empty() {
			return Err(BlockscanError::BlockInsideControlFlow {
				name: tag.name,
				position: self.index.point(tag.start),
			});
		}

		let outer = self.frames.iter().find_map(|frame| {
			match frame {
				Frame::Block(open) if open.name == tag.name => Some(open),
				_ => None,
			}
		});

		if let Some(outer) = outer {
			return Err(BlockscanError::NestedBlock {
				outer: outer.name.clone(),
				outer_position: self.index.point(outer.start),
				inner: tag.name,
				inner_position: self.index.point(tag.start),
			});
		}

		if self.frames.is_empty() {
			self.push_data(tag.start);
			self.last_position = tag.start;
		}

		tracing::trace!(name = %tag.name, label = ?tag.label, "open block");
		self.frames.push(Frame::Block(tag));

		Ok(())
	}

	fn close_block(&mut self, tag: Tag) -> BlockscanResult<()> {
		let position = self.index.point(tag.start);

		let open = match self.frames.last() {
			Some(Frame::Block(open)) if tag.end_target() == Some(open.name.as_str()) => open,
			Some(Frame::Block(open) | Frame::Opaque(open)) => {
				return Err(BlockscanError::MismatchedBlockEnd {
					got: tag.name,
					expected: format!("end{}", open.name),
					position,
				});
			}
			None => {
				return Err(BlockscanError::UnmatchedBlockEnd {
					expected: tag.end_target().unwrap_or_default().to_string(),
					got: tag.name,
					position,
				});
			}
		};

		let open = open.clone();
		self.frames.pop();

		if !self.frames.is_empty() {
			return Ok(());
		}

		let contents = self.source.get(open.end..tag.start).unwrap_or_default();
		let full_span = self.source.get(open.start..tag.end).unwrap_or_default();

		self.blocks.push(Block {
			r#type: BlockType::Tag,
			tag_name: open.name,
			label: open.label,
			contents: contents.to_string(),
			full_span: full_span.to_string(),
			position: self.index.position(open.start, tag.end),
		});
		self.last_position = tag.end;

		Ok(())
	}

	/// Emit the unclaimed text before `end` as a data block.
	fn push_data(&mut self, end: usize) {
		if !self.collect_raw_data || end <= self.last_position {
			return;
		}

		let Some(text) = self.source.get(self.last_position..end) else {
			return;
		};

		self.blocks.push(Block {
			r#type: BlockType::Data,
			tag_name: DATA_TAG_NAME.to_string(),
			label: None,
			contents: text.to_string(),
			full_span: text.to_string(),
			position: self.index.position(self.last_position, end),
		});
	}

	fn finish(mut self) -> BlockscanResult<Vec<Block>> {
		let unclosed = self
			.frames
			.first()
			.map(|frame| {
				match frame {
					Frame::Block(open) | Frame::Opaque(open) => open,
				}
			})
			.or_else(|| self.control_flow.first());

		if let Some(open) = unclosed {
			return Err(BlockscanError::UnclosedBlock {
				name: open.name.clone(),
				line: self.index.point(open.end).line,
			});
		}

		self.push_data(self.source.len());

		Ok(self.blocks)
	}
}
