use miette::Diagnostic;
use thiserror::Error;

use crate::Point;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum BlockscanError {
	#[error(transparent)]
	#[diagnostic(code(blockscan::io_error))]
	Io(#[from] std::io::Error),

	#[error("unexpected EOF, expected {expected}, got \"{rest}\"")]
	#[diagnostic(
		code(blockscan::unexpected_eof),
		help("every `{{{{`, `{{%` and `{{#` needs a matching `}}}}`, `%}}` or `#}}`")
	)]
	UnexpectedEof { expected: String, rest: String },

	#[error(
		"Got an unexpected control flow end tag, got {got} but never saw a preceding {expected} \
		 (@ {position})"
	)]
	#[diagnostic(code(blockscan::unmatched_control_flow_end))]
	UnmatchedControlFlowEnd {
		got: String,
		expected: String,
		position: Point,
	},

	#[error("Got an unexpected control flow end tag, got {got} but expected {expected} next (@ {position})")]
	#[diagnostic(code(blockscan::mismatched_control_flow_end))]
	MismatchedControlFlowEnd {
		got: String,
		expected: String,
		position: Point,
	},

	#[error(
		"Got a block definition inside control flow at {position}. All block definitions must be \
		 at the top level"
	)]
	#[diagnostic(
		code(blockscan::block_inside_control_flow),
		help("move the block definition outside of any `if` or `for` tag")
	)]
	BlockInsideControlFlow { name: String, position: Point },

	#[error(
		"Got nested tags: {outer} (started at {outer_position}) did not have a matching {{% \
		 end{outer} %}} before a subsequent {inner} was found (started at {inner_position})"
	)]
	#[diagnostic(code(blockscan::nested_block))]
	NestedBlock {
		outer: String,
		outer_position: Point,
		inner: String,
		inner_position: Point,
	},

	#[error("Got an unexpected block end tag, got {got} but expected {expected} next (@ {position})")]
	#[diagnostic(code(blockscan::mismatched_block_end))]
	MismatchedBlockEnd {
		got: String,
		expected: String,
		position: Point,
	},

	#[error(
		"Got an unexpected block end tag, got {got} but never saw a preceding {expected} (@ \
		 {position})"
	)]
	#[diagnostic(code(blockscan::unmatched_block_end))]
	UnmatchedBlockEnd {
		got: String,
		expected: String,
		position: Point,
	},

	#[error("Reached EOF without finding a close tag for {name} (searched from line {line})")]
	#[diagnostic(
		code(blockscan::unclosed_block),
		help("add `{{% end{name} %}}` to close this block")
	)]
	UnclosedBlock { name: String, line: usize },

	#[error("failed to extract blocks from `{path}`: {source}")]
	#[diagnostic(code(blockscan::file_extraction))]
	FileExtraction {
		path: String,
		#[source]
		source: Box<BlockscanError>,
	},

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(blockscan::config_parse),
		help("check that blockscan.toml is valid TOML with [blocks] and/or [scan] sections")
	)]
	ConfigParse(String),

	#[error("duplicate {tag_name} `{label}`: defined in `{first_file}` and `{second_file}`")]
	#[diagnostic(
		code(blockscan::duplicate_block),
		help("each named block must be defined once across the project")
	)]
	DuplicateBlock {
		tag_name: String,
		label: String,
		first_file: String,
		second_file: String,
	},

	#[error("file too large: `{path}` is {size} bytes (limit: {limit} bytes)")]
	#[diagnostic(
		code(blockscan::file_too_large),
		help("increase `max_file_size` in blockscan.toml or exclude this file")
	)]
	FileTooLarge { path: String, size: u64, limit: u64 },

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(blockscan::symlink_cycle),
		help("remove the circular symlink or exclude this path")
	)]
	SymlinkCycle { path: String },
}

impl BlockscanError {
	/// The innermost extraction error, unwrapping any file context.
	pub fn root_cause(&self) -> &BlockscanError {
		match self {
			Self::FileExtraction { source, .. } => source.root_cause(),
			_ => self,
		}
	}
}

pub type BlockscanResult<T> = Result<T, BlockscanError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
