use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Find the top-level blocks in Jinja-style templates.",
	long_about = "blockscan lists the macros, snapshots, materializations, docs blocks, and any \
	              other tagged regions defined at the top level of your template files. It \
	              validates block nesting and control flow without rendering anything.\n\nQuick \
	              start:\n  blockscan list     List every block in the project\n  blockscan check    \
	              Validate every template file\n  blockscan extract  Show the blocks of a single \
	              file"
)]
pub struct BlockscanCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// List every block in every template file of the project.
	///
	/// Files are discovered by extension (and `[scan] include` globs from
	/// `blockscan.toml`) and extracted with the configured block names.
	List {
		/// Output format. Use `text` for human-readable output or `json` for
		/// programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,

		/// Also report the raw text between blocks.
		#[arg(long, default_value_t = false)]
		raw: bool,
	},
	/// Validate every template file in the project.
	///
	/// Exits with a non-zero status code when any file has unbalanced
	/// blocks, unterminated comments or strings, block definitions inside
	/// control flow, or when a named block is defined twice.
	Check,
	/// Extract the blocks of a single file.
	Extract {
		/// The template file to read.
		file: PathBuf,

		/// Comma separated block names. Defaults to the configured names.
		#[arg(long, value_delimiter = ',')]
		names: Option<Vec<String>>,

		/// Also report the raw text between blocks.
		#[arg(long, default_value_t = false)]
		raw: bool,

		/// Output format. Use `text` for human-readable output or `json` for
		/// programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
