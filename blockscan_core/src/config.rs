use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::BlockNames;
use crate::BlockscanError;
use crate::BlockscanResult;

/// Default maximum file size in bytes (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"blockscan.toml",
	".blockscan.toml",
	".config/blockscan.toml",
];

/// File extensions scanned when `[scan] extensions` is not set.
pub const DEFAULT_EXTENSIONS: [&str; 4] = ["sql", "jinja", "j2", "jinja2"];

/// Configuration loaded from a `blockscan.toml` file.
///
/// ```toml
/// [blocks]
/// names = ["macro", "snapshot", "materialization", "docs", "test"]
///
/// [scan]
/// include = ["macros/**/*.txt"]
/// exclude = ["target/", "*.generated.sql"]
/// extensions = ["sql", "jinja"]
/// max_file_size = 10485760
/// disable_gitignore = false
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockscanConfig {
	#[serde(default)]
	pub blocks: BlocksConfig,
	#[serde(default)]
	pub scan: ScanConfig,
}

/// The `[blocks]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlocksConfig {
	/// Tag names that open a top-level block. Falls back to
	/// [`BlockNames::default`] when unset.
	#[serde(default)]
	pub names: Option<BlockNames>,
}

/// The `[scan]` table.
///
/// `exclude` patterns follow gitignore syntax and are applied on top of any
/// `.gitignore` rules (unless `disable_gitignore` is set). `include` patterns
/// are globs relative to the project root and select files regardless of
/// their extension.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
	pub include: Vec<String>,
	pub exclude: Vec<String>,
	pub extensions: Vec<String>,
	pub max_file_size: u64,
	pub disable_gitignore: bool,
}

impl Default for ScanConfig {
	fn default() -> Self {
		Self {
			include: vec![],
			exclude: vec![],
			extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
			max_file_size: DEFAULT_MAX_FILE_SIZE,
			disable_gitignore: false,
		}
	}
}

impl BlockscanConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if the file does not exist.
	pub fn load(root: &Path) -> BlockscanResult<Option<BlockscanConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		tracing::debug!(path = %config_path.display(), "loading config");
		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::parse(&content)?;

		Ok(Some(config))
	}

	/// Parse config text.
	pub fn parse(content: &str) -> BlockscanResult<BlockscanConfig> {
		toml::from_str(content).map_err(|e| BlockscanError::ConfigParse(e.to_string()))
	}

	/// The block names to extract, defaulting when `[blocks] names` is unset.
	pub fn block_names(&self) -> BlockNames {
		self.blocks.names.clone().unwrap_or_default()
	}
}
