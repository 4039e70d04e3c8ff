use std::collections::BTreeMap;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;
use serde::Deserialize;
use serde::Serialize;

use crate::Block;
use crate::BlockNames;
use crate::BlockscanError;
use crate::BlockscanResult;
use crate::config::BlockscanConfig;
use crate::config::DEFAULT_EXTENSIONS;
use crate::config::DEFAULT_MAX_FILE_SIZE;
use crate::extract_toplevel_blocks;

/// Options for controlling how a project is scanned.
///
/// Use [`ScanOptions::default()`] for sensible defaults or
/// [`ScanOptions::from_config`] to construct from a [`BlockscanConfig`].
#[derive(Debug, Clone)]
pub struct ScanOptions {
	/// Tag names extracted from every file.
	pub block_names: BlockNames,
	/// Gitignore-style patterns to exclude from scanning.
	pub exclude_patterns: Vec<String>,
	/// Files matching these globs are scanned whatever their extension.
	pub include_set: GlobSet,
	/// File extensions (without the dot) that are scanned.
	pub extensions: Vec<String>,
	/// Maximum file size to scan in bytes.
	pub max_file_size: u64,
	/// Whether to disable `.gitignore` integration.
	pub disable_gitignore: bool,
	/// Whether the text between blocks is returned as data blocks.
	pub collect_raw_data: bool,
}

impl Default for ScanOptions {
	fn default() -> Self {
		Self {
			block_names: BlockNames::default(),
			exclude_patterns: Vec::new(),
			include_set: GlobSet::empty(),
			extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
			max_file_size: DEFAULT_MAX_FILE_SIZE,
			disable_gitignore: false,
			collect_raw_data: false,
		}
	}
}

impl ScanOptions {
	/// Construct [`ScanOptions`] from a [`BlockscanConfig`].
	pub fn from_config(config: Option<&BlockscanConfig>) -> Self {
		let Some(config) = config else {
			return Self::default();
		};

		Self {
			block_names: config.block_names(),
			exclude_patterns: config.scan.exclude.clone(),
			include_set: build_glob_set(&config.scan.include),
			extensions: config.scan.extensions.clone(),
			max_file_size: config.scan.max_file_size,
			disable_gitignore: config.scan.disable_gitignore,
			collect_raw_data: false,
		}
	}
}

/// The blocks found in a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileBlocks {
	/// Path relative to the project root.
	pub file: PathBuf,
	pub blocks: Vec<Block>,
}

/// Every template file in a project together with its blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
	pub root: PathBuf,
	/// Files in sorted path order.
	pub files: Vec<FileBlocks>,
}

impl Project {
	/// Total number of blocks across every file.
	pub fn block_count(&self) -> usize {
		self.files.iter().map(|file| file.blocks.len()).sum()
	}
}

/// Scan the project at `root`, loading `blockscan.toml` when present.
pub fn scan_project(root: &Path) -> BlockscanResult<Project> {
	let config = BlockscanConfig::load(root)?;
	let options = ScanOptions::from_config(config.as_ref());

	scan_project_with_options(root, &options)
}

/// Scan the project at `root` with explicit options. Fails on the first file
/// that can't be extracted and when a labeled block is defined twice.
pub fn scan_project_with_options(root: &Path, options: &ScanOptions) -> BlockscanResult<Project> {
	let paths = collect_files(root, options)?;
	let mut files = Vec::with_capacity(paths.len());

	for path in paths {
		check_file_size(&path, options.max_file_size)?;
		let blocks = extract_file(&path, &options.block_names, options.collect_raw_data)?;
		let file = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
		files.push(FileBlocks { file, blocks });
	}

	validate_unique_blocks(&files)?;
	tracing::debug!(files = files.len(), root = %root.display(), "scanned project");

	Ok(Project {
		root: root.to_path_buf(),
		files,
	})
}

/// Read `path` and extract its blocks. Extraction errors carry the path.
pub fn extract_file(
	path: &Path,
	block_names: &BlockNames,
	collect_raw_data: bool,
) -> BlockscanResult<Vec<Block>> {
	tracing::debug!(path = %path.display(), "extracting blocks");
	let source = std::fs::read_to_string(path)?;

	extract_toplevel_blocks(&source, block_names, collect_raw_data).map_err(|error| {
		BlockscanError::FileExtraction {
			path: path.display().to_string(),
			source: Box::new(error),
		}
	})
}

fn check_file_size(path: &Path, limit: u64) -> BlockscanResult<()> {
	let size = std::fs::metadata(path)?.len();

	if size > limit {
		return Err(BlockscanError::FileTooLarge {
			path: path.display().to_string(),
			size,
			limit,
		});
	}

	Ok(())
}

/// Reject a `(tag_name, label)` pair defined more than once. Unlabeled
/// blocks are never compared.
fn validate_unique_blocks(files: &[FileBlocks]) -> BlockscanResult<()> {
	let mut seen: BTreeMap<(&str, &str), &Path> = BTreeMap::new();

	for file in files {
		for block in &file.blocks {
			let Some(label) = block.label.as_deref() else {
				continue;
			};

			if let Some(first) = seen.insert((block.tag_name.as_str(), label), file.file.as_path()) {
				return Err(BlockscanError::DuplicateBlock {
					tag_name: block.tag_name.clone(),
					label: label.to_string(),
					first_file: first.display().to_string(),
					second_file: file.file.display().to_string(),
				});
			}
		}
	}

	Ok(())
}

/// Build a `GlobSet` from a list of glob pattern strings.
fn build_glob_set(patterns: &[String]) -> GlobSet {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		if let Ok(glob) = Glob::new(pattern) {
			builder.add(glob);
		}
	}
	builder.build().unwrap_or_else(|_| GlobSet::empty())
}

/// Build a `Gitignore` matcher from `[scan] exclude`. These follow
/// `.gitignore` syntax and are applied on top of any `.gitignore` rules.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> BlockscanResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			BlockscanError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}
	builder
		.build()
		.map_err(|e| BlockscanError::ConfigParse(format!("failed to build exclude rules: {e}")))
}

/// Build a `Gitignore` matcher from the project's `.gitignore` file (if any).
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.exists() {
		let _ = builder.add(gitignore_path);
	}
	builder.build().unwrap_or_else(|_| Gitignore::empty())
}

struct Walker<'a> {
	root: &'a Path,
	options: &'a ScanOptions,
	gitignore: Gitignore,
	custom_exclude: Gitignore,
	visited_dirs: HashSet<PathBuf>,
	files: Vec<PathBuf>,
}

/// Collect every template file under `root` in sorted order.
fn collect_files(root: &Path, options: &ScanOptions) -> BlockscanResult<Vec<PathBuf>> {
	let gitignore = if options.disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};

	let mut walker = Walker {
		root,
		options,
		gitignore,
		custom_exclude: build_exclude_matcher(root, &options.exclude_patterns)?,
		visited_dirs: HashSet::new(),
		files: Vec::new(),
	};

	walker.walk_dir(root)?;
	walker.files.sort();

	Ok(walker.files)
}

impl Walker<'_> {
	fn walk_dir(&mut self, dir: &Path) -> BlockscanResult<()> {
		if !dir.is_dir() {
			return Ok(());
		}

		let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
		if !self.visited_dirs.insert(canonical) {
			return Err(BlockscanError::SymlinkCycle {
				path: dir.display().to_string(),
			});
		}

		for entry in std::fs::read_dir(dir)? {
			let path = entry?.path();
			let is_dir = path.is_dir();

			if is_dir && is_ignored_directory(&path) {
				continue;
			}

			if self.gitignore.matched(&path, is_dir).is_ignore() {
				continue;
			}

			if self.custom_exclude.matched(&path, is_dir).is_ignore() {
				continue;
			}

			if is_dir {
				self.walk_dir(&path)?;
			} else if self.is_template_file(&path) {
				self.files.push(path);
			}
		}

		Ok(())
	}

	fn is_template_file(&self, path: &Path) -> bool {
		let has_extension = path
			.extension()
			.and_then(|ext| ext.to_str())
			.is_some_and(|ext| self.options.extensions.iter().any(|allowed| allowed == ext));

		has_extension
			|| path
				.strip_prefix(self.root)
				.is_ok_and(|relative| self.options.include_set.is_match(relative))
	}
}

fn is_ignored_directory(path: &Path) -> bool {
	path.file_name()
		.and_then(|name| name.to_str())
		.is_some_and(|name| {
			name.starts_with('.') || matches!(name, "node_modules" | "target" | "dbt_packages")
		})
}
