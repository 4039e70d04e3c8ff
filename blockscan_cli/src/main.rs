use std::path::Path;
use std::path::PathBuf;
use std::process;

use blockscan_cli::BlockscanCli;
use blockscan_cli::Commands;
use blockscan_cli::OutputFormat;
use blockscan_core::Block;
use blockscan_core::BlockNames;
use blockscan_core::config::BlockscanConfig;
use blockscan_core::project::ScanOptions;
use blockscan_core::project::extract_file;
use blockscan_core::project::scan_project_with_options;
use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,dimmed) => {
		if color_enabled() {
			format!("{}", $text.dimmed())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
	let args = match BlockscanCli::try_parse() {
		Ok(args) => args,
		Err(error) => {
			let code = i32::from(error.use_stderr());
			let _ = error.print();
			process::exit(code);
		}
	};

	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::List { format, raw }) => run_list(&args, *format, *raw),
		Some(Commands::Check) => run_check(&args),
		Some(Commands::Extract {
			file,
			names,
			raw,
			format,
		}) => run_extract(&args, file, names.as_deref(), *raw, *format),
		None => {
			eprintln!("No subcommand specified. Run `blockscan --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<blockscan_core::BlockscanError>() {
			Ok(error) => {
				let report: miette::Report = (*error).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.try_init();
}

fn resolve_root(args: &BlockscanCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load_options(root: &Path) -> Result<ScanOptions, Box<dyn std::error::Error>> {
	let config = BlockscanConfig::load(root)?;
	if let Some(path) = BlockscanConfig::resolve_path(root) {
		tracing::debug!(path = %path.display(), "resolved config");
	}

	Ok(ScanOptions::from_config(config.as_ref()))
}

fn run_list(args: &BlockscanCli, format: OutputFormat, raw: bool) -> CliResult {
	let root = resolve_root(args);
	let mut options = load_options(&root)?;
	options.collect_raw_data = raw;
	let project = scan_project_with_options(&root, &options)?;

	if format == OutputFormat::Json {
		println!("{}", serde_json::to_string_pretty(&project.files)?);
		return Ok(());
	}

	if project.block_count() == 0 {
		println!("No blocks found.");
		return Ok(());
	}

	for file in &project.files {
		if file.blocks.is_empty() {
			continue;
		}

		println!("{}", colored!(file.file.display(), bold));
		for block in &file.blocks {
			println!("  {}", describe_block(block));
		}
	}

	println!(
		"\n{} block(s) in {} file(s)",
		project.block_count(),
		project.files.len()
	);

	Ok(())
}

fn run_check(args: &BlockscanCli) -> CliResult {
	let root = resolve_root(args);
	let options = load_options(&root)?;
	let project = scan_project_with_options(&root, &options)?;

	println!(
		"{} all {} file(s) ok",
		colored!("✓", green),
		project.files.len()
	);

	Ok(())
}

fn run_extract(
	args: &BlockscanCli,
	file: &Path,
	names: Option<&[String]>,
	raw: bool,
	format: OutputFormat,
) -> CliResult {
	let root = resolve_root(args);
	let block_names = match names {
		Some(names) => {
			names
				.iter()
				.map(|name| name.trim())
				.filter(|name| !name.is_empty())
				.collect()
		}
		None => load_options(&root)?.block_names,
	};

	let blocks = extract_file(file, &block_names, raw)?;

	if format == OutputFormat::Json {
		println!("{}", serde_json::to_string_pretty(&blocks)?);
		return Ok(());
	}

	if blocks.is_empty() {
		println!("No blocks found.");
		return Ok(());
	}

	for block in &blocks {
		println!("{}", describe_block(block));
	}

	Ok(())
}

/// `macro my_macro 1:0-3:14`, with data blocks dimmed.
fn describe_block(block: &Block) -> String {
	let span = format!("{}-{}", block.position.start, block.position.end);

	if block.is_data() {
		let text = format!("{} {span}", block.tag_name);
		colored!(text, dimmed)
	} else {
		format!("{} {span}", colored!(block.display_name(), bold))
	}
}
