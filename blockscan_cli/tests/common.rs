use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn blockscan_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("blockscan"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}

pub fn write(root: &std::path::Path, relative: &str, content: &str) -> std::io::Result<()> {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)
}
