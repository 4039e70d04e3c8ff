mod common;

use blockscan_core::AnyEmptyResult;
use rstest::rstest;

#[test]
fn check_passes_for_valid_project() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "macros/a.sql", "{% macro a() %}{% endmacro %}")?;
	common::write(tmp.path(), "models/b.sql", "select {{ a() }}")?;

	common::blockscan_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("all 2 file(s) ok"));

	Ok(())
}

#[rstest]
#[case::unclosed_block("{% macro a() %}", "blockscan::file_extraction")]
#[case::unterminated_comment("{# todo", "blockscan::file_extraction")]
#[case::block_inside_if("{% if x %}{% macro a() %}{% endmacro %}{% endif %}", "blockscan::file_extraction")]
fn check_fails_for_invalid_template(
	#[case] content: &str,
	#[case] code: &str,
) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "broken.sql", content)?;

	common::blockscan_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains(code));

	Ok(())
}

#[test]
fn check_fails_for_duplicate_blocks() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "a.sql", "{% macro same() %}{% endmacro %}")?;
	common::write(tmp.path(), "b.sql", "{% macro same() %}{% endmacro %}")?;

	common::blockscan_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("blockscan::duplicate_block"));

	Ok(())
}

#[test]
fn check_fails_for_invalid_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "blockscan.toml", "[blocks]\nnames = 1\n")?;

	common::blockscan_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("blockscan::config_parse"));

	Ok(())
}

#[test]
fn check_verbose_logs_to_stderr() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "a.sql", "{% macro a() %}{% endmacro %}")?;

	common::blockscan_cmd()
		.arg("check")
		.arg("--verbose")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(predicates::str::contains("scanned project"));

	Ok(())
}

#[rstest]
#[case::no_subcommand(&[])]
#[case::unknown_format(&["list", "--format", "xml"])]
#[case::missing_file(&["extract"])]
fn usage_errors_exit_with_one(#[case] args: &[&str]) {
	common::blockscan_cmd().args(args).assert().code(1);
}
