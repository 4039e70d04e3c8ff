mod common;

use blockscan_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;
use serde_json::Value;

#[test]
fn extract_with_explicit_names() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let file = tmp.path().join("schema.sql");
	std::fs::write(
		&file,
		"{% test not_null(model) %}x{% endtest %}\n{% macro m() %}{% endmacro %}\n{% docs d %}{% \
		 enddocs %}",
	)?;

	common::blockscan_cmd()
		.arg("extract")
		.arg(&file)
		.arg("--names")
		.arg("test,macro")
		.assert()
		.success()
		.stdout(predicates::str::contains("test not_null 1:0-1:40"))
		.stdout(predicates::str::contains("macro m 2:0-2:29"))
		.stdout(predicates::str::contains("docs d").not());

	Ok(())
}

#[test]
fn extract_json_with_raw_data() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let file = tmp.path().join("a.sql");
	std::fs::write(&file, "select 1\n{% macro a() %}{% endmacro %}")?;

	let output = common::blockscan_cmd()
		.arg("extract")
		.arg(&file)
		.arg("--raw")
		.arg("--format")
		.arg("json")
		.output()?;
	assert!(output.status.success());

	let json: Value = serde_json::from_slice(&output.stdout)?;
	let blocks = json.as_array().ok_or("expected an array")?;
	assert_eq!(blocks.len(), 2);
	assert_eq!(blocks[0]["type"], "data");
	assert_eq!(blocks[0]["tag_name"], "__blockscan__data");
	assert_eq!(blocks[0]["full_span"], "select 1\n");
	assert_eq!(blocks[1]["label"], "a");
	assert_eq!(blocks[1]["position"]["start"]["line"], 2);

	Ok(())
}

#[test]
fn extract_reports_errors() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let file = tmp.path().join("a.sql");
	std::fs::write(&file, "{% endmacro %}")?;

	common::blockscan_cmd()
		.arg("extract")
		.arg(&file)
		.assert()
		.code(2)
		.stderr(predicates::str::contains("blockscan::file_extraction"));

	Ok(())
}

#[test]
fn extract_missing_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::blockscan_cmd()
		.arg("extract")
		.arg(tmp.path().join("missing.sql"))
		.assert()
		.code(2)
		.stderr(predicates::str::contains("blockscan::io_error"));

	Ok(())
}
