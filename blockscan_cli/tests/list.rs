mod common;

use blockscan_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;
use serde_json::Value;

#[test]
fn list_prints_blocks_per_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "macros/a.sql", "{% macro a() %}x{% endmacro %}\n")?;
	common::write(
		tmp.path(),
		"snapshots/orders.sql",
		"\n{% snapshot orders %}\nselect 1\n{% endsnapshot %}\n",
	)?;

	common::blockscan_cmd()
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("macros/a.sql"))
		.stdout(predicates::str::contains("  macro a 1:0-1:30"))
		.stdout(predicates::str::contains("  snapshot orders 2:0-4:17"))
		.stdout(predicates::str::contains("2 block(s) in 2 file(s)"))
		.stdout(predicates::str::contains("__blockscan__data").not());

	Ok(())
}

#[test]
fn list_raw_includes_data_blocks() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "a.sql", "{% macro a() %}x{% endmacro %}\n")?;

	common::blockscan_cmd()
		.arg("list")
		.arg("--raw")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("  __blockscan__data 1:30-2:0"));

	Ok(())
}

#[test]
fn list_json_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "a.sql", "{% docs intro %}Hello{% enddocs %}")?;
	common::write(tmp.path(), "b.sql", "select 1")?;

	let output = common::blockscan_cmd()
		.arg("list")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.output()?;
	assert!(output.status.success());

	let json: Value = serde_json::from_slice(&output.stdout)?;
	let files = json.as_array().ok_or("expected an array")?;
	assert_eq!(files.len(), 2);
	assert_eq!(files[0]["file"], "a.sql");
	assert_eq!(files[0]["blocks"][0]["type"], "tag");
	assert_eq!(files[0]["blocks"][0]["tag_name"], "docs");
	assert_eq!(files[0]["blocks"][0]["label"], "intro");
	assert_eq!(files[0]["blocks"][0]["contents"], "Hello");
	assert_eq!(files[0]["blocks"][0]["position"]["end"]["offset"], 34);
	assert_eq!(files[1]["blocks"].as_array().map(Vec::len), Some(0));

	Ok(())
}

#[test]
fn list_uses_configured_block_names() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), ".blockscan.toml", "[blocks]\nnames = [\"test\"]\n")?;
	common::write(
		tmp.path(),
		"tests/unique.sql",
		"{% test unique(model, column_name) %}select 1{% endtest %}\n{% macro ignored() %}{% \
		 endmacro %}",
	)?;

	common::blockscan_cmd()
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("test unique"))
		.stdout(predicates::str::contains("macro ignored").not());

	Ok(())
}

#[test]
fn list_without_blocks() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "model.sql", "select {{ 1 }}")?;

	common::blockscan_cmd()
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("No blocks found."));

	Ok(())
}
