#![allow(missing_docs)]

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};

use clonedoc_testkit::{CloneBuilder, FrameBuilder};
use serde_json::Value;
use tempfile::NamedTempFile;

#[test]
fn decode_json_renders_framed_document() {
	let clone = CloneBuilder::new().object().latin1("a").boolean(true).latin1("me").back_ref(0).end().finish();
	let file = write_temp(&FrameBuilder::with_identifier().compressed(&clone).finish());

	let json = run_json(&["decode", path_arg(file.path()), "--json"]);
	assert_eq!(json["framed"], true);
	assert_eq!(json["scope"], "different_process_for_indexed_db");
	assert_eq!(json["complete"], true);
	assert_eq!(json["objects"], 1);
	assert_eq!(json["root"]["a"], true);
	assert_eq!(json["root"]["me"]["$circular"], 0);
}

#[test]
fn decode_raw_input_with_forced_framing_choice() {
	let clone = CloneBuilder::new().with_scope(2).array().int32(1).int32(7).end().finish();
	let file = write_temp(&clone);

	let json = run_json(&["decode", path_arg(file.path()), "--framing", "raw", "--json"]);
	assert_eq!(json["framed"], false);
	assert_eq!(json["scope"], "different_process");
	assert_eq!(json["root"], serde_json::json!([null, 7]));
}

#[test]
fn decode_text_output_lists_header_facts() {
	let file = write_temp(&CloneBuilder::new().latin1("plain").finish());

	let output = run(&["decode", path_arg(file.path())]);
	assert!(output.status.success(), "decode should succeed");
	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.contains("framed: false"));
	assert!(stdout.contains("root: \"plain\""));
}

#[test]
fn decode_failure_reports_error_and_exit_status() {
	let file = write_temp(&CloneBuilder::new().with_scope(1).null().finish());

	let output = run(&["decode", path_arg(file.path())]);
	assert_eq!(output.status.code(), Some(1));
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.starts_with("error: "), "unexpected stderr: {stderr}");
	assert!(stderr.contains("same-process"));
}

#[test]
fn decode_lenient_flag_keeps_prefix() {
	let clone = CloneBuilder::new().array().int32(0).int32(1).int32(1).word(0xFFFF_0009, 0).finish();
	let file = write_temp(&clone);

	let strict = run(&["decode", path_arg(file.path()), "--json"]);
	assert!(!strict.status.success(), "unsupported value should fail without --lenient");

	let json = run_json(&["decode", path_arg(file.path()), "--json", "--lenient"]);
	assert_eq!(json["complete"], false);
	assert_eq!(json["root"][0], 1);
	assert_eq!(json["root"][1]["$unsupported"], "ArrayBuffer");
}

#[test]
fn unframe_writes_decompressed_bytes() {
	let payload = b"plain bytes behind framing".repeat(50);
	let file = write_temp(&FrameBuilder::with_identifier().compressed(&payload).uncompressed(b"!").finish());
	let out = NamedTempFile::new().expect("temp output");

	let output = run(&["unframe", path_arg(file.path()), "--out", path_arg(out.path())]);
	assert!(output.status.success(), "unframe should succeed");

	let mut expected = payload.clone();
	expected.push(b'!');
	assert_eq!(std::fs::read(out.path()).expect("output readable"), expected);
}

#[test]
fn unframe_rejects_unframed_input() {
	let file = write_temp(b"not framed at all");

	let output = run(&["unframe", path_arg(file.path())]);
	assert_eq!(output.status.code(), Some(1));
	assert!(String::from_utf8_lossy(&output.stderr).contains("not a framed snappy stream"));
}

#[test]
fn info_json_reports_frame_statistics() {
	let clone = CloneBuilder::new().map().latin1("k").int32(1).end().finish();
	let bytes = FrameBuilder::with_identifier()
		.skippable(0x99, 12)
		.checksum(0x0102_0304)
		.compressed(&clone)
		.finish();
	let file = write_temp(&bytes);

	let json = run_json(&["info", path_arg(file.path()), "--json"]);
	assert_eq!(json["framed"], true);
	assert_eq!(json["file_bytes"], bytes.len() as u64);
	assert_eq!(json["decompressed_bytes"], clone.len() as u64);
	assert_eq!(json["frame"]["identifier_chunks"], 1);
	assert_eq!(json["frame"]["compressed_chunks"], 1);
	assert_eq!(json["frame"]["skipped_bytes"], 12);
	assert_eq!(json["frame"]["last_checksum"], "0x01020304");
	assert_eq!(json["root_kind"], "Map");
	assert_eq!(json["objects"], 1);
}

fn write_temp(bytes: &[u8]) -> NamedTempFile {
	let mut file = NamedTempFile::new().expect("temp file");
	file.write_all(bytes).expect("temp file written");
	file.flush().expect("temp file flushed");
	file
}

fn path_arg(path: &Path) -> &str {
	path.to_str().expect("temp path is utf-8")
}

fn run(args: &[&str]) -> Output {
	Command::new(env!("CARGO_BIN_EXE_clonedoc")).args(args).output().expect("command executes")
}

fn run_json(args: &[&str]) -> Value {
	let output = run(args);
	assert!(
		output.status.success(),
		"command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}
