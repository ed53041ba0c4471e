use std::io;
use std::path::PathBuf;

use clonedoc::sclone::{DecodeOptions, decode_with};
use clonedoc::snappy::FrameStats;

use crate::cmd::source::{Framing, Input};
use crate::cmd::util::emit_json;
use crate::cmd::{CliError, Result};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long, value_enum, default_value_t = Framing::Auto)]
	pub framing: Framing,
	#[arg(long)]
	pub json: bool,
}

/// Print framing statistics and a structured-clone summary.
pub fn run(args: Args) -> Result<()> {
	let Args { path, framing, json } = args;

	let file_bytes = std::fs::metadata(&path)
		.map_err(|source| CliError::Open {
			path: path.clone(),
			source,
		})?
		.len();

	let mut input = Input::open(&path, framing)?;
	let doc = decode_with(&mut input, &DecodeOptions::lenient())?;
	// Count the whole stream, not just the part the root value spans.
	io::copy(&mut input, &mut io::sink())?;
	let frame = input.frame_stats();
	let decompressed_bytes = frame.map_or(file_bytes, |stats| stats.bytes_out);
	let root_kind = match doc.object_of(doc.root()) {
		Some(object) => object.kind_label(),
		None => doc.root().kind_label(),
	};

	if json {
		let payload = InfoJson {
			path: path.display().to_string(),
			file_bytes,
			framed: frame.is_some(),
			frame: frame.map(FrameJson::from),
			decompressed_bytes,
			scope: doc.scope().as_str(),
			complete: doc.is_complete(),
			root_kind,
			objects: doc.len(),
		};
		return emit_json(&payload);
	}

	println!("path: {}", path.display());
	println!("file_bytes: {file_bytes}");
	println!("framed: {}", frame.is_some());
	if let Some(stats) = frame {
		println!("identifier_chunks: {}", stats.identifier_chunks);
		println!("compressed_chunks: {}", stats.compressed_chunks);
		println!("uncompressed_chunks: {}", stats.uncompressed_chunks);
		println!("skipped_chunks: {}", stats.skipped_chunks);
		println!("skipped_bytes: {}", stats.skipped_bytes);
	}
	println!("decompressed_bytes: {decompressed_bytes}");
	println!("scope: {}", doc.scope().as_str());
	println!("complete: {}", doc.is_complete());
	println!("root_kind: {root_kind}");
	println!("objects: {}", doc.len());

	Ok(())
}

#[derive(serde::Serialize)]
struct InfoJson {
	path: String,
	file_bytes: u64,
	framed: bool,
	frame: Option<FrameJson>,
	decompressed_bytes: u64,
	scope: &'static str,
	complete: bool,
	root_kind: &'static str,
	objects: usize,
}

#[derive(serde::Serialize)]
struct FrameJson {
	identifier_chunks: u64,
	compressed_chunks: u64,
	uncompressed_chunks: u64,
	skipped_chunks: u64,
	skipped_bytes: u64,
	bytes_out: u64,
	last_checksum: Option<String>,
}

impl From<FrameStats> for FrameJson {
	fn from(stats: FrameStats) -> Self {
		Self {
			identifier_chunks: stats.identifier_chunks,
			compressed_chunks: stats.compressed_chunks,
			uncompressed_chunks: stats.uncompressed_chunks,
			skipped_chunks: stats.skipped_chunks,
			skipped_bytes: stats.skipped_bytes,
			bytes_out: stats.bytes_out,
			last_checksum: stats.last_checksum.map(|sum| format!("0x{sum:08x}")),
		}
	}
}
