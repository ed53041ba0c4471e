use std::path::PathBuf;

use clonedoc::sclone::{DecodeOptions, decode_with};

use crate::cmd::Result;
use crate::cmd::render::{RenderOptions, render_json, render_text};
use crate::cmd::source::{Framing, Input};
use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long, value_enum, default_value_t = Framing::Auto)]
	pub framing: Framing,
	#[arg(long)]
	pub json: bool,
	/// Keep what precedes an unsupported value instead of failing.
	#[arg(long)]
	pub lenient: bool,
	#[arg(long, default_value_t = RenderOptions::default().max_depth)]
	pub max_depth: usize,
}

/// Decode a structured-clone file and print its value tree.
pub fn run(args: Args) -> Result<()> {
	let Args {
		path,
		framing,
		json,
		lenient,
		max_depth,
	} = args;

	let options = if lenient { DecodeOptions::lenient() } else { DecodeOptions::default() };
	let render = RenderOptions { max_depth };

	let mut input = Input::open(&path, framing)?;
	let doc = decode_with(&mut input, &options)?;
	let framed = input.frame_stats().is_some();

	if json {
		let payload = DecodeJson {
			path: path.display().to_string(),
			framed,
			scope: doc.scope().as_str(),
			complete: doc.is_complete(),
			objects: doc.len(),
			root: render_json(&doc, render),
		};
		return emit_json(&payload);
	}

	println!("path: {}", path.display());
	println!("framed: {framed}");
	println!("scope: {}", doc.scope().as_str());
	println!("complete: {}", doc.is_complete());
	println!("objects: {}", doc.len());
	print!("root: {}", render_text(&doc, render));

	Ok(())
}

#[derive(serde::Serialize)]
struct DecodeJson {
	path: String,
	framed: bool,
	scope: &'static str,
	complete: bool,
	objects: usize,
	root: serde_json::Value,
}
