use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;

use clonedoc::snappy::FrameDecoder;
use tracing::info;

use crate::cmd::source::Input;
use crate::cmd::{CliError, Result};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Write to this file instead of stdout.
	#[arg(long)]
	pub out: Option<PathBuf>,
}

/// Decompress a framed Snappy file.
pub fn run(args: Args) -> Result<()> {
	let Args { path, out } = args;

	let mut decoder = Input::open_framed(&path)?;
	let written = match out {
		Some(target) => {
			let file = File::create(&target).map_err(|source| CliError::Open { path: target, source })?;
			let mut writer = BufWriter::new(file);
			let written = copy_out(&mut decoder, &mut writer)?;
			writer.flush()?;
			written
		}
		None => {
			let mut stdout = io::stdout().lock();
			let written = copy_out(&mut decoder, &mut stdout)?;
			stdout.flush()?;
			written
		}
	};

	let stats = decoder.stats();
	info!(
		bytes = written,
		compressed = stats.compressed_chunks,
		uncompressed = stats.uncompressed_chunks,
		skipped = stats.skipped_chunks,
		"stream unframed"
	);
	Ok(())
}

fn copy_out<R: Read>(decoder: &mut FrameDecoder<R>, writer: &mut impl Write) -> Result<u64> {
	let mut written = 0;
	loop {
		let chunk = decoder.read_some(usize::MAX)?;
		if chunk.is_empty() {
			return Ok(written);
		}
		writer.write_all(chunk)?;
		written += chunk.len() as u64;
	}
}
