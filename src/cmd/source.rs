use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use clonedoc::snappy::{FrameDecoder, FrameStats, is_framed};
use tracing::info;

use crate::cmd::{CliError, Result};

/// How the input file is unwrapped before structured-clone decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Framing {
	/// Detect the stream identifier chunk.
	#[default]
	Auto,
	/// Always unframe.
	Framed,
	/// Read the file as a bare structured-clone stream.
	Raw,
}

/// Opened command input, unframed when needed.
pub(crate) enum Input {
	Raw(BufReader<File>),
	Framed(FrameDecoder<BufReader<File>>),
}

impl Input {
	/// Open `path` and apply the framing choice.
	pub(crate) fn open(path: &Path, framing: Framing) -> Result<Self> {
		let mut reader = open_file(path)?;
		let framed = match framing {
			Framing::Auto => sniff(&mut reader)?,
			Framing::Framed => true,
			Framing::Raw => false,
		};
		info!(path = %path.display(), framed, "input opened");

		Ok(if framed {
			Self::Framed(FrameDecoder::new_seekable(reader))
		} else {
			Self::Raw(reader)
		})
	}

	/// Open `path`, requiring the stream identifier chunk.
	pub(crate) fn open_framed(path: &Path) -> Result<FrameDecoder<BufReader<File>>> {
		let mut reader = open_file(path)?;
		if !sniff(&mut reader)? {
			return Err(CliError::NotFramed { path: path.to_owned() });
		}
		Ok(FrameDecoder::new_seekable(reader))
	}

	/// Chunk counters when the input is framed.
	pub(crate) fn frame_stats(&self) -> Option<FrameStats> {
		match self {
			Self::Raw(_) => None,
			Self::Framed(decoder) => Some(decoder.stats()),
		}
	}
}

impl Read for Input {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		match self {
			Self::Raw(reader) => reader.read(buf),
			Self::Framed(decoder) => decoder.read(buf),
		}
	}
}

fn open_file(path: &Path) -> Result<BufReader<File>> {
	let file = File::open(path).map_err(|source| CliError::Open {
		path: path.to_owned(),
		source,
	})?;
	Ok(BufReader::new(file))
}

fn sniff(reader: &mut BufReader<File>) -> Result<bool> {
	Ok(is_framed(reader.fill_buf()?))
}
