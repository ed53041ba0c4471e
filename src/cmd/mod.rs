use std::io;
use std::path::PathBuf;

use clonedoc::sclone::CloneError;
use clonedoc::snappy::FrameError;
use thiserror::Error;

/// Structured-clone decode command.
pub mod decode;
/// Stream statistics command.
pub mod info;
/// Text and JSON renderers for decoded documents.
pub mod render;
/// Input opening and framing detection.
pub mod source;
/// Framed stream decompression command.
pub mod unframe;
/// Shared output helpers.
pub mod util;

/// Result alias for command handlers.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors reported by command handlers.
#[derive(Debug, Error)]
pub enum CliError {
	/// Input or output file could not be opened.
	#[error("{}: {source}", .path.display())]
	Open {
		/// Offending path.
		path: PathBuf,
		/// Underlying failure.
		source: io::Error,
	},
	/// `--framing framed` on input without a stream identifier.
	#[error("{}: not a framed snappy stream", .path.display())]
	NotFramed {
		/// Offending path.
		path: PathBuf,
	},
	/// Output write failure.
	#[error("io: {0}")]
	Io(#[from] io::Error),
	/// Structured-clone decode failure.
	#[error(transparent)]
	Clone(#[from] CloneError),
	/// Snappy framing failure.
	#[error(transparent)]
	Frame(#[from] FrameError),
	/// JSON serialization failure.
	#[error("json: {0}")]
	Json(#[from] serde_json::Error),
}
