use std::io;

use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, FrameError>;

/// Errors produced while unframing a Snappy stream.
#[derive(Debug, Error)]
pub enum FrameError {
	/// Underlying source failure.
	#[error("io: {0}")]
	Io(#[from] io::Error),
	/// Source ended inside a chunk.
	#[error("truncated stream: {what} at offset {at}, need {need} bytes, got {got}")]
	TruncatedStream {
		/// Part of the chunk being read.
		what: &'static str,
		/// Offset where the read started.
		at: u64,
		/// Requested bytes.
		need: u64,
		/// Bytes actually read.
		got: u64,
	},
	/// Stream identifier chunk with the wrong length or contents.
	#[error("invalid stream identifier at offset {at}")]
	BadIdentifier {
		/// Offset of the chunk header.
		at: u64,
	},
	/// Data chunk shorter than its checksum field.
	#[error("chunk 0x{chunk_type:02x} at offset {at} too short: length {len}")]
	ChunkTooShort {
		/// Chunk type byte.
		chunk_type: u8,
		/// Declared payload length.
		len: u32,
		/// Offset of the chunk header.
		at: u64,
	},
	/// Data chunk whose payload exceeds the block limit.
	#[error("chunk 0x{chunk_type:02x} at offset {at} too large: {len} bytes (max {max})")]
	ChunkTooLarge {
		/// Chunk type byte.
		chunk_type: u8,
		/// Offending size.
		len: usize,
		/// Allowed maximum.
		max: usize,
		/// Offset of the chunk header.
		at: u64,
	},
	/// Reserved chunk type outside the skippable range.
	#[error("unsupported unskippable chunk type 0x{chunk_type:02x} at offset {at}")]
	UnsupportedChunkType {
		/// Chunk type byte.
		chunk_type: u8,
		/// Offset of the chunk header.
		at: u64,
	},
	/// Raw Snappy block failed to decompress.
	#[error("snappy block at offset {at}: {source}")]
	Decompress {
		/// Offset of the chunk header.
		at: u64,
		/// Decoder failure.
		source: snap::Error,
	},
}

/// Coarse error taxonomy for callers that only branch on the failure family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameErrorClass {
	/// Source read failure.
	Io,
	/// Source ended inside a chunk.
	TruncatedStream,
	/// Malformed identifier or chunk length.
	Format,
	/// Unskippable reserved chunk.
	UnsupportedChunkType,
	/// Corrupt compressed block.
	Decompress,
}

impl FrameError {
	/// Group the error into its taxonomy class.
	pub fn class(&self) -> FrameErrorClass {
		match self {
			Self::Io(_) => FrameErrorClass::Io,
			Self::TruncatedStream { .. } => FrameErrorClass::TruncatedStream,
			Self::BadIdentifier { .. } | Self::ChunkTooShort { .. } | Self::ChunkTooLarge { .. } => FrameErrorClass::Format,
			Self::UnsupportedChunkType { .. } => FrameErrorClass::UnsupportedChunkType,
			Self::Decompress { .. } => FrameErrorClass::Decompress,
		}
	}
}

impl From<FrameError> for io::Error {
	fn from(err: FrameError) -> Self {
		match err {
			FrameError::Io(inner) => inner,
			other => io::Error::new(io::ErrorKind::InvalidData, other),
		}
	}
}
