mod error;
mod framed;

/// Error, taxonomy, and result aliases.
pub use error::{FrameError, FrameErrorClass, Result};
/// Frame decoder and its stream constants.
pub use framed::{FrameDecoder, FrameStats, MAX_BLOCK_SIZE, STREAM_HEADER, STREAM_IDENTIFIER, is_framed};
