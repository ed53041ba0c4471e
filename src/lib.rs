//! Public library API for reading persisted structured-clone data and framed Snappy streams.
//!
//! The two components are independent: [`snappy::FrameDecoder`] turns a framed
//! stream into plain bytes, and [`sclone::decode`] turns plain bytes into a
//! [`sclone::Document`]. Because the frame decoder implements [`std::io::Read`],
//! the usual pipeline is:
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let file = BufReader::new(File::open("value.bin")?);
//! let document = clonedoc::sclone::decode(clonedoc::snappy::FrameDecoder::new(file))?;
//! println!("{}", document.root().kind_label());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Structured-clone tag dictionary, value graph, and deserializer.
pub mod sclone;
/// Snappy framing-format decompressor.
pub mod snappy;
