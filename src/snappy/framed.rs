use std::io::{self, BufRead, Read, Seek, SeekFrom};

use tracing::trace;

use crate::snappy::{FrameError, Result};

/// Largest decompressed payload a single data chunk may carry.
pub const MAX_BLOCK_SIZE: usize = 65536;
/// Payload of the stream identifier chunk.
pub const STREAM_IDENTIFIER: &[u8; 6] = b"sNaPpY";
/// Complete identifier chunk that opens every framed stream.
pub const STREAM_HEADER: [u8; 10] = [0xFF, 0x06, 0x00, 0x00, b's', b'N', b'a', b'P', b'p', b'Y'];

const CHUNK_COMPRESSED: u8 = 0x00;
const CHUNK_UNCOMPRESSED: u8 = 0x01;
const CHUNK_IDENTIFIER: u8 = 0xFF;
const CHECKSUM_LEN: u32 = 4;

/// Return `true` when `prefix` starts with the stream identifier chunk.
pub fn is_framed(prefix: &[u8]) -> bool {
	prefix.starts_with(&STREAM_HEADER)
}

/// Running counters over the chunks consumed so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
	/// Stream identifier chunks.
	pub identifier_chunks: u64,
	/// Compressed data chunks.
	pub compressed_chunks: u64,
	/// Uncompressed data chunks.
	pub uncompressed_chunks: u64,
	/// Padding and reserved skippable chunks.
	pub skipped_chunks: u64,
	/// Payload bytes of skippable chunks.
	pub skipped_bytes: u64,
	/// Decompressed bytes produced.
	pub bytes_out: u64,
	/// Masked CRC-32C field of the last data chunk (read, never verified).
	pub last_checksum: Option<u32>,
}

type SkipFn<R> = fn(&mut R, u32) -> io::Result<u64>;

/// Pull-based decompressor for the Snappy framing format.
///
/// Holds at most one decompressed chunk; the source is read only when that
/// buffer is drained, and only as far as the next data chunk.
pub struct FrameDecoder<R> {
	inner: R,
	buf: Box<[u8]>,
	len: usize,
	pos: usize,
	offset: u64,
	scratch: Vec<u8>,
	raw: snap::raw::Decoder,
	skip: SkipFn<R>,
	stats: FrameStats,
}

impl<R: Read> FrameDecoder<R> {
	/// Wrap a source; skippable chunks are read and dropped.
	pub fn new(inner: R) -> Self {
		Self::with_skip(inner, drain)
	}

	fn with_skip(inner: R, skip: SkipFn<R>) -> Self {
		Self {
			inner,
			buf: vec![0_u8; MAX_BLOCK_SIZE].into_boxed_slice(),
			len: 0,
			pos: 0,
			offset: 0,
			scratch: Vec::new(),
			raw: snap::raw::Decoder::new(),
			skip,
			stats: FrameStats::default(),
		}
	}

	/// Borrow the underlying source.
	pub fn get_ref(&self) -> &R {
		&self.inner
	}

	/// Return the underlying source, discarding buffered output.
	pub fn into_inner(self) -> R {
		self.inner
	}

	/// Counters over the chunks consumed so far.
	pub fn stats(&self) -> FrameStats {
		self.stats
	}

	/// Return up to `max` buffered bytes, refilling first when empty.
	///
	/// An empty slice means end of stream (or `max == 0`).
	pub fn read_some(&mut self, max: usize) -> Result<&[u8]> {
		if self.len == 0 {
			self.refill()?;
			if self.len == 0 {
				return Ok(&[]);
			}
		}

		let start = self.pos;
		let end = start + max.min(self.len - start);
		if end < self.len {
			self.pos = end;
		} else {
			self.len = 0;
			self.pos = 0;
		}
		Ok(&self.buf[start..end])
	}

	/// Fill `target` until it is full or the stream ends; return bytes written.
	pub fn read_into(&mut self, target: &mut [u8]) -> Result<usize> {
		let mut filled = 0;
		while filled < target.len() {
			let chunk = self.read_some(target.len() - filled)?;
			if chunk.is_empty() {
				break;
			}
			target[filled..filled + chunk.len()].copy_from_slice(chunk);
			filled += chunk.len();
		}
		Ok(filled)
	}

	/// Read the rest of the stream.
	pub fn read_all(&mut self) -> Result<Vec<u8>> {
		let mut out = Vec::new();
		loop {
			let chunk = self.read_some(usize::MAX)?;
			if chunk.is_empty() {
				return Ok(out);
			}
			out.extend_from_slice(chunk);
		}
	}

	fn refill(&mut self) -> Result<()> {
		debug_assert_eq!(self.len, 0, "refill with buffered data");

		while self.len == 0 {
			let at = self.offset;
			let mut header = [0_u8; 4];
			let got = self.read_full(&mut header)?;
			if got == 0 {
				return Ok(());
			}
			if got < header.len() {
				return Err(FrameError::TruncatedStream {
					what: "chunk header",
					at,
					need: header.len() as u64,
					got: got as u64,
				});
			}

			let chunk_type = header[0];
			let len = u32::from_le_bytes([header[1], header[2], header[3], 0]);
			trace!(chunk_type, len, at, "snappy chunk");

			match chunk_type {
				CHUNK_IDENTIFIER => self.read_identifier(len, at)?,
				CHUNK_COMPRESSED => self.read_compressed(len, at)?,
				CHUNK_UNCOMPRESSED => self.read_uncompressed(len, at)?,
				0x80..=0xFE => self.skip_chunk(len, at)?,
				_ => return Err(FrameError::UnsupportedChunkType { chunk_type, at }),
			}
		}

		self.stats.bytes_out += self.len as u64;
		Ok(())
	}

	fn read_identifier(&mut self, len: u32, at: u64) -> Result<()> {
		if len as usize != STREAM_IDENTIFIER.len() {
			return Err(FrameError::BadIdentifier { at });
		}

		let mut content = [0_u8; 6];
		self.read_exact_chunk(&mut content, "stream identifier")?;
		if &content != STREAM_IDENTIFIER {
			return Err(FrameError::BadIdentifier { at });
		}

		self.stats.identifier_chunks += 1;
		Ok(())
	}

	fn read_compressed(&mut self, len: u32, at: u64) -> Result<()> {
		let data_len = data_len(CHUNK_COMPRESSED, len, at)?;
		self.read_checksum()?;

		let mut scratch = std::mem::take(&mut self.scratch);
		scratch.resize(data_len, 0);
		let read = self.read_exact_chunk(&mut scratch, "compressed data");
		let decoded = read.and_then(|()| self.decompress(&scratch, at));
		self.scratch = scratch;

		self.len = decoded?;
		self.stats.compressed_chunks += 1;
		Ok(())
	}

	fn decompress(&mut self, compressed: &[u8], at: u64) -> Result<usize> {
		let size = snap::raw::decompress_len(compressed).map_err(|source| FrameError::Decompress { at, source })?;
		if size > MAX_BLOCK_SIZE {
			return Err(FrameError::ChunkTooLarge {
				chunk_type: CHUNK_COMPRESSED,
				len: size,
				max: MAX_BLOCK_SIZE,
				at,
			});
		}

		self.raw
			.decompress(compressed, &mut self.buf)
			.map_err(|source| FrameError::Decompress { at, source })
	}

	fn read_uncompressed(&mut self, len: u32, at: u64) -> Result<()> {
		let data_len = data_len(CHUNK_UNCOMPRESSED, len, at)?;
		if data_len > MAX_BLOCK_SIZE {
			return Err(FrameError::ChunkTooLarge {
				chunk_type: CHUNK_UNCOMPRESSED,
				len: data_len,
				max: MAX_BLOCK_SIZE,
				at,
			});
		}

		self.read_checksum()?;

		let start = self.offset;
		let got = read_full(&mut self.inner, &mut self.buf[..data_len])?;
		self.offset += got as u64;
		if got < data_len {
			return Err(FrameError::TruncatedStream {
				what: "uncompressed data",
				at: start,
				need: data_len as u64,
				got: got as u64,
			});
		}

		self.len = data_len;
		self.stats.uncompressed_chunks += 1;
		Ok(())
	}

	fn skip_chunk(&mut self, len: u32, at: u64) -> Result<()> {
		let skipped = (self.skip)(&mut self.inner, len)?;
		self.offset += skipped;
		if skipped < u64::from(len) {
			return Err(FrameError::TruncatedStream {
				what: "skippable chunk",
				at,
				need: u64::from(len),
				got: skipped,
			});
		}

		self.stats.skipped_chunks += 1;
		self.stats.skipped_bytes += u64::from(len);
		Ok(())
	}

	fn read_checksum(&mut self) -> Result<()> {
		let mut checksum = [0_u8; CHECKSUM_LEN as usize];
		self.read_exact_chunk(&mut checksum, "data checksum")?;
		self.stats.last_checksum = Some(u32::from_le_bytes(checksum));
		Ok(())
	}

	fn read_exact_chunk(&mut self, buf: &mut [u8], what: &'static str) -> Result<()> {
		let at = self.offset;
		let got = self.read_full(buf)?;
		if got < buf.len() {
			return Err(FrameError::TruncatedStream {
				what,
				at,
				need: buf.len() as u64,
				got: got as u64,
			});
		}
		Ok(())
	}

	fn read_full(&mut self, buf: &mut [u8]) -> Result<usize> {
		let got = read_full(&mut self.inner, buf)?;
		self.offset += got as u64;
		Ok(got)
	}
}

impl<R: Read + Seek> FrameDecoder<R> {
	/// Wrap a seekable source; skippable chunks are skipped with a relative seek.
	pub fn new_seekable(inner: R) -> Self {
		Self::with_skip(inner, seek_forward)
	}
}

impl<R: Read> Read for FrameDecoder<R> {
	fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
		let chunk = self.read_some(out.len())?;
		let n = chunk.len();
		out[..n].copy_from_slice(chunk);
		Ok(n)
	}
}

impl<R: Read> BufRead for FrameDecoder<R> {
	fn fill_buf(&mut self) -> io::Result<&[u8]> {
		if self.len == 0 {
			self.refill()?;
		}
		Ok(&self.buf[self.pos..self.len])
	}

	fn consume(&mut self, amt: usize) {
		self.pos = (self.pos + amt).min(self.len);
		if self.pos == self.len {
			self.len = 0;
			self.pos = 0;
		}
	}
}

fn data_len(chunk_type: u8, len: u32, at: u64) -> Result<usize> {
	match len.checked_sub(CHECKSUM_LEN) {
		Some(data_len) => Ok(data_len as usize),
		None => Err(FrameError::ChunkTooShort { chunk_type, len, at }),
	}
}

fn read_full<R: Read>(inner: &mut R, buf: &mut [u8]) -> io::Result<usize> {
	let mut filled = 0;
	while filled < buf.len() {
		match inner.read(&mut buf[filled..]) {
			Ok(0) => break,
			Ok(read) => filled += read,
			Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
			Err(err) => return Err(err),
		}
	}
	Ok(filled)
}

fn drain<R: Read>(inner: &mut R, len: u32) -> io::Result<u64> {
	io::copy(&mut inner.by_ref().take(u64::from(len)), &mut io::sink())
}

fn seek_forward<R: Read + Seek>(inner: &mut R, len: u32) -> io::Result<u64> {
	inner.seek(SeekFrom::Current(i64::from(len)))?;
	Ok(u64::from(len))
}

#[cfg(test)]
mod tests;
