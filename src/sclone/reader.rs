use std::io::{self, Read};

use crate::sclone::{CloneError, Result, Word};

const WORD: usize = 8;

/// Word-aligned reader over a byte source with one word of lookahead.
pub(crate) struct WordReader<R> {
	inner: R,
	peeked: Option<Word>,
	pos: u64,
}

impl<R: Read> WordReader<R> {
	pub(crate) fn new(inner: R) -> Self {
		Self { inner, peeked: None, pos: 0 }
	}

	/// Offset of the next unconsumed byte, counting a peeked word as unconsumed.
	pub(crate) fn offset(&self) -> u64 {
		match self.peeked {
			Some(_) => self.pos - WORD as u64,
			None => self.pos,
		}
	}

	/// Look at the next word without consuming it.
	pub(crate) fn peek(&mut self) -> Result<Word> {
		if let Some(word) = self.peeked {
			return Ok(word);
		}
		let word = self.fetch_word()?;
		self.peeked = Some(word);
		Ok(word)
	}

	/// Consume the next word.
	pub(crate) fn read_word(&mut self) -> Result<Word> {
		match self.peeked.take() {
			Some(word) => Ok(word),
			None => self.fetch_word(),
		}
	}

	/// Consume one word as a little-endian double.
	pub(crate) fn read_f64(&mut self) -> Result<f64> {
		Ok(self.read_word()?.as_f64())
	}

	/// Read `len` bytes and the zero-to-seven padding bytes that follow them.
	pub(crate) fn read_span(&mut self, len: u64) -> Result<Vec<u8>> {
		debug_assert!(self.peeked.is_none(), "span read with a peeked word");

		let at = self.pos;
		let mut out = Vec::new();
		// `take` bounds the allocation by what the source really holds.
		let got = (&mut self.inner).take(len).read_to_end(&mut out)? as u64;
		self.pos += got;
		if got < len {
			return Err(CloneError::UnexpectedEof { at, need: len, got });
		}

		let pad = ((WORD as u64 - len % WORD as u64) % WORD as u64) as usize;
		let mut padding = [0_u8; WORD];
		self.fill(&mut padding[..pad])?;
		Ok(out)
	}

	/// Read a string whose `data` word carries the length and Latin-1 flag.
	pub(crate) fn read_string(&mut self, data: u32) -> Result<String> {
		let len = u64::from(data & 0x7FFF_FFFF);
		let latin1 = data & 0x8000_0000 != 0;

		if latin1 {
			let bytes = self.read_span(len)?;
			return Ok(bytes.into_iter().map(char::from).collect());
		}

		let bytes = self.read_span(len * 2)?;
		let units = bytes.chunks_exact(2).map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
		Ok(char::decode_utf16(units).map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER)).collect())
	}

	fn fetch_word(&mut self) -> Result<Word> {
		let mut raw = [0_u8; WORD];
		self.fill(&mut raw)?;
		Ok(Word::from_u64(u64::from_le_bytes(raw)))
	}

	fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
		let at = self.pos;
		let mut filled = 0;
		while filled < buf.len() {
			match self.inner.read(&mut buf[filled..]) {
				Ok(0) => {
					return Err(CloneError::UnexpectedEof {
						at,
						need: buf.len() as u64,
						got: filled as u64,
					});
				}
				Ok(read) => {
					filled += read;
					self.pos += read as u64;
				}
				Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
				Err(err) => return Err(err.into()),
			}
		}
		Ok(())
	}
}
