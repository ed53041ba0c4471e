//! Shared test helpers: byte-level builders for structured-clone and framed Snappy streams.

const HEADER: u32 = 0xFFF1_0000;
const NULL: u32 = 0xFFFF_0000;
const UNDEFINED: u32 = 0xFFFF_0001;
const BOOLEAN: u32 = 0xFFFF_0002;
const INT32: u32 = 0xFFFF_0003;
const STRING: u32 = 0xFFFF_0004;
const DATE_OBJECT: u32 = 0xFFFF_0005;
const REGEXP_OBJECT: u32 = 0xFFFF_0006;
const ARRAY_OBJECT: u32 = 0xFFFF_0007;
const OBJECT_OBJECT: u32 = 0xFFFF_0008;
const BOOLEAN_OBJECT: u32 = 0xFFFF_000A;
const STRING_OBJECT: u32 = 0xFFFF_000B;
const NUMBER_OBJECT: u32 = 0xFFFF_000C;
const BACK_REFERENCE_OBJECT: u32 = 0xFFFF_000D;
const MAP_OBJECT: u32 = 0xFFFF_0011;
const SET_OBJECT: u32 = 0xFFFF_0012;
const END_OF_KEYS: u32 = 0xFFFF_0013;

const LATIN1_FLAG: u32 = 0x8000_0000;

/// Scope id written by indexed storage.
pub const SCOPE_INDEXED_DB: u32 = 3;

/// Append-only writer for structured-clone word streams.
///
/// Streams start with a header word for [`SCOPE_INDEXED_DB`] unless
/// [`CloneBuilder::headerless`] is used.
#[derive(Debug, Clone)]
pub struct CloneBuilder {
	scope: Option<u32>,
	body: Vec<u8>,
}

impl Default for CloneBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl CloneBuilder {
	/// Start a stream with an indexed-storage header.
	pub fn new() -> Self {
		Self {
			scope: Some(SCOPE_INDEXED_DB),
			body: Vec::new(),
		}
	}

	/// Start a stream without a header word.
	pub fn headerless() -> Self {
		Self { scope: None, body: Vec::new() }
	}

	/// Replace the header scope id.
	pub fn with_scope(mut self, scope: u32) -> Self {
		self.scope = Some(scope);
		self
	}

	/// Append one raw word.
	pub fn word(mut self, tag: u32, data: u32) -> Self {
		let raw = (u64::from(tag) << 32) | u64::from(data);
		self.body.extend_from_slice(&raw.to_le_bytes());
		self
	}

	/// Append raw bytes verbatim.
	pub fn raw(mut self, bytes: &[u8]) -> Self {
		self.body.extend_from_slice(bytes);
		self
	}

	/// Append `null`.
	pub fn null(self) -> Self {
		self.word(NULL, 0)
	}

	/// Append `undefined`.
	pub fn undefined(self) -> Self {
		self.word(UNDEFINED, 0)
	}

	/// Append a primitive boolean.
	pub fn boolean(self, value: bool) -> Self {
		self.word(BOOLEAN, u32::from(value))
	}

	/// Append a primitive int32.
	pub fn int32(self, value: i32) -> Self {
		self.word(INT32, value as u32)
	}

	/// Append a double as its raw bit pattern.
	pub fn double(mut self, value: f64) -> Self {
		self.body.extend_from_slice(&value.to_bits().to_le_bytes());
		self
	}

	/// Append a Latin-1 string; every char must be below U+0100.
	pub fn latin1(self, text: &str) -> Self {
		self.string_with_tag(STRING, text)
	}

	/// Append a UTF-16 string.
	pub fn utf16(self, text: &str) -> Self {
		let units: Vec<u16> = text.encode_utf16().collect();
		self.utf16_units(&units)
	}

	/// Append a UTF-16 string from raw code units (lone surrogates allowed).
	pub fn utf16_units(mut self, units: &[u16]) -> Self {
		self = self.word(STRING, units.len() as u32);
		let mut bytes = Vec::with_capacity(units.len() * 2);
		for unit in units {
			bytes.extend_from_slice(&unit.to_le_bytes());
		}
		self.padded(&bytes)
	}

	/// Append a boxed Latin-1 string.
	pub fn string_object(self, text: &str) -> Self {
		self.string_with_tag(STRING_OBJECT, text)
	}

	/// Append a boxed boolean.
	pub fn boolean_object(self, value: bool) -> Self {
		self.word(BOOLEAN_OBJECT, u32::from(value))
	}

	/// Append a boxed number.
	pub fn number_object(self, value: f64) -> Self {
		self.word(NUMBER_OBJECT, 0).double(value)
	}

	/// Append a date with its time value.
	pub fn date(self, time: f64) -> Self {
		self.word(DATE_OBJECT, 0).double(time)
	}

	/// Append a regular expression with a Latin-1 source.
	pub fn regexp(self, source: &str, flags: u32) -> Self {
		self.word(REGEXP_OBJECT, flags).latin1(source)
	}

	/// Open an array; close it with [`CloneBuilder::end`].
	pub fn array(self) -> Self {
		self.word(ARRAY_OBJECT, 0)
	}

	/// Open a plain object; close it with [`CloneBuilder::end`].
	pub fn object(self) -> Self {
		self.word(OBJECT_OBJECT, 0)
	}

	/// Open a map; close it with [`CloneBuilder::end`].
	pub fn map(self) -> Self {
		self.word(MAP_OBJECT, 0)
	}

	/// Open a set; close it with [`CloneBuilder::end`].
	pub fn set(self) -> Self {
		self.word(SET_OBJECT, 0)
	}

	/// Close the innermost open container.
	pub fn end(self) -> Self {
		self.word(END_OF_KEYS, 0)
	}

	/// Append a back-reference to the object allocated `index`-th.
	pub fn back_ref(self, index: u32) -> Self {
		self.word(BACK_REFERENCE_OBJECT, index)
	}

	/// Return the encoded stream.
	pub fn finish(self) -> Vec<u8> {
		let mut out = Vec::with_capacity(self.body.len() + 8);
		if let Some(scope) = self.scope {
			let raw = (u64::from(HEADER) << 32) | u64::from(scope);
			out.extend_from_slice(&raw.to_le_bytes());
		}
		out.extend_from_slice(&self.body);
		out
	}

	fn string_with_tag(mut self, tag: u32, text: &str) -> Self {
		let bytes: Vec<u8> = text
			.chars()
			.map(|ch| u8::try_from(u32::from(ch)).expect("latin-1 text"))
			.collect();
		self = self.word(tag, bytes.len() as u32 | LATIN1_FLAG);
		self.padded(&bytes)
	}

	fn padded(mut self, bytes: &[u8]) -> Self {
		self.body.extend_from_slice(bytes);
		let pad = (8 - bytes.len() % 8) % 8;
		self.body.resize(self.body.len() + pad, 0);
		self
	}
}

/// Complete identifier chunk of a framed Snappy stream.
pub const STREAM_HEADER: [u8; 10] = [0xFF, 0x06, 0x00, 0x00, b's', b'N', b'a', b'P', b'p', b'Y'];

/// Append-only writer for framed Snappy streams.
#[derive(Debug, Clone, Default)]
pub struct FrameBuilder {
	out: Vec<u8>,
	checksum: u32,
}

impl FrameBuilder {
	/// Start an empty stream with no identifier.
	pub fn new() -> Self {
		Self::default()
	}

	/// Start a stream with the identifier chunk.
	pub fn with_identifier() -> Self {
		Self::new().identifier()
	}

	/// Append an identifier chunk.
	pub fn identifier(mut self) -> Self {
		self.out.extend_from_slice(&STREAM_HEADER);
		self
	}

	/// Checksum field written into subsequent data chunks.
	pub fn checksum(mut self, checksum: u32) -> Self {
		self.checksum = checksum;
		self
	}

	/// Append a chunk with an arbitrary type and payload.
	pub fn chunk(mut self, chunk_type: u8, payload: &[u8]) -> Self {
		let len = u32::try_from(payload.len()).expect("chunk payload fits 24 bits");
		assert!(len < 1 << 24, "chunk payload fits 24 bits");
		self.out.push(chunk_type);
		self.out.extend_from_slice(&len.to_le_bytes()[..3]);
		self.out.extend_from_slice(payload);
		self
	}

	/// Append an uncompressed data chunk.
	pub fn uncompressed(self, data: &[u8]) -> Self {
		let payload = self.with_checksum(data);
		self.chunk(0x01, &payload)
	}

	/// Append a compressed data chunk.
	pub fn compressed(self, data: &[u8]) -> Self {
		let block = snap::raw::Encoder::new().compress_vec(data).expect("snappy compression succeeds");
		let payload = self.with_checksum(&block);
		self.chunk(0x00, &payload)
	}

	/// Append a skippable chunk of `len` zero bytes.
	pub fn skippable(self, chunk_type: u8, len: usize) -> Self {
		self.chunk(chunk_type, &vec![0_u8; len])
	}

	/// Return the encoded stream.
	pub fn finish(self) -> Vec<u8> {
		self.out
	}

	fn with_checksum(&self, data: &[u8]) -> Vec<u8> {
		let mut payload = Vec::with_capacity(data.len() + 4);
		payload.extend_from_slice(&self.checksum.to_le_bytes());
		payload.extend_from_slice(data);
		payload
	}
}
