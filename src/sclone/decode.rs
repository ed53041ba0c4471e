use std::io::Read;

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::sclone::reader::WordReader;
use crate::sclone::{
	CloneError, Document, HeapObject, MapKey, ObjId, PropertyKey, PropertyMap, RegExp, RegExpFlags, Result, Scope, Tag, Unsupported, UnsupportedKind, Value, Word,
	tag,
};

/// Handling of values that are recognised but not decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnsupportedPolicy {
	/// Fail the decode with [`CloneError::NotSupported`].
	#[default]
	Error,
	/// Leave an [`HeapObject::Unsupported`] marker and stop, returning an incomplete document.
	Marker,
}

/// Runtime limits and behavior switches for structured-clone decoding.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
	/// What to do with BigInt, typed-array, buffer, and saved-frame values.
	pub unsupported: UnsupportedPolicy,
	/// Maximum array length reachable through sparse index assignment.
	pub max_array_len: usize,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			unsupported: UnsupportedPolicy::Error,
			max_array_len: 1 << 20,
		}
	}
}

impl DecodeOptions {
	/// Preset for salvaging what precedes an unsupported value.
	pub fn lenient() -> Self {
		Self {
			unsupported: UnsupportedPolicy::Marker,
			..Self::default()
		}
	}
}

/// Decode a structured-clone stream with default options.
pub fn decode(reader: impl Read) -> Result<Document> {
	decode_with(reader, &DecodeOptions::default())
}

/// Decode a structured-clone stream held in memory.
pub fn decode_slice(bytes: &[u8]) -> Result<Document> {
	decode_with(bytes, &DecodeOptions::default())
}

/// Decode a structured-clone stream.
///
/// Reads exactly up to the end of the root value; trailing bytes are left in
/// the source.
pub fn decode_with(reader: impl Read, opt: &DecodeOptions) -> Result<Document> {
	let mut decoder = Decoder {
		input: WordReader::new(reader),
		objects: Vec::new(),
		stack: Vec::new(),
		opt,
		stopped: false,
	};

	let scope = decoder.read_header()?;
	decoder.read_transfer_map()?;

	let root = decoder.start_read()?;
	if !decoder.stopped {
		decoder.fill()?;
	}

	debug!(
		scope = scope.as_str(),
		objects = decoder.objects.len(),
		complete = !decoder.stopped,
		"structured clone decoded"
	);
	Ok(Document::new(root, decoder.objects, scope, !decoder.stopped))
}

struct Decoder<'o, R> {
	input: WordReader<R>,
	/// Back-reference table: every object in allocation order.
	objects: Vec<HeapObject>,
	/// Containers whose children are still being read.
	stack: Vec<ObjId>,
	opt: &'o DecodeOptions,
	stopped: bool,
}

impl<R: Read> Decoder<'_, R> {
	fn read_header(&mut self) -> Result<Scope> {
		let word = self.input.peek()?;
		let raw = if word.tag == tag::HEADER {
			self.input.read_word()?;
			word.data
		} else {
			// Streams from before the header existed are indexed-storage data.
			3
		};

		match Scope::from_raw(raw) {
			Some(scope) if scope.is_persistable() => Ok(scope),
			Some(Scope::SameProcess) => Err(CloneError::SameProcessScope),
			_ => Err(CloneError::InvalidScope { scope: raw }),
		}
	}

	fn read_transfer_map(&mut self) -> Result<()> {
		if self.input.peek()?.tag == tag::TRANSFER_MAP_HEADER {
			return Err(CloneError::TransferMapPresent);
		}
		Ok(())
	}

	fn fill(&mut self) -> Result<()> {
		while let Some(&top) = self.stack.last() {
			if self.input.peek()?.tag == tag::END_OF_KEYS {
				self.input.read_word()?;
				self.stack.pop();
				continue;
			}

			let key = self.start_read()?;
			if self.stopped {
				self.place_stopped_key(top, key);
				return Ok(());
			}

			let keyed_collection = matches!(self.objects[top.0], HeapObject::Map(_) | HeapObject::Set(_));
			if key == Value::Null && !keyed_collection {
				// Older writers ended property lists with a null key.
				debug!(object = top.0, "legacy null terminator");
				self.stack.pop();
				continue;
			}

			if let HeapObject::Set(items) = &mut self.objects[top.0] {
				items.insert(MapKey(key));
				continue;
			}

			let key_end = self.input.offset();
			let val = self.start_read()?;
			self.assign(top, key, val, key_end)?;
			if self.stopped {
				return Ok(());
			}
		}
		Ok(())
	}

	fn assign(&mut self, top: ObjId, key: Value, val: Value, key_end: u64) -> Result<()> {
		let max_array_len = self.opt.max_array_len;
		match &mut self.objects[top.0] {
			HeapObject::Map(entries) => {
				entries.insert(MapKey(key), val);
			}
			HeapObject::Array(slots) => match key {
				Value::Int32(index) if index >= 0 => {
					let slot = index as usize;
					if slot >= max_array_len {
						return Err(CloneError::ArrayTooLarge {
							index: index as u32,
							max: max_array_len,
						});
					}
					if slot >= slots.len() {
						slots.resize(slot + 1, None);
					}
					slots[slot] = Some(val);
				}
				// Non-index properties on arrays are dropped.
				Value::Int32(_) | Value::String(_) => {}
				other => {
					return Err(CloneError::InvalidPropertyKey {
						got: other.kind_label(),
						at: key_end,
					});
				}
			},
			HeapObject::Object(props) => {
				let key = match key {
					Value::Int32(value) => PropertyKey::from_i32(value),
					Value::String(name) => PropertyKey::from_name(&name),
					other => {
						return Err(CloneError::InvalidPropertyKey {
							got: other.kind_label(),
							at: key_end,
						});
					}
				};
				props.insert(key, val);
			}
			// Only containers are ever pushed on the stack.
			_ => {}
		}
		Ok(())
	}

	/// A marker read in key position only lands where it is itself an element.
	fn place_stopped_key(&mut self, top: ObjId, key: Value) {
		if let HeapObject::Set(items) = &mut self.objects[top.0] {
			items.insert(MapKey(key));
		}
	}

	fn start_read(&mut self) -> Result<Value> {
		let at = self.input.offset();
		let word = self.input.read_word()?;

		match word.kind() {
			Tag::Null => Ok(Value::Null),
			Tag::Undefined => Ok(Value::Undefined),
			Tag::Int32 => Ok(Value::Int32(word.data as i32)),
			Tag::Boolean => Ok(Value::Bool(word.data != 0)),
			Tag::BooleanObject => Ok(self.alloc(HeapObject::Boolean(word.data != 0))),
			Tag::String => Ok(Value::String(self.input.read_string(word.data)?.into_boxed_str())),
			Tag::StringObject => {
				let text = self.input.read_string(word.data)?;
				Ok(self.alloc(HeapObject::String(text.into_boxed_str())))
			}
			Tag::NumberObject => {
				let number = self.input.read_f64()?;
				Ok(self.alloc(HeapObject::Number(number)))
			}
			Tag::DateObject => {
				let time = self.input.read_f64()?;
				Ok(self.alloc(HeapObject::Date(time)))
			}
			Tag::RegExpObject => {
				let source_at = self.input.offset();
				let source = self.input.read_word()?;
				if source.tag != tag::STRING {
					return Err(CloneError::RegExpSourceNotString {
						tag: source.tag,
						at: source_at,
					});
				}
				let text = self.input.read_string(source.data)?;
				Ok(self.alloc(HeapObject::RegExp(RegExp {
					source: text.into_boxed_str(),
					flags: RegExpFlags(word.data),
				})))
			}
			Tag::ArrayObject => Ok(self.open(HeapObject::Array(Vec::new()))),
			Tag::ObjectObject => Ok(self.open(HeapObject::Object(PropertyMap::new()))),
			Tag::MapObject => Ok(self.open(HeapObject::Map(IndexMap::new()))),
			Tag::SetObject => Ok(self.open(HeapObject::Set(IndexSet::new()))),
			Tag::BackReferenceObject => {
				let index = word.data as usize;
				if index >= self.objects.len() {
					return Err(CloneError::BackReferenceOutOfRange {
						index: word.data,
						len: self.objects.len(),
						at,
					});
				}
				Ok(Value::Object(ObjId(index)))
			}
			Tag::Float => Ok(Value::Double(word.as_f64())),
			Tag::BigInt | Tag::BigIntObject => self.unsupported(UnsupportedKind::BigInt, word, at),
			Tag::ArrayBufferObject => self.unsupported(UnsupportedKind::ArrayBuffer, word, at),
			Tag::SharedArrayBufferObject => self.unsupported(UnsupportedKind::SharedArrayBuffer, word, at),
			Tag::SharedWasmMemoryObject => self.unsupported(UnsupportedKind::SharedWasmMemory, word, at),
			Tag::TypedArrayObject => self.unsupported(UnsupportedKind::TypedArray, word, at),
			Tag::DataViewObject => self.unsupported(UnsupportedKind::DataView, word, at),
			Tag::SavedFrameObject => self.unsupported(UnsupportedKind::SavedFrame, word, at),
			Tag::TypedArrayV1(kind) => self.unsupported(UnsupportedKind::LegacyTypedArray(kind), word, at),
			Tag::Header
			| Tag::EndOfKeys
			| Tag::JsPrincipals
			| Tag::NullJsPrincipals
			| Tag::SavedFramePrincipalsIsSystem
			| Tag::SavedFramePrincipalsIsNotSystem
			| Tag::TransferMapHeader
			| Tag::TransferMapPendingEntry
			| Tag::TransferMapArrayBuffer
			| Tag::TransferMapStoredArrayBuffer
			| Tag::Unknown(_) => Err(CloneError::UnknownTag { tag: word.tag, at }),
		}
	}

	fn unsupported(&mut self, kind: UnsupportedKind, word: Word, at: u64) -> Result<Value> {
		match self.opt.unsupported {
			UnsupportedPolicy::Error => Err(CloneError::NotSupported { kind, tag: word.tag, at }),
			UnsupportedPolicy::Marker => {
				debug!(%kind, at, "stopping at unsupported value");
				self.stopped = true;
				Ok(self.alloc(HeapObject::Unsupported(Unsupported {
					kind,
					tag: word.tag,
					data: word.data,
				})))
			}
		}
	}

	fn alloc(&mut self, object: HeapObject) -> Value {
		let id = ObjId(self.objects.len());
		self.objects.push(object);
		Value::Object(id)
	}

	fn open(&mut self, object: HeapObject) -> Value {
		let id = ObjId(self.objects.len());
		self.objects.push(object);
		self.stack.push(id);
		Value::Object(id)
	}
}
