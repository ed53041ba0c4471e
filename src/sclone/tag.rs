//! Wire tag dictionary for the structured-clone word stream.
//!
//! Constant names follow the `SCTAG_*` names of the writer.

#![allow(missing_docs)]

/// Tags below this value are the upper half of an IEEE-754 double, not tags.
pub const FLOAT_MAX: u32 = 0xFFF0_0000;
/// Optional leading word carrying the serialization scope.
pub const HEADER: u32 = 0xFFF1_0000;

pub const NULL: u32 = 0xFFFF_0000;
pub const UNDEFINED: u32 = 0xFFFF_0001;
pub const BOOLEAN: u32 = 0xFFFF_0002;
pub const INT32: u32 = 0xFFFF_0003;
pub const STRING: u32 = 0xFFFF_0004;

pub const DATE_OBJECT: u32 = 0xFFFF_0005;
pub const REGEXP_OBJECT: u32 = 0xFFFF_0006;
pub const ARRAY_OBJECT: u32 = 0xFFFF_0007;
pub const OBJECT_OBJECT: u32 = 0xFFFF_0008;
pub const ARRAY_BUFFER_OBJECT: u32 = 0xFFFF_0009;
pub const BOOLEAN_OBJECT: u32 = 0xFFFF_000A;
pub const STRING_OBJECT: u32 = 0xFFFF_000B;
pub const NUMBER_OBJECT: u32 = 0xFFFF_000C;
pub const BACK_REFERENCE_OBJECT: u32 = 0xFFFF_000D;
pub const TYPED_ARRAY_OBJECT: u32 = 0xFFFF_0010;
pub const MAP_OBJECT: u32 = 0xFFFF_0011;
pub const SET_OBJECT: u32 = 0xFFFF_0012;
pub const END_OF_KEYS: u32 = 0xFFFF_0013;
pub const DATA_VIEW_OBJECT: u32 = 0xFFFF_0015;
pub const SAVED_FRAME_OBJECT: u32 = 0xFFFF_0016;

// Principals only ever appear inside saved frames.
pub const JSPRINCIPALS: u32 = 0xFFFF_0017;
pub const NULL_JSPRINCIPALS: u32 = 0xFFFF_0018;
pub const RECONSTRUCTED_SAVED_FRAME_PRINCIPALS_IS_SYSTEM: u32 = 0xFFFF_0019;
pub const RECONSTRUCTED_SAVED_FRAME_PRINCIPALS_IS_NOT_SYSTEM: u32 = 0xFFFF_001A;

pub const SHARED_ARRAY_BUFFER_OBJECT: u32 = 0xFFFF_001B;
pub const SHARED_WASM_MEMORY_OBJECT: u32 = 0xFFFF_001C;
pub const BIGINT: u32 = 0xFFFF_001D;
pub const BIGINT_OBJECT: u32 = 0xFFFF_001E;

/// First tag of the legacy (v1) typed-array range.
pub const TYPED_ARRAY_V1_MIN: u32 = 0xFFFF_0100;
/// Last tag of the legacy (v1) typed-array range.
pub const TYPED_ARRAY_V1_MAX: u32 = 0xFFFF_0108;

pub const TRANSFER_MAP_HEADER: u32 = 0xFFFF_0200;
pub const TRANSFER_MAP_PENDING_ENTRY: u32 = 0xFFFF_0201;
pub const TRANSFER_MAP_ARRAY_BUFFER: u32 = 0xFFFF_0202;
pub const TRANSFER_MAP_STORED_ARRAY_BUFFER: u32 = 0xFFFF_0203;

/// One little-endian 64-bit wire word split into tag and data halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word {
	/// High 32 bits.
	pub tag: u32,
	/// Low 32 bits.
	pub data: u32,
}

impl Word {
	/// Split a raw word into its tag and data halves.
	pub fn from_u64(raw: u64) -> Self {
		Self {
			tag: (raw >> 32) as u32,
			data: raw as u32,
		}
	}

	/// Reassemble the raw 64-bit word.
	pub fn to_u64(self) -> u64 {
		(u64::from(self.tag) << 32) | u64::from(self.data)
	}

	/// Reinterpret the whole word as an IEEE-754 double.
	pub fn as_f64(self) -> f64 {
		f64::from_bits(self.to_u64())
	}

	/// Classify the tag half.
	pub fn kind(self) -> Tag {
		Tag::classify(self.tag)
	}
}

/// Element type of a legacy typed-array tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypedArrayKind {
	/// `Int8Array`.
	Int8,
	/// `Uint8Array`.
	Uint8,
	/// `Int16Array`.
	Int16,
	/// `Uint16Array`.
	Uint16,
	/// `Int32Array`.
	Int32,
	/// `Uint32Array`.
	Uint32,
	/// `Float32Array`.
	Float32,
	/// `Float64Array`.
	Float64,
	/// `Uint8ClampedArray`.
	Uint8Clamped,
}

impl TypedArrayKind {
	/// Map an offset inside the legacy typed-array range to its element type.
	pub fn from_index(index: u32) -> Option<Self> {
		Some(match index {
			0 => Self::Int8,
			1 => Self::Uint8,
			2 => Self::Int16,
			3 => Self::Uint16,
			4 => Self::Int32,
			5 => Self::Uint32,
			6 => Self::Float32,
			7 => Self::Float64,
			8 => Self::Uint8Clamped,
			_ => return None,
		})
	}

	/// Render the element type as its constructor name.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Int8 => "Int8Array",
			Self::Uint8 => "Uint8Array",
			Self::Int16 => "Int16Array",
			Self::Uint16 => "Uint16Array",
			Self::Int32 => "Int32Array",
			Self::Uint32 => "Uint32Array",
			Self::Float32 => "Float32Array",
			Self::Float64 => "Float64Array",
			Self::Uint8Clamped => "Uint8ClampedArray",
		}
	}
}

/// Closed classification of a 32-bit tag value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
	/// Upper half of a double; the word is a number, not a tag.
	Float,
	/// Scope header.
	Header,
	/// `null`.
	Null,
	/// `undefined`.
	Undefined,
	/// Primitive boolean.
	Boolean,
	/// Primitive 32-bit integer.
	Int32,
	/// Primitive string.
	String,
	/// `Date` object.
	DateObject,
	/// `RegExp` object.
	RegExpObject,
	/// `Array` container.
	ArrayObject,
	/// Plain object container.
	ObjectObject,
	/// `ArrayBuffer`.
	ArrayBufferObject,
	/// Boxed boolean.
	BooleanObject,
	/// Boxed string.
	StringObject,
	/// Boxed number.
	NumberObject,
	/// Reference to a previously allocated object.
	BackReferenceObject,
	/// Typed array view.
	TypedArrayObject,
	/// `Map` container.
	MapObject,
	/// `Set` container.
	SetObject,
	/// Terminates a container's children.
	EndOfKeys,
	/// `DataView`.
	DataViewObject,
	/// `SavedFrame` stack frame.
	SavedFrameObject,
	/// Principals record.
	JsPrincipals,
	/// Null principals record.
	NullJsPrincipals,
	/// Saved-frame principals marked as system.
	SavedFramePrincipalsIsSystem,
	/// Saved-frame principals marked as non-system.
	SavedFramePrincipalsIsNotSystem,
	/// `SharedArrayBuffer`.
	SharedArrayBufferObject,
	/// Shared `WebAssembly.Memory`.
	SharedWasmMemoryObject,
	/// Primitive BigInt.
	BigInt,
	/// Boxed BigInt.
	BigIntObject,
	/// Legacy typed array with its element type.
	TypedArrayV1(TypedArrayKind),
	/// Transfer map header.
	TransferMapHeader,
	/// Transfer map entry awaiting its object.
	TransferMapPendingEntry,
	/// Transferred `ArrayBuffer`.
	TransferMapArrayBuffer,
	/// Transferred stored `ArrayBuffer`.
	TransferMapStoredArrayBuffer,
	/// Anything outside the dictionary.
	Unknown(u32),
}

impl Tag {
	/// Classify a raw tag value.
	pub fn classify(raw: u32) -> Self {
		if raw < FLOAT_MAX {
			return Self::Float;
		}
		if (TYPED_ARRAY_V1_MIN..=TYPED_ARRAY_V1_MAX).contains(&raw) {
			return TypedArrayKind::from_index(raw - TYPED_ARRAY_V1_MIN).map_or(Self::Unknown(raw), Self::TypedArrayV1);
		}

		match raw {
			HEADER => Self::Header,
			NULL => Self::Null,
			UNDEFINED => Self::Undefined,
			BOOLEAN => Self::Boolean,
			INT32 => Self::Int32,
			STRING => Self::String,
			DATE_OBJECT => Self::DateObject,
			REGEXP_OBJECT => Self::RegExpObject,
			ARRAY_OBJECT => Self::ArrayObject,
			OBJECT_OBJECT => Self::ObjectObject,
			ARRAY_BUFFER_OBJECT => Self::ArrayBufferObject,
			BOOLEAN_OBJECT => Self::BooleanObject,
			STRING_OBJECT => Self::StringObject,
			NUMBER_OBJECT => Self::NumberObject,
			BACK_REFERENCE_OBJECT => Self::BackReferenceObject,
			TYPED_ARRAY_OBJECT => Self::TypedArrayObject,
			MAP_OBJECT => Self::MapObject,
			SET_OBJECT => Self::SetObject,
			END_OF_KEYS => Self::EndOfKeys,
			DATA_VIEW_OBJECT => Self::DataViewObject,
			SAVED_FRAME_OBJECT => Self::SavedFrameObject,
			JSPRINCIPALS => Self::JsPrincipals,
			NULL_JSPRINCIPALS => Self::NullJsPrincipals,
			RECONSTRUCTED_SAVED_FRAME_PRINCIPALS_IS_SYSTEM => Self::SavedFramePrincipalsIsSystem,
			RECONSTRUCTED_SAVED_FRAME_PRINCIPALS_IS_NOT_SYSTEM => Self::SavedFramePrincipalsIsNotSystem,
			SHARED_ARRAY_BUFFER_OBJECT => Self::SharedArrayBufferObject,
			SHARED_WASM_MEMORY_OBJECT => Self::SharedWasmMemoryObject,
			BIGINT => Self::BigInt,
			BIGINT_OBJECT => Self::BigIntObject,
			TRANSFER_MAP_HEADER => Self::TransferMapHeader,
			TRANSFER_MAP_PENDING_ENTRY => Self::TransferMapPendingEntry,
			TRANSFER_MAP_ARRAY_BUFFER => Self::TransferMapArrayBuffer,
			TRANSFER_MAP_STORED_ARRAY_BUFFER => Self::TransferMapStoredArrayBuffer,
			other => Self::Unknown(other),
		}
	}
}

/// Serialization scope carried by the header word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
	/// Valid only inside the writing process; embeds live pointers.
	SameProcess,
	/// Safe to persist and read in another process.
	DifferentProcess,
	/// Like `DifferentProcess`, written by indexed storage.
	DifferentProcessForIndexedDb,
	/// Placeholder scope that is never written to disk.
	Unassigned,
	/// Destination not known at write time.
	UnknownDestination,
}

impl Scope {
	/// Map a raw header scope id; `0` is the legacy spelling of same-process.
	pub fn from_raw(raw: u32) -> Option<Self> {
		Some(match raw {
			0 | 1 => Self::SameProcess,
			2 => Self::DifferentProcess,
			3 => Self::DifferentProcessForIndexedDb,
			4 => Self::Unassigned,
			5 => Self::UnknownDestination,
			_ => return None,
		})
	}

	/// Return `true` when data written under this scope can be read from disk.
	pub fn is_persistable(self) -> bool {
		matches!(self, Self::DifferentProcess | Self::DifferentProcessForIndexedDb)
	}

	/// Render scope as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::SameProcess => "same_process",
			Self::DifferentProcess => "different_process",
			Self::DifferentProcessForIndexedDb => "different_process_for_indexed_db",
			Self::Unassigned => "unassigned",
			Self::UnknownDestination => "unknown_destination",
		}
	}
}

#[cfg(test)]
mod tests;
