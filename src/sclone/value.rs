use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::{IndexMap, IndexSet};

use crate::sclone::{Scope, TypedArrayKind};

/// Stable handle of an object in a [`Document`] arena.
///
/// Handles are allocation-order indexes, which is also the numbering the
/// wire format uses for back-references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjId(pub(crate) usize);

impl ObjId {
	/// Allocation index inside the owning document.
	pub fn index(self) -> usize {
		self.0
	}
}

impl fmt::Display for ObjId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// One decoded value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// `null`.
	Null,
	/// `undefined`.
	Undefined,
	/// Primitive boolean.
	Bool(bool),
	/// Primitive 32-bit integer.
	Int32(i32),
	/// Primitive double.
	Double(f64),
	/// Primitive string.
	String(Box<str>),
	/// Heap object owned by the document arena.
	Object(ObjId),
}

impl Value {
	/// Render the value kind as a stable lowercase label.
	pub fn kind_label(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Undefined => "undefined",
			Self::Bool(_) => "boolean",
			Self::Int32(_) => "int32",
			Self::Double(_) => "double",
			Self::String(_) => "string",
			Self::Object(_) => "object",
		}
	}

	/// Borrow primitive string contents.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(value) => Some(value),
			_ => None,
		}
	}

	/// Return the numeric value of either number representation.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Int32(value) => Some(f64::from(*value)),
			Self::Double(value) => Some(*value),
			_ => None,
		}
	}

	/// Return the object handle.
	pub fn as_object(&self) -> Option<ObjId> {
		match self {
			Self::Object(id) => Some(*id),
			_ => None,
		}
	}
}

/// Property key of a plain object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
	/// Canonical array index.
	Index(u32),
	/// Any other property name.
	Name(Box<str>),
}

impl PropertyKey {
	/// Build a key from a name, folding canonical index strings such as `"5"` into [`PropertyKey::Index`].
	pub fn from_name(name: &str) -> Self {
		match parse_index(name) {
			Some(index) => Self::Index(index),
			None => Self::Name(name.into()),
		}
	}

	/// Build a key from an integer; negative values are ordinary names.
	pub fn from_i32(value: i32) -> Self {
		match u32::try_from(value) {
			Ok(index) => Self::Index(index),
			Err(_) => Self::Name(value.to_string().into_boxed_str()),
		}
	}
}

impl fmt::Display for PropertyKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Index(index) => write!(f, "{index}"),
			Self::Name(name) => f.write_str(name),
		}
	}
}

// Array indexes stop at 2^32 - 2 and have no leading zeros.
fn parse_index(name: &str) -> Option<u32> {
	if name.is_empty() || (name.len() > 1 && name.starts_with('0')) || !name.bytes().all(|byte| byte.is_ascii_digit()) {
		return None;
	}
	name.parse::<u32>().ok().filter(|index| *index != u32::MAX)
}

/// Insertion-ordered properties of a plain object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyMap {
	entries: IndexMap<PropertyKey, Value>,
}

impl PropertyMap {
	/// Create an empty property map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Assign a property; re-assignment keeps the original position.
	pub fn insert(&mut self, key: PropertyKey, value: Value) -> Option<Value> {
		self.entries.insert(key, value)
	}

	/// Look up a property by name (index-like names hit index keys).
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.entries.get(&PropertyKey::from_name(name))
	}

	/// Look up a property by integer index.
	pub fn get_index(&self, index: u32) -> Option<&Value> {
		self.entries.get(&PropertyKey::Index(index))
	}

	/// Iterate properties in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&PropertyKey, &Value)> {
		self.entries.iter()
	}

	/// Number of properties.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Return `true` when there are no properties.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Key wrapper giving `Map`/`Set` members SameValueZero equality.
///
/// Numbers compare numerically across the int32 and double encodings, with
/// `NaN` equal to itself and `+0` equal to `-0`. Objects compare by handle,
/// so two distinct containers stay distinct keys even with equal contents.
#[derive(Debug, Clone)]
pub struct MapKey(pub Value);

impl MapKey {
	fn number(&self) -> Option<f64> {
		self.0.as_f64()
	}
}

impl PartialEq for MapKey {
	fn eq(&self, other: &Self) -> bool {
		if let (Some(left), Some(right)) = (self.number(), other.number()) {
			return left == right || (left.is_nan() && right.is_nan());
		}
		match (&self.0, &other.0) {
			(Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
			(Value::Bool(left), Value::Bool(right)) => left == right,
			(Value::String(left), Value::String(right)) => left == right,
			(Value::Object(left), Value::Object(right)) => left == right,
			_ => false,
		}
	}
}

impl Eq for MapKey {}

impl Hash for MapKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		if let Some(number) = self.number() {
			state.write_u8(3);
			let canonical = if number == 0.0 {
				0.0_f64
			} else if number.is_nan() {
				f64::NAN
			} else {
				number
			};
			canonical.to_bits().hash(state);
			return;
		}
		match &self.0 {
			Value::Null => state.write_u8(0),
			Value::Undefined => state.write_u8(1),
			Value::Bool(value) => {
				state.write_u8(2);
				value.hash(state);
			}
			Value::String(value) => {
				state.write_u8(4);
				value.hash(state);
			}
			Value::Object(id) => {
				state.write_u8(5);
				id.hash(state);
			}
			Value::Int32(_) | Value::Double(_) => {}
		}
	}
}

/// `RegExp` flag bitset as written on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RegExpFlags(pub u32);

impl RegExpFlags {
	/// `i`
	pub const IGNORE_CASE: u32 = 0b0001;
	/// `g`
	pub const GLOBAL: u32 = 0b0010;
	/// `m`
	pub const MULTILINE: u32 = 0b0100;
	/// `u`
	pub const UNICODE: u32 = 0b1000;

	fn has(self, bit: u32) -> bool {
		self.0 & bit != 0
	}

	/// Case-insensitive matching.
	pub fn ignore_case(self) -> bool {
		self.has(Self::IGNORE_CASE)
	}

	/// Global matching.
	pub fn global(self) -> bool {
		self.has(Self::GLOBAL)
	}

	/// Multiline anchors.
	pub fn multiline(self) -> bool {
		self.has(Self::MULTILINE)
	}

	/// Unicode mode.
	pub fn unicode(self) -> bool {
		self.has(Self::UNICODE)
	}

	/// Bits outside the known flag set.
	pub fn unknown_bits(self) -> u32 {
		self.0 & !(Self::IGNORE_CASE | Self::GLOBAL | Self::MULTILINE | Self::UNICODE)
	}
}

impl fmt::Display for RegExpFlags {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (set, letter) in [(self.global(), 'g'), (self.ignore_case(), 'i'), (self.multiline(), 'm'), (self.unicode(), 'u')] {
			if set {
				write!(f, "{letter}")?;
			}
		}
		Ok(())
	}
}

/// Decoded regular expression.
#[derive(Debug, Clone, PartialEq)]
pub struct RegExp {
	/// Pattern source text.
	pub source: Box<str>,
	/// Flag bitset.
	pub flags: RegExpFlags,
}

/// Value category recognised on the wire but not decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedKind {
	/// Primitive or boxed BigInt.
	BigInt,
	/// `ArrayBuffer`.
	ArrayBuffer,
	/// `SharedArrayBuffer`.
	SharedArrayBuffer,
	/// Shared `WebAssembly.Memory`.
	SharedWasmMemory,
	/// Typed array view.
	TypedArray,
	/// `DataView`.
	DataView,
	/// `SavedFrame`.
	SavedFrame,
	/// Pre-`ArrayBuffer` typed array encoding.
	LegacyTypedArray(TypedArrayKind),
}

impl fmt::Display for UnsupportedKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::BigInt => f.write_str("BigInt"),
			Self::ArrayBuffer => f.write_str("ArrayBuffer"),
			Self::SharedArrayBuffer => f.write_str("SharedArrayBuffer"),
			Self::SharedWasmMemory => f.write_str("shared WebAssembly.Memory"),
			Self::TypedArray => f.write_str("typed array"),
			Self::DataView => f.write_str("DataView"),
			Self::SavedFrame => f.write_str("SavedFrame"),
			Self::LegacyTypedArray(kind) => write!(f, "legacy {}", kind.as_str()),
		}
	}
}

/// Placeholder left where an unsupported value was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unsupported {
	/// Unsupported category.
	pub kind: UnsupportedKind,
	/// Raw tag word half.
	pub tag: u32,
	/// Raw data word half.
	pub data: u32,
}

/// Object stored in the document arena.
#[derive(Debug, Clone, PartialEq)]
pub enum HeapObject {
	/// Array slots; `None` is an unset (hole) slot.
	Array(Vec<Option<Value>>),
	/// Plain object.
	Object(PropertyMap),
	/// `Map` in insertion order.
	Map(IndexMap<MapKey, Value>),
	/// `Set` in insertion order.
	Set(IndexSet<MapKey>),
	/// Boxed boolean.
	Boolean(bool),
	/// Boxed number.
	Number(f64),
	/// Boxed string.
	String(Box<str>),
	/// `Date` with its raw wire time value.
	Date(f64),
	/// Regular expression.
	RegExp(RegExp),
	/// Marker for a value that was not decoded.
	Unsupported(Unsupported),
}

impl HeapObject {
	/// Render the object kind as a stable label.
	pub fn kind_label(&self) -> &'static str {
		match self {
			Self::Array(_) => "Array",
			Self::Object(_) => "Object",
			Self::Map(_) => "Map",
			Self::Set(_) => "Set",
			Self::Boolean(_) => "Boolean",
			Self::Number(_) => "Number",
			Self::String(_) => "String",
			Self::Date(_) => "Date",
			Self::RegExp(_) => "RegExp",
			Self::Unsupported(_) => "Unsupported",
		}
	}
}

/// Fully decoded structured-clone document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
	root: Value,
	objects: Vec<HeapObject>,
	scope: Scope,
	complete: bool,
}

impl Document {
	pub(crate) fn new(root: Value, objects: Vec<HeapObject>, scope: Scope, complete: bool) -> Self {
		Self {
			root,
			objects,
			scope,
			complete,
		}
	}

	/// Root value.
	pub fn root(&self) -> &Value {
		&self.root
	}

	/// Resolve an object handle.
	pub fn get(&self, id: ObjId) -> Option<&HeapObject> {
		self.objects.get(id.0)
	}

	/// Resolve the object behind a value, if it is one.
	pub fn object_of(&self, value: &Value) -> Option<&HeapObject> {
		value.as_object().and_then(|id| self.get(id))
	}

	/// All objects in allocation order.
	pub fn objects(&self) -> &[HeapObject] {
		&self.objects
	}

	/// Number of allocated objects.
	pub fn len(&self) -> usize {
		self.objects.len()
	}

	/// Return `true` when no objects were allocated.
	pub fn is_empty(&self) -> bool {
		self.objects.is_empty()
	}

	/// Scope declared (or implied) by the stream header.
	pub fn scope(&self) -> Scope {
		self.scope
	}

	/// `false` when decoding stopped early at an unsupported-value marker.
	pub fn is_complete(&self) -> bool {
		self.complete
	}
}
