mod decode;
mod error;
mod reader;
pub mod tag;
mod value;

/// Decoding entry points and options.
pub use decode::{DecodeOptions, UnsupportedPolicy, decode, decode_slice, decode_with};
/// Error, taxonomy, and result aliases.
pub use error::{CloneError, ErrorClass, Result};
/// Tag classification and header scope.
pub use tag::{Scope, Tag, TypedArrayKind, Word};
/// Decoded document and value types.
pub use value::{Document, HeapObject, MapKey, ObjId, PropertyKey, PropertyMap, RegExp, RegExpFlags, Unsupported, UnsupportedKind, Value};
