use thiserror::Error;

use crate::sclone::UnsupportedKind;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, CloneError>;

/// Errors produced while decoding a structured-clone stream.
#[derive(Debug, Error)]
pub enum CloneError {
	/// Underlying source failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Stream ended in the middle of a field.
	#[error("unexpected eof at offset {at}, need {need} bytes, got {got}")]
	UnexpectedEof {
		/// Byte offset where the read started.
		at: u64,
		/// Requested bytes.
		need: u64,
		/// Bytes actually available.
		got: u64,
	},
	/// Header declared same-process scope, which embeds live pointers.
	#[error("same-process scope cannot be read from persisted data")]
	SameProcessScope,
	/// Header declared a scope that is unknown or not persistable.
	#[error("invalid structured clone scope {scope}")]
	InvalidScope {
		/// Raw scope id.
		scope: u32,
	},
	/// Stream starts with a transfer map, which only exists for live transfers.
	#[error("transfer maps are not allowed in persisted data")]
	TransferMapPresent,
	/// Tag is outside the value dictionary or not valid in value position.
	#[error("unknown tag 0x{tag:08x} at offset {at}")]
	UnknownTag {
		/// Raw tag.
		tag: u32,
		/// Offset of the tagged word.
		at: u64,
	},
	/// Back-reference points past the allocated objects.
	#[error("back-reference {index} out of range at offset {at} (allocated {len})")]
	BackReferenceOutOfRange {
		/// Requested object index.
		index: u32,
		/// Objects allocated so far.
		len: usize,
		/// Offset of the back-reference word.
		at: u64,
	},
	/// Object or array property key was neither a string nor an integer.
	#[error("property key must be a string or integer, got {got} at offset {at}")]
	InvalidPropertyKey {
		/// Kind of the decoded key.
		got: &'static str,
		/// Offset just past the key.
		at: u64,
	},
	/// `RegExp` tag not followed by its source string.
	#[error("regexp source must be a string, got tag 0x{tag:08x} at offset {at}")]
	RegExpSourceNotString {
		/// Tag found instead of a string.
		tag: u32,
		/// Offset of that word.
		at: u64,
	},
	/// Sparse array index above the configured growth limit.
	#[error("array index {index} exceeds limit {max}")]
	ArrayTooLarge {
		/// Requested index.
		index: u32,
		/// Configured maximum length.
		max: usize,
	},
	/// Recognised value category that is intentionally not decoded.
	#[error("{kind} values are not supported (tag 0x{tag:08x} at offset {at})")]
	NotSupported {
		/// Unsupported category.
		kind: UnsupportedKind,
		/// Raw tag.
		tag: u32,
		/// Offset of the tagged word.
		at: u64,
	},
}

/// Coarse error taxonomy for callers that only branch on the failure family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
	/// Source read failure.
	Io,
	/// Truncated stream.
	Eof,
	/// Structurally invalid input.
	Parse,
	/// Disallowed scope or transfer map.
	InvalidHeader,
	/// Recognised but unimplemented value.
	NotSupported,
}

impl CloneError {
	/// Group the error into its taxonomy class.
	pub fn class(&self) -> ErrorClass {
		match self {
			Self::Io(_) => ErrorClass::Io,
			Self::UnexpectedEof { .. } => ErrorClass::Eof,
			Self::SameProcessScope | Self::InvalidScope { .. } | Self::TransferMapPresent => ErrorClass::InvalidHeader,
			Self::UnknownTag { .. }
			| Self::BackReferenceOutOfRange { .. }
			| Self::InvalidPropertyKey { .. }
			| Self::RegExpSourceNotString { .. }
			| Self::ArrayTooLarge { .. } => ErrorClass::Parse,
			Self::NotSupported { .. } => ErrorClass::NotSupported,
		}
	}
}
