#![allow(missing_docs)]

use std::io::{BufReader, Cursor};

use clonedoc::sclone::{CloneError, DecodeOptions, HeapObject, Scope, Value, decode, decode_with, tag};
use clonedoc::snappy::{FrameDecoder, FrameError};
use clonedoc_testkit::{CloneBuilder, FrameBuilder};

fn record() -> Vec<u8> {
	CloneBuilder::new()
		.object()
		.latin1("title")
		.utf16("Grüße")
		.latin1("tags")
		.array()
		.int32(0)
		.latin1("a")
		.int32(1)
		.latin1("b")
		.end()
		.latin1("created")
		.date(1_600_000_000_000.0)
		.end()
		.finish()
}

#[test]
fn framed_record_decodes_across_chunk_boundaries() {
	let clone = record();
	let (head, tail) = clone.split_at(13);
	let bytes = FrameBuilder::with_identifier()
		.compressed(head)
		.skippable(0xFE, 3)
		.uncompressed(tail)
		.finish();

	let doc = decode(FrameDecoder::new(BufReader::new(Cursor::new(bytes)))).expect("framed record decodes");
	assert_eq!(doc.scope(), Scope::DifferentProcessForIndexedDb);

	let Some(HeapObject::Object(props)) = doc.object_of(doc.root()) else {
		panic!("expected object root");
	};
	assert_eq!(props.get("title").and_then(Value::as_str), Some("Grüße"));

	let tags = props.get("tags").and_then(|value| doc.object_of(value));
	let Some(HeapObject::Array(tags)) = tags else {
		panic!("expected tags array");
	};
	let tags: Vec<_> = tags.iter().map(|slot| slot.as_ref().and_then(Value::as_str)).collect();
	assert_eq!(tags, vec![Some("a"), Some("b")]);

	let created = props.get("created").and_then(|value| doc.object_of(value));
	assert_eq!(created, Some(&HeapObject::Date(1_600_000_000_000.0)));
}

#[test]
fn decoding_is_deterministic() {
	let bytes = FrameBuilder::with_identifier().compressed(&record()).finish();

	let first = decode(FrameDecoder::new(bytes.as_slice())).expect("first decode");
	let second = decode(FrameDecoder::new(bytes.as_slice())).expect("second decode");
	assert_eq!(first, second);
}

#[test]
fn framing_errors_surface_through_the_clone_decoder() {
	let bytes = FrameBuilder::with_identifier().chunk(0x05, b"xx").finish();

	let err = decode(FrameDecoder::new(bytes.as_slice())).expect_err("framing error propagates");
	let CloneError::Io(io) = &err else {
		panic!("expected io error, got {err}");
	};
	let frame = io.get_ref().and_then(|inner| inner.downcast_ref::<FrameError>());
	assert!(matches!(frame, Some(FrameError::UnsupportedChunkType { chunk_type: 0x05, .. })));
}

#[test]
fn truncated_frame_is_eof_for_the_clone_decoder() {
	let clone = record();
	let bytes = FrameBuilder::with_identifier().uncompressed(&clone[..clone.len() - 8]).finish();

	let err = decode(FrameDecoder::new(bytes.as_slice())).expect_err("short clone fails");
	assert!(matches!(err, CloneError::UnexpectedEof { .. }));
}

#[test]
fn lenient_decode_of_framed_bigint() {
	let clone = CloneBuilder::new()
		.array()
		.int32(0)
		.latin1("kept")
		.int32(1)
		.word(tag::BIGINT, 1)
		.raw(&[1, 0, 0, 0, 0, 0, 0, 0])
		.end()
		.finish();
	let bytes = FrameBuilder::with_identifier().compressed(&clone).finish();

	let err = decode(FrameDecoder::new(bytes.as_slice())).expect_err("bigint is unsupported by default");
	assert!(matches!(err, CloneError::NotSupported { .. }));

	let doc = decode_with(FrameDecoder::new(bytes.as_slice()), &DecodeOptions::lenient()).expect("lenient decode");
	assert!(!doc.is_complete());
	let Some(HeapObject::Array(slots)) = doc.object_of(doc.root()) else {
		panic!("expected array root");
	};
	assert_eq!(slots[0].as_ref().and_then(Value::as_str), Some("kept"));
	assert!(matches!(slots[1].as_ref().and_then(|value| doc.object_of(value)), Some(HeapObject::Unsupported(_))));
}
